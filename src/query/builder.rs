//! Q1/Q2/Q3 statement construction (C1).
//!
//! Table and column identifiers come from `AppConfig` and are validated once
//! at load time (`SchemaNames::validate`); they are therefore safe to splice
//! into SQL text with `format!`. Everything that is actual *data* — date
//! bounds, keyword/category values — is always passed as a bound parameter,
//! never interpolated.

use crate::error::{AppError, AppResult};
use crate::model::KeywordRecord;
use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};

#[derive(Debug, Clone, Deserialize)]
pub struct SchemaNames {
    pub chattings_table: String,
    pub keywords_table: String,
    pub pk_column: String,
    pub input_text_column: String,
    pub created_at_column: String,
    pub query_text_column: String,
    pub batch_created_at_column: String,
}

impl SchemaNames {
    pub fn validate(&self) -> AppResult<()> {
        for (field, value) in [
            ("chattings_table", &self.chattings_table),
            ("keywords_table", &self.keywords_table),
            ("pk_column", &self.pk_column),
            ("input_text_column", &self.input_text_column),
            ("created_at_column", &self.created_at_column),
            ("query_text_column", &self.query_text_column),
            ("batch_created_at_column", &self.batch_created_at_column),
        ] {
            validate_identifier(field, value)?;
        }
        Ok(())
    }
}

fn validate_identifier(field: &str, value: &str) -> AppResult<()> {
    let ok = !value.is_empty()
        && value.chars().next().map(|c| c.is_ascii_alphabetic() || c == '_').unwrap_or(false)
        && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    if !ok {
        return Err(AppError::InvalidConfig(format!(
            "store.{field} = '{value}' is not a safe SQL identifier"
        )));
    }
    Ok(())
}

/// Q1 — distinct utterances in `[start, end]`, one representative row per
/// distinct text with its total occurrence count in the window.
///
/// Bind order: `$1` = start date, `$2` = end date.
pub fn q1_distinct_utterances(schema: &SchemaNames) -> String {
    format!(
        r#"
WITH counted AS (
  SELECT {pk}, {input_text}, {created_at},
         ROW_NUMBER() OVER (PARTITION BY {input_text} ORDER BY {created_at} DESC) AS rn,
         COUNT(*)    OVER (PARTITION BY {input_text})                              AS total
  FROM {chattings}
  WHERE {created_at} BETWEEN ($1::date)::timestamp AND ($2::date + INTERVAL '1 day' - INTERVAL '1 second')
)
SELECT {input_text} AS text, total AS occurrences, DATE({created_at}) AS observed_on
FROM counted WHERE rn = 1
ORDER BY total DESC, observed_on ASC
"#,
        pk = schema.pk_column,
        input_text = schema.input_text_column,
        created_at = schema.created_at_column,
        chattings = schema.chattings_table,
    )
}

/// Q2 — utterances present in the source within `[start, end]` that have no
/// corresponding row in the derived table for that (text, date).
///
/// Bind order: `$1` = start date, `$2` = end date.
pub fn q2_missing_utterances(schema: &SchemaNames) -> String {
    format!(
        r#"
SELECT DATE(c.{created_at}) AS observed_on, c.{input_text} AS text, COUNT(*) AS occurrences
FROM {chattings} c
LEFT JOIN (
  SELECT DISTINCT {query_text}, DATE({batch_created_at}) AS d
  FROM {keywords}
  WHERE DATE({batch_created_at}) BETWEEN $1::date AND $2::date
) k
  ON c.{input_text} = k.{query_text} AND DATE(c.{created_at}) = k.d
WHERE k.{query_text} IS NULL
  AND c.{created_at} BETWEEN ($1::date)::timestamp AND ($2::date + INTERVAL '1 day' - INTERVAL '1 second')
GROUP BY observed_on, text
ORDER BY occurrences DESC
"#,
        created_at = schema.created_at_column,
        input_text = schema.input_text_column,
        chattings = schema.chattings_table,
        query_text = schema.query_text_column,
        batch_created_at = schema.batch_created_at_column,
        keywords = schema.keywords_table,
    )
}

/// Q3 — idempotent batch insert: `INSERT ... SELECT ... WHERE NOT EXISTS`,
/// keyed on (query_text, DATE(batch_created_at)). Works for a batch of any
/// size >= 1 (the per-row fallback path calls this with a single-record
/// slice).
pub fn push_insert_batch<'a>(
    qb: &mut QueryBuilder<'a, Postgres>,
    schema: &'a SchemaNames,
    records: &'a [KeywordRecord],
) {
    qb.push("INSERT INTO ");
    qb.push(schema.keywords_table.as_str());
    qb.push(" (");
    qb.push(schema.query_text_column.as_str());
    qb.push(", keyword, category_id, query_count, ");
    qb.push(schema.batch_created_at_column.as_str());
    qb.push(", created_at) SELECT v.query_text, v.keyword, v.category_id, v.query_count, v.batch_created_at, v.created_at FROM (");

    qb.push_values(records.iter(), |mut b, record| {
        b.push_bind(&record.query_text)
            .push_bind(&record.keyword)
            .push_bind(record.category_id)
            .push_bind(record.query_count)
            .push_bind(record.batch_created_at)
            .push_bind(record.created_at);
    });

    qb.push(") AS v(query_text, keyword, category_id, query_count, batch_created_at, created_at) WHERE NOT EXISTS (SELECT 1 FROM ");
    qb.push(schema.keywords_table.as_str());
    qb.push(" k WHERE k.");
    qb.push(schema.query_text_column.as_str());
    qb.push(" = v.query_text AND DATE(k.");
    qb.push(schema.batch_created_at_column.as_str());
    qb.push(") = DATE(v.batch_created_at))");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> SchemaNames {
        SchemaNames {
            chattings_table: "chattings".into(),
            keywords_table: "keywords".into(),
            pk_column: "id".into(),
            input_text_column: "input_text".into(),
            created_at_column: "created_at".into(),
            query_text_column: "query_text".into(),
            batch_created_at_column: "batch_created_at".into(),
        }
    }

    #[test]
    fn valid_schema_passes() {
        assert!(schema().validate().is_ok());
    }

    #[test]
    fn rejects_identifier_with_semicolon() {
        let mut s = schema();
        s.chattings_table = "chattings; DROP TABLE x".into();
        assert!(s.validate().is_err());
    }

    #[test]
    fn q1_contains_partition_and_table_name() {
        let sql = q1_distinct_utterances(&schema());
        assert!(sql.contains("PARTITION BY input_text"));
        assert!(sql.contains("FROM chattings"));
    }

    #[test]
    fn q2_left_joins_against_keywords() {
        let sql = q2_missing_utterances(&schema());
        assert!(sql.contains("LEFT JOIN"));
        assert!(sql.contains("FROM keywords"));
    }
}
