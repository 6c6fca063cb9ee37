//! Core data model: Utterance, Classification, KeywordRecord, RunSummary.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A distinct input text attributed to a specific date within a processing window.
///
/// Immutable within a run. `occurrences` is the count of raw chat rows that
/// collapsed into this text inside the requested date range (Q1/Q2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub text: String,
    pub observed_on: NaiveDate,
    pub occurrences: i64,
}

/// The (keyword, category) pair produced by the oracle or by local fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub keyword: String,
    pub category_id: i32,
    /// True if this classification came from the local fallback path rather
    /// than a successful oracle response.
    pub is_fallback: bool,
}

/// One row to be inserted into the derived (keywords) table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRecord {
    pub query_text: String,
    pub keyword: String,
    pub category_id: i32,
    pub query_count: i64,
    pub batch_created_at: DateTime<Utc>,
    pub created_at: NaiveDate,
}

impl KeywordRecord {
    pub fn from_parts(utterance: &Utterance, classification: Classification, now: DateTime<Utc>) -> Self {
        Self {
            query_text: utterance.text.clone(),
            keyword: classification.keyword,
            category_id: classification.category_id,
            query_count: utterance.occurrences,
            batch_created_at: now,
            created_at: utterance.observed_on,
        }
    }
}

/// Outcome of one date's `DatePipeline` run, folded into the final `RunSummary`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DateOutcome {
    pub observed_on: String,
    pub extracted: u64,
    pub classified: u64,
    pub inserted: u64,
    pub skipped_duplicate: u64,
    pub failed_classification: u64,
    pub failed_insert: u64,
    pub oracle_fallbacks: u64,
    pub succeeded: bool,
    pub error: Option<String>,
}

/// Result object returned to callers of `batch`/`missing_*`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub extracted: u64,
    pub classified: u64,
    pub inserted: u64,
    pub skipped_duplicate: u64,
    pub failed_classification: u64,
    pub failed_insert: u64,
    pub oracle_fallbacks: u64,
    pub missing_before: Option<u64>,
    pub missing_after: Option<u64>,
    pub wall_time_ms: u64,
    pub per_date: Vec<DateOutcome>,
}

impl RunSummary {
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            extracted: 0,
            classified: 0,
            inserted: 0,
            skipped_duplicate: 0,
            failed_classification: 0,
            failed_insert: 0,
            oracle_fallbacks: 0,
            missing_before: None,
            missing_after: None,
            wall_time_ms: 0,
            per_date: Vec::new(),
        }
    }

    /// Success iff no insert failed and no date-pipeline run failed (§7 policy).
    pub fn is_success(&self) -> bool {
        self.failed_insert == 0 && self.per_date.iter().all(|d| d.succeeded)
    }

    pub fn fold_date(&mut self, outcome: DateOutcome) {
        self.extracted += outcome.extracted;
        self.classified += outcome.classified;
        self.inserted += outcome.inserted;
        self.skipped_duplicate += outcome.skipped_duplicate;
        self.failed_classification += outcome.failed_classification;
        self.failed_insert += outcome.failed_insert;
        self.oracle_fallbacks += outcome.oracle_fallbacks;
        self.per_date.push(outcome);
    }
}

/// Inclusive date range, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> crate::error::AppResult<Self> {
        if start > end {
            return Err(crate::error::AppError::InvalidRange(format!(
                "start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Expand into the ordered list of calendar dates covered (C6).
    pub fn dates(&self) -> Vec<NaiveDate> {
        let mut out = Vec::new();
        let mut d = self.start;
        while d <= self.end {
            out.push(d);
            d += chrono::Duration::days(1);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_range_rejects_inverted_bounds() {
        let start = NaiveDate::from_ymd_opt(2025, 6, 12).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 6, 11).unwrap();
        assert!(DateRange::new(start, end).is_err());
    }

    #[test]
    fn date_range_single_day_yields_one_date() {
        let d = NaiveDate::from_ymd_opt(2025, 6, 11).unwrap();
        let range = DateRange::new(d, d).unwrap();
        assert_eq!(range.dates(), vec![d]);
    }

    #[test]
    fn date_range_expands_inclusive() {
        let start = NaiveDate::from_ymd_opt(2025, 6, 11).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 6, 13).unwrap();
        let range = DateRange::new(start, end).unwrap();
        assert_eq!(range.dates().len(), 3);
    }

    #[test]
    fn run_summary_success_requires_zero_failed_insert_and_all_dates_ok() {
        let mut s = RunSummary::new(Uuid::nil());
        s.fold_date(DateOutcome {
            observed_on: "2025-06-11".into(),
            succeeded: true,
            ..Default::default()
        });
        assert!(s.is_success());

        s.fold_date(DateOutcome {
            observed_on: "2025-06-12".into(),
            succeeded: false,
            error: Some("extraction failed".into()),
            ..Default::default()
        });
        assert!(!s.is_success());
    }
}
