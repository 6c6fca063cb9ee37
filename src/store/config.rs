use crate::error::{AppError, AppResult};
use crate::query::SchemaNames;
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Name of the environment variable that holds the Postgres DSN.
    pub dsn_env: String,

    pub chattings_table: String,
    pub keywords_table: String,
    pub pk_column: String,
    pub input_text_column: String,
    pub created_at_column: String,
    pub query_text_column: String,
    pub batch_created_at_column: String,

    pub pool_size: u32,
    pub pool_overflow: u32,
    pub acquire_timeout_ms: u64,
    pub max_lifetime_secs: u64,
}

impl StoreConfig {
    pub fn schema(&self) -> SchemaNames {
        SchemaNames {
            chattings_table: self.chattings_table.clone(),
            keywords_table: self.keywords_table.clone(),
            pk_column: self.pk_column.clone(),
            input_text_column: self.input_text_column.clone(),
            created_at_column: self.created_at_column.clone(),
            query_text_column: self.query_text_column.clone(),
            batch_created_at_column: self.batch_created_at_column.clone(),
        }
    }

    pub fn dsn(&self) -> AppResult<String> {
        env::var(&self.dsn_env).map_err(|_| {
            AppError::InvalidConfig(format!(
                "store.dsn_env: environment variable '{}' is not set",
                self.dsn_env
            ))
        })
    }

    /// `pool_size + pool_overflow`, i.e. the hard cap sqlx enforces as `max_connections`.
    pub fn max_connections(&self) -> u32 {
        self.pool_size + self.pool_overflow
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.dsn_env.trim().is_empty() {
            return Err(AppError::InvalidConfig("store.dsn_env must not be empty".into()));
        }
        if self.pool_size == 0 {
            return Err(AppError::InvalidConfig("store.pool_size must be >= 1".into()));
        }
        if self.acquire_timeout_ms == 0 {
            return Err(AppError::InvalidConfig(
                "store.acquire_timeout_ms must be > 0".into(),
            ));
        }
        if self.max_lifetime_secs == 0 {
            return Err(AppError::InvalidConfig(
                "store.max_lifetime_secs must be > 0".into(),
            ));
        }
        self.schema().validate()?;

        // Fail fast on a missing DSN env var rather than surfacing it as a
        // connection error at first use.
        let dsn = self.dsn()?;
        if !dsn.starts_with("postgres://") && !dsn.starts_with("postgresql://") {
            return Err(AppError::InvalidConfig(format!(
                "store.dsn_env: DSN from '{}' must start with postgres:// or postgresql://",
                self.dsn_env
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> StoreConfig {
        StoreConfig {
            dsn_env: "CHAT_KEYWORD_TEST_DSN".into(),
            chattings_table: "chattings".into(),
            keywords_table: "keywords".into(),
            pk_column: "id".into(),
            input_text_column: "input_text".into(),
            created_at_column: "created_at".into(),
            query_text_column: "query_text".into(),
            batch_created_at_column: "batch_created_at".into(),
            pool_size: 10,
            pool_overflow: 20,
            acquire_timeout_ms: 5000,
            max_lifetime_secs: 3600,
        }
    }

    #[test]
    fn max_connections_sums_size_and_overflow() {
        assert_eq!(cfg().max_connections(), 30);
    }

    #[test]
    fn validate_rejects_zero_pool_size() {
        let mut c = cfg();
        c.pool_size = 0;
        unsafe { env::set_var("CHAT_KEYWORD_TEST_DSN", "postgres://x") };
        assert!(c.validate().is_err());
    }
}
