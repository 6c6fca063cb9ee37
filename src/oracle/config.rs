use crate::error::{AppError, AppResult};
use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct OracleConfig {
    /// Name of the environment variable that holds the oracle API key.
    pub api_key_env: String,
    pub endpoint: String,
    pub model_id: String,

    pub requests_per_minute: u32,
    pub min_interval_secs: f64,
    pub max_retries: u32,
    pub base_backoff_secs: f64,
    pub request_timeout_secs: u64,
}

impl OracleConfig {
    pub fn api_key(&self) -> AppResult<String> {
        env::var(&self.api_key_env).map_err(|_| {
            AppError::InvalidConfig(format!(
                "oracle.api_key_env: environment variable '{}' is not set",
                self.api_key_env
            ))
        })
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_secs_f64(self.min_interval_secs.max(0.0))
    }

    pub fn base_backoff(&self) -> Duration {
        Duration::from_secs_f64(self.base_backoff_secs.max(0.0))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.api_key_env.trim().is_empty() {
            return Err(AppError::InvalidConfig("oracle.api_key_env must not be empty".into()));
        }
        if self.endpoint.trim().is_empty() {
            return Err(AppError::InvalidConfig("oracle.endpoint must not be empty".into()));
        }
        if self.requests_per_minute == 0 {
            return Err(AppError::InvalidConfig(
                "oracle.requests_per_minute must be >= 1".into(),
            ));
        }
        if self.max_retries == 0 {
            return Err(AppError::InvalidConfig("oracle.max_retries must be >= 1".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(AppError::InvalidConfig(
                "oracle.request_timeout_secs must be > 0".into(),
            ));
        }

        // Fail fast on a missing API key rather than at first classify() call.
        self.api_key()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> OracleConfig {
        OracleConfig {
            api_key_env: "CHAT_KEYWORD_TEST_ORACLE_KEY".into(),
            endpoint: "https://example.com/classify".into(),
            model_id: "test-model".into(),
            requests_per_minute: 30,
            min_interval_secs: 1.0,
            max_retries: 3,
            base_backoff_secs: 2.0,
            request_timeout_secs: 30,
        }
    }

    #[test]
    fn validate_rejects_zero_requests_per_minute() {
        unsafe { env::set_var("CHAT_KEYWORD_TEST_ORACLE_KEY", "secret") };
        let mut c = cfg();
        c.requests_per_minute = 0;
        assert!(c.validate().is_err());
    }
}
