//! Retry/backoff policy for oracle HTTP calls (§4.3).

use rand::Rng;
use std::time::Duration;

/// Whether an oracle HTTP outcome should be retried.
///
/// Retryable: connection timeout, 5xx, 429, transport error.
/// Non-retryable: 4xx other than 429, and a malformed response body (that
/// one is only "non-retryable" in the sense that retrying won't fix a
/// schema mismatch — the caller still counts attempts against N and falls
/// back once exhausted).
pub fn is_retryable_status(status: reqwest::StatusCode) -> bool {
    status.as_u16() == 429 || status.is_server_error()
}

/// Exponential backoff with full jitter: `delay in [0, base * 2^(attempt-1))`.
/// `attempt` is 1-based (the attempt that just failed).
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let exp = base.as_secs_f64() * 2f64.powi(attempt.saturating_sub(1) as i32);
    let jittered = rand::rng().random_range(0.0..exp.max(0.001));
    Duration::from_secs_f64(jittered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retries_429_and_5xx() {
        assert!(is_retryable_status(reqwest::StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
        assert!(is_retryable_status(reqwest::StatusCode::BAD_GATEWAY));
    }

    #[test]
    fn does_not_retry_other_4xx() {
        assert!(!is_retryable_status(reqwest::StatusCode::BAD_REQUEST));
        assert!(!is_retryable_status(reqwest::StatusCode::UNAUTHORIZED));
        assert!(!is_retryable_status(reqwest::StatusCode::NOT_FOUND));
    }

    #[test]
    fn backoff_delay_stays_within_exponential_bound() {
        let base = Duration::from_secs(2);
        for attempt in 1..=5 {
            let d = backoff_delay(base, attempt);
            let bound = base.as_secs_f64() * 2f64.powi((attempt - 1) as i32);
            assert!(d.as_secs_f64() <= bound);
        }
    }
}
