//! Process-wide rate limiter for oracle calls (§4.3, §9).
//!
//! Combines a `governor` quota (R requests/minute, the ecosystem's usual
//! token-bucket crate) with a hand-rolled minimum-inter-request-gap check —
//! `governor` alone has no notion of a floor gap between individual
//! permits, so the gap is enforced by a small critical section guarding
//! `next_allowed_at`, exactly as the design notes in §9 call for. This is
//! the only process-wide mutable object in the hot path; never replicate
//! one bucket per worker (it would break the requests/minute ceiling).

use governor::{Quota, RateLimiter};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use std::num::NonZeroU32;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

pub struct RateBucket {
    quota_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    min_interval: Duration,
    next_allowed_at: Mutex<Instant>,
}

impl RateBucket {
    /// `requests_per_minute` must be >= 1 (enforced by `OracleConfig::validate`).
    pub fn new(requests_per_minute: u32, min_interval: Duration) -> Self {
        let per_minute = NonZeroU32::new(requests_per_minute.max(1)).unwrap();
        let quota = Quota::per_minute(per_minute);
        Self {
            quota_limiter: RateLimiter::direct(quota),
            min_interval,
            next_allowed_at: Mutex::new(Instant::now()),
        }
    }

    /// Block the caller until both the requests/minute quota and the
    /// minimum-gap floor allow another oracle call.
    pub async fn acquire(&self) {
        // Minimum-gap floor: critical section over `next_allowed_at`.
        let wait_until = {
            let mut next = self.next_allowed_at.lock().expect("rate bucket mutex poisoned");
            let now = Instant::now();
            let earliest = if *next > now { *next } else { now };
            *next = earliest + self.min_interval;
            earliest
        };
        tokio::time::sleep_until(wait_until).await;

        // Requests/minute quota: block until governor grants a permit.
        self.quota_limiter.until_ready().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    #[tokio::test(start_paused = true)]
    async fn enforces_minimum_gap_between_calls() {
        let bucket = RateBucket::new(600, StdDuration::from_millis(100));

        let t0 = Instant::now();
        bucket.acquire().await;
        bucket.acquire().await;
        let elapsed = Instant::now() - t0;

        assert!(elapsed >= StdDuration::from_millis(100));
    }
}
