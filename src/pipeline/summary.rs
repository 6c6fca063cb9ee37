//! Atomic per-date counters, folded into a `DateOutcome` once a date
//! finishes (§5: "per-run counters updated via atomic increments or a
//! single collector").

use crate::model::DateOutcome;
use chrono::NaiveDate;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct DateCounters {
    pub extracted: AtomicU64,
    pub classified: AtomicU64,
    pub inserted: AtomicU64,
    pub skipped_duplicate: AtomicU64,
    pub failed_classification: AtomicU64,
    pub failed_insert: AtomicU64,
    pub oracle_fallbacks: AtomicU64,
}

impl DateCounters {
    pub fn add_extracted(&self, n: u64) {
        self.extracted.fetch_add(n, Ordering::Relaxed);
    }
    pub fn add_classified(&self, n: u64) {
        self.classified.fetch_add(n, Ordering::Relaxed);
    }
    pub fn add_inserted(&self, n: u64) {
        self.inserted.fetch_add(n, Ordering::Relaxed);
    }
    pub fn add_skipped_duplicate(&self, n: u64) {
        self.skipped_duplicate.fetch_add(n, Ordering::Relaxed);
    }
    pub fn add_failed_classification(&self, n: u64) {
        self.failed_classification.fetch_add(n, Ordering::Relaxed);
    }
    pub fn add_failed_insert(&self, n: u64) {
        self.failed_insert.fetch_add(n, Ordering::Relaxed);
    }
    pub fn add_oracle_fallbacks(&self, n: u64) {
        self.oracle_fallbacks.fetch_add(n, Ordering::Relaxed);
    }

    pub fn to_outcome(&self, observed_on: NaiveDate, succeeded: bool, error: Option<String>) -> DateOutcome {
        DateOutcome {
            observed_on: observed_on.to_string(),
            extracted: self.extracted.load(Ordering::Relaxed),
            classified: self.classified.load(Ordering::Relaxed),
            inserted: self.inserted.load(Ordering::Relaxed),
            skipped_duplicate: self.skipped_duplicate.load(Ordering::Relaxed),
            failed_classification: self.failed_classification.load(Ordering::Relaxed),
            failed_insert: self.failed_insert.load(Ordering::Relaxed),
            oracle_fallbacks: self.oracle_fallbacks.load(Ordering::Relaxed),
            succeeded,
            error,
        }
    }
}
