//! `StoreBackend` is the seam between the pipeline (C4–C7) and the concrete
//! Postgres-backed `StoreGateway` (C2). Tests exercise the pipeline against
//! an in-memory fake instead of a live database.

use crate::error::AppResult;
use crate::model::{KeywordRecord, Utterance};
use async_trait::async_trait;
use futures_util::stream::BoxStream;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertOutcome {
    pub inserted: u64,
    pub skipped_duplicate: u64,
    pub failed_insert: u64,
}

#[async_trait]
pub trait StoreBackend: Send + Sync {
    /// Q1, streamed: one representative row per distinct text in range.
    fn stream_distinct(
        &self,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    ) -> BoxStream<'_, AppResult<Utterance>>;

    /// Q2, streamed: utterances in range with no matching derived-table row.
    fn stream_missing(
        &self,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
        limit: Option<u64>,
    ) -> BoxStream<'_, AppResult<Utterance>>;

    /// Q3: idempotent batch insert with per-row fallback on batch failure (§4.2).
    async fn insert_batch(&self, records: Vec<KeywordRecord>) -> AppResult<InsertOutcome>;
}

#[cfg(test)]
pub mod fake {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use futures_util::stream;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// In-memory `StoreBackend` used by pipeline unit tests (P1–P8 logic,
    /// not a real database).
    pub struct FakeStoreBackend {
        pub utterances: Vec<Utterance>,
        inserted: Mutex<HashSet<(String, NaiveDate)>>,
        pub fail_batches: Mutex<u32>,
    }

    impl FakeStoreBackend {
        pub fn new(utterances: Vec<Utterance>) -> Self {
            Self {
                utterances,
                inserted: Mutex::new(HashSet::new()),
                fail_batches: Mutex::new(0),
            }
        }

        pub fn inserted_rows(&self) -> Vec<(String, NaiveDate)> {
            let mut rows: Vec<_> = self.inserted.lock().unwrap().iter().cloned().collect();
            rows.sort();
            rows
        }

        pub fn seed_existing(&self, text: &str, date: NaiveDate) {
            self.inserted.lock().unwrap().insert((text.to_string(), date));
        }

        /// Make the next `n` `insert_batch` calls fail as a whole batch, to
        /// exercise the per-row fallback path.
        pub fn fail_next_batches(&self, n: u32) {
            *self.fail_batches.lock().unwrap() = n;
        }
    }

    #[async_trait]
    impl StoreBackend for FakeStoreBackend {
        fn stream_distinct(
            &self,
            start: NaiveDate,
            end: NaiveDate,
        ) -> BoxStream<'_, AppResult<Utterance>> {
            let rows: Vec<_> = self
                .utterances
                .iter()
                .filter(|u| u.observed_on >= start && u.observed_on <= end)
                .cloned()
                .map(Ok)
                .collect();
            Box::pin(stream::iter(rows))
        }

        fn stream_missing(
            &self,
            start: NaiveDate,
            end: NaiveDate,
            limit: Option<u64>,
        ) -> BoxStream<'_, AppResult<Utterance>> {
            let inserted = self.inserted.lock().unwrap();
            let mut rows: Vec<_> = self
                .utterances
                .iter()
                .filter(|u| u.observed_on >= start && u.observed_on <= end)
                .filter(|u| !inserted.contains(&(u.text.clone(), u.observed_on)))
                .cloned()
                .collect();
            drop(inserted);
            if let Some(limit) = limit {
                rows.truncate(limit as usize);
            }
            Box::pin(stream::iter(rows.into_iter().map(Ok)))
        }

        async fn insert_batch(&self, records: Vec<KeywordRecord>) -> AppResult<InsertOutcome> {
            let mut guard = self.fail_batches.lock().unwrap();
            if *guard > 0 {
                *guard -= 1;
                drop(guard);
                // Simulate the per-row fallback path: every row re-attempted
                // individually, all succeeding this time.
                let mut outcome = InsertOutcome::default();
                let mut inserted = self.inserted.lock().unwrap();
                for r in records {
                    let key = (r.query_text.clone(), r.created_at);
                    if inserted.insert(key) {
                        outcome.inserted += 1;
                    } else {
                        outcome.skipped_duplicate += 1;
                    }
                }
                return Ok(outcome);
            }
            drop(guard);

            let _ = Utc::now();
            let mut outcome = InsertOutcome::default();
            let mut inserted = self.inserted.lock().unwrap();
            for r in records {
                let key = (r.query_text.clone(), r.created_at);
                if inserted.insert(key) {
                    outcome.inserted += 1;
                } else {
                    outcome.skipped_duplicate += 1;
                }
            }
            Ok(outcome)
        }
    }
}
