//! Reconciler (C7): finds and optionally backfills utterances missed by
//! earlier runs, via Q2 (§4.7).

use crate::error::AppResult;
use crate::model::{DateRange, RunSummary};
use crate::oracle::OracleBackend;
use crate::pipeline::date_pipeline::DatePipeline;
use crate::store::backend::StoreBackend;
use futures_util::{StreamExt, TryStreamExt};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

pub struct Reconciler {
    store: Arc<dyn StoreBackend>,
    date_pipeline: Arc<DatePipeline>,
    concurrent_dates: usize,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn StoreBackend>,
        oracle: Arc<dyn OracleBackend>,
        chunk_size: usize,
        workers_per_date: usize,
        concurrent_dates: usize,
    ) -> Self {
        Self {
            store: store.clone(),
            date_pipeline: Arc::new(DatePipeline::new(store, oracle, chunk_size, workers_per_date)),
            concurrent_dates,
        }
    }

    /// Count (never process) the utterances Q2 reports missing in `range`.
    pub async fn check(&self, range: DateRange) -> AppResult<u64> {
        self.count_missing(range, None).await
    }

    /// Process every missing utterance in `range` through the normal
    /// pipeline (§4.7). `limit` caps rows per date, mirroring `stream_missing`.
    pub async fn process(&self, range: DateRange, limit: Option<u64>) -> RunSummary {
        let dates = range.dates();
        let mut summary = RunSummary::new(Uuid::new_v4());
        let started = Instant::now();

        let pipeline = self.date_pipeline.clone();
        let mut outcomes: Vec<_> = futures_util::stream::iter(dates)
            .map(|date| {
                let pipeline = pipeline.clone();
                async move { pipeline.run_missing(date, limit).await }
            })
            .buffer_unordered(self.concurrent_dates)
            .collect()
            .await;

        outcomes.sort_by(|a, b| a.observed_on.cmp(&b.observed_on));
        for outcome in outcomes {
            summary.fold_date(outcome);
        }

        summary.wall_time_ms = started.elapsed().as_millis() as u64;
        summary
    }

    /// Check then process, reporting both before/after missing counts
    /// (§4.7 "auto" mode).
    pub async fn auto(&self, range: DateRange, limit: Option<u64>) -> AppResult<RunSummary> {
        let missing_before = self.count_missing(range, None).await?;
        let mut summary = self.process(range, limit).await;
        let missing_after = self.count_missing(range, None).await?;

        summary.missing_before = Some(missing_before);
        summary.missing_after = Some(missing_after);
        Ok(summary)
    }

    async fn count_missing(&self, range: DateRange, limit: Option<u64>) -> AppResult<u64> {
        let mut total = 0u64;
        for date in range.dates() {
            let mut stream = self.store.stream_missing(date, date, limit);
            while stream.try_next().await?.is_some() {
                total += 1;
            }
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Utterance;
    use crate::oracle::backend::fake::FakeOracleBackend;
    use crate::store::backend::fake::FakeStoreBackend;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn check_counts_without_inserting() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 11).unwrap();
        let utterances = vec![Utterance { text: "수강신청".into(), observed_on: date, occurrences: 1 }];
        let store = Arc::new(FakeStoreBackend::new(utterances));
        let oracle = Arc::new(FakeOracleBackend::new(0));

        let reconciler = Reconciler::new(store.clone(), oracle, 10, 2, 2);
        let range = DateRange::new(date, date).unwrap();

        let missing = reconciler.check(range).await.unwrap();
        assert_eq!(missing, 1);
        assert!(store.inserted_rows().is_empty());
    }

    #[tokio::test]
    async fn process_inserts_and_auto_reports_before_after() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 11).unwrap();
        let utterances = vec![Utterance { text: "수강신청".into(), observed_on: date, occurrences: 1 }];
        let store = Arc::new(FakeStoreBackend::new(utterances));
        let oracle = Arc::new(FakeOracleBackend::new(0));

        let reconciler = Reconciler::new(store.clone(), oracle, 10, 2, 2);
        let range = DateRange::new(date, date).unwrap();

        let summary = reconciler.auto(range, None).await.unwrap();
        assert_eq!(summary.missing_before, Some(1));
        assert_eq!(summary.missing_after, Some(0));
        assert_eq!(store.inserted_rows().len(), 1);
    }
}
