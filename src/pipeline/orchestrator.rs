//! Range Orchestrator (C6): runs up to `D` dates concurrently and folds
//! their outcomes into one `RunSummary` (§4.6, §7).

use crate::model::{DateRange, RunSummary};
use crate::oracle::OracleBackend;
use crate::pipeline::date_pipeline::DatePipeline;
use crate::store::backend::StoreBackend;
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

pub struct RangeOrchestrator {
    date_pipeline: Arc<DatePipeline>,
    concurrent_dates: usize,
}

impl RangeOrchestrator {
    pub fn new(
        store: Arc<dyn StoreBackend>,
        oracle: Arc<dyn OracleBackend>,
        chunk_size: usize,
        workers_per_date: usize,
        concurrent_dates: usize,
    ) -> Self {
        Self {
            date_pipeline: Arc::new(DatePipeline::new(store, oracle, chunk_size, workers_per_date)),
            concurrent_dates,
        }
    }

    /// Run every date in `range` against Q1, up to `concurrent_dates` at a
    /// time. One date's failure never aborts the others (§4.6).
    pub async fn run(&self, range: DateRange) -> RunSummary {
        let dates = range.dates();
        let mut summary = RunSummary::new(Uuid::new_v4());
        let started = Instant::now();

        let pipeline = self.date_pipeline.clone();
        let mut outcomes: Vec<_> = stream::iter(dates)
            .map(|date| {
                let pipeline = pipeline.clone();
                async move { pipeline.run(date).await }
            })
            .buffer_unordered(self.concurrent_dates)
            .collect()
            .await;

        // `buffer_unordered` yields completion order, not calendar order;
        // restore it so `per_date` reads chronologically.
        outcomes.sort_by(|a, b| a.observed_on.cmp(&b.observed_on));
        for outcome in outcomes {
            summary.fold_date(outcome);
        }

        summary.wall_time_ms = started.elapsed().as_millis() as u64;
        summary
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
    async fn runs_every_date_and_preserves_order() {
        let d1 = NaiveDate::from_ymd_opt(2025, 6, 11).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2025, 6, 12).unwrap();
        let d3 = NaiveDate::from_ymd_opt(2025, 6, 13).unwrap();

        let utterances = vec![
            Utterance { text: "수강신청".into(), observed_on: d1, occurrences: 2 },
            Utterance { text: "장학금 문의".into(), observed_on: d3, occurrences: 1 },
        ];
        let store = Arc::new(FakeStoreBackend::new(utterances));
        let oracle = Arc::new(FakeOracleBackend::new(0));

        let orchestrator = RangeOrchestrator::new(store, oracle, 10, 2, 2);
        let range = DateRange::new(d1, d3).unwrap();

        let summary = orchestrator.run(range).await;

        assert_eq!(summary.per_date.len(), 3);
        assert_eq!(summary.per_date[0].observed_on, d1.to_string());
        assert_eq!(summary.per_date[1].observed_on, d2.to_string());
        assert_eq!(summary.per_date[2].observed_on, d3.to_string());
        assert_eq!(summary.extracted, 2);
        assert!(summary.is_success());
    }
}
