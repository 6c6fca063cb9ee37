//! Date Pipeline (C5): streams one date's distinct utterances, chunks them,
//! and fans out to bounded `ChunkWorker`s (§4.5).

use crate::error::AppResult;
use crate::model::{DateOutcome, Utterance};
use crate::oracle::OracleBackend;
use crate::pipeline::summary::DateCounters;
use crate::pipeline::worker::ChunkWorker;
use crate::store::backend::StoreBackend;
use chrono::NaiveDate;
use futures_util::StreamExt;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub struct DatePipeline {
    store: Arc<dyn StoreBackend>,
    oracle: Arc<dyn OracleBackend>,
    chunk_size: usize,
    workers_per_date: usize,
}

impl DatePipeline {
    pub fn new(
        store: Arc<dyn StoreBackend>,
        oracle: Arc<dyn OracleBackend>,
        chunk_size: usize,
        workers_per_date: usize,
    ) -> Self {
        Self { store, oracle, chunk_size, workers_per_date }
    }

    /// Run one date against Q1 (`stream_distinct`).
    pub async fn run(&self, date: NaiveDate) -> DateOutcome {
        self.drive(date, |store| store.stream_distinct(date, date)).await
    }

    /// Run one date against Q2 (`stream_missing`), used by the reconciler.
    pub async fn run_missing(&self, date: NaiveDate, limit: Option<u64>) -> DateOutcome {
        self.drive(date, move |store| store.stream_missing(date, date, limit)).await
    }

    async fn drive<'a, F>(&'a self, date: NaiveDate, stream_fn: F) -> DateOutcome
    where
        F: FnOnce(&'a dyn StoreBackend) -> futures_util::stream::BoxStream<'a, AppResult<Utterance>>,
    {
        let counters = Arc::new(DateCounters::default());
        let worker = Arc::new(ChunkWorker::new(self.oracle.clone(), self.store.clone()));
        let semaphore = Arc::new(Semaphore::new(self.workers_per_date));
        let mut joinset: JoinSet<AppResult<()>> = JoinSet::new();

        let mut stream = stream_fn(self.store.as_ref());
        let mut buffer: Vec<Utterance> = Vec::with_capacity(self.chunk_size);
        let mut stream_err: Option<String> = None;

        loop {
            match stream.next().await {
                Some(Ok(utterance)) => {
                    buffer.push(utterance);
                    if buffer.len() >= self.chunk_size {
                        let chunk = std::mem::replace(&mut buffer, Vec::with_capacity(self.chunk_size));
                        if !self.dispatch(chunk, &worker, &semaphore, &counters, &mut joinset).await {
                            stream_err = Some("worker pool closed".into());
                            break;
                        }
                    }
                }
                Some(Err(e)) => {
                    // A failure reading the extraction stream fails the whole
                    // date (§4.5) — the pipeline stops pulling further rows.
                    stream_err = Some(e.to_string());
                    break;
                }
                None => break,
            }
        }

        if stream_err.is_none() && !buffer.is_empty() {
            let _ = self.dispatch(buffer, &worker, &semaphore, &counters, &mut joinset).await;
        }

        // Drain every spawned worker regardless of outcome so the counters
        // reflect everything that was actually attempted.
        while let Some(joined) = joinset.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => stream_err.get_or_insert_with(|| e.to_string()),
                Err(e) => stream_err.get_or_insert_with(|| e.to_string()),
            };
        }

        let succeeded = stream_err.is_none();
        counters.to_outcome(date, succeeded, stream_err)
    }

    /// Acquire a worker slot, then spawn — so chunk assembly naturally
    /// backpressures against worker availability instead of racing ahead.
    async fn dispatch(
        &self,
        chunk: Vec<Utterance>,
        worker: &Arc<ChunkWorker>,
        semaphore: &Arc<Semaphore>,
        counters: &Arc<DateCounters>,
        joinset: &mut JoinSet<AppResult<()>>,
    ) -> bool {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            return false;
        };
        let worker = worker.clone();
        let counters = counters.clone();
        joinset.spawn(async move {
            let _permit = permit;
            worker.process(chunk, &counters).await
        });
        true
    }
}
