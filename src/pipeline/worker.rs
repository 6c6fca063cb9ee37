//! Chunk Worker (C4): classifies one contiguous slice of utterances and
//! flushes a single insert-ready batch through the store.

use crate::error::AppResult;
use crate::model::{KeywordRecord, Utterance};
use crate::oracle::OracleBackend;
use crate::pipeline::summary::DateCounters;
use crate::store::backend::StoreBackend;
use chrono::Utc;
use std::sync::Arc;

pub struct ChunkWorker {
    oracle: Arc<dyn OracleBackend>,
    store: Arc<dyn StoreBackend>,
}

impl ChunkWorker {
    pub fn new(oracle: Arc<dyn OracleBackend>, store: Arc<dyn StoreBackend>) -> Self {
        Self { oracle, store }
    }

    /// Classify every utterance in `chunk` sequentially (oracle calls are
    /// serialized — the rate-limit bucket is contended regardless, so
    /// parallel calls within one worker would only add lock traffic without
    /// reducing wall time below the bucket floor), then flush the whole
    /// chunk through the store in one `insert_batch` call and release the
    /// buffer immediately (§4.4: steady-state memory O(K)).
    pub async fn process(&self, chunk: Vec<Utterance>, counters: &DateCounters) -> AppResult<()> {
        counters.add_extracted(chunk.len() as u64);

        let mut records = Vec::with_capacity(chunk.len());
        for utterance in &chunk {
            let classification = self.oracle.classify(&utterance.text).await;
            if classification.is_fallback {
                counters.add_oracle_fallbacks(1);
            }
            counters.add_classified(1);
            records.push(KeywordRecord::from_parts(utterance, classification, Utc::now()));
        }

        let outcome = self.store.insert_batch(records).await?;
        counters.add_inserted(outcome.inserted);
        counters.add_skipped_duplicate(outcome.skipped_duplicate);
        counters.add_failed_insert(outcome.failed_insert);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Utterance;
    use crate::oracle::backend::fake::{FakeOracleBackend, Scripted};
    use crate::store::backend::fake::FakeStoreBackend;
    use chrono::NaiveDate;

    fn utterance(text: &str, date: NaiveDate) -> Utterance {
        Utterance { text: text.into(), observed_on: date, occurrences: 1 }
    }

    #[tokio::test]
    async fn classifies_and_inserts_whole_chunk() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 11).unwrap();
        let oracle = Arc::new(FakeOracleBackend::new(0));
        oracle.push(Scripted::Success { keyword: "수강신청".into(), category_id: 1 });
        let store = Arc::new(FakeStoreBackend::new(vec![]));

        let worker = ChunkWorker::new(oracle.clone(), store.clone());
        let counters = DateCounters::default();
        let chunk = vec![utterance("수강신청 언제?", date)];

        worker.process(chunk, &counters).await.unwrap();

        assert_eq!(counters.inserted.load(std::sync::atomic::Ordering::Relaxed), 1);
        assert_eq!(counters.oracle_fallbacks.load(std::sync::atomic::Ordering::Relaxed), 0);
        assert_eq!(store.inserted_rows().len(), 1);
    }

    #[tokio::test]
    async fn counts_oracle_fallbacks() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 11).unwrap();
        let oracle = Arc::new(FakeOracleBackend::new(0));
        oracle.push(Scripted::Fallback);
        let store = Arc::new(FakeStoreBackend::new(vec![]));

        let worker = ChunkWorker::new(oracle, store);
        let counters = DateCounters::default();
        let chunk = vec![utterance("unrecognized text", date)];

        worker.process(chunk, &counters).await.unwrap();

        assert_eq!(counters.oracle_fallbacks.load(std::sync::atomic::Ordering::Relaxed), 1);
    }
}
