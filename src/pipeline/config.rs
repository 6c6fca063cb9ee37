use crate::error::{AppError, AppResult};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// K: utterances per chunk handed to one `ChunkWorker` (§4.4).
    pub chunk_size: usize,
    /// W: concurrent `ChunkWorker`s per date (§4.5).
    pub workers_per_date: usize,
    /// D: concurrent `DatePipeline`s per range (§4.6).
    pub concurrent_dates: usize,
    /// B: rows per `insert_batch` round trip (§4.2); lives on `StoreConfig`
    /// in practice but is validated here as part of the same knob set.
    pub insert_batch_size: usize,
}

impl PipelineConfig {
    pub fn validate(&self) -> AppResult<()> {
        if self.chunk_size == 0 {
            return Err(AppError::InvalidConfig("pipeline.chunk_size must be >= 1".into()));
        }
        if self.workers_per_date == 0 {
            return Err(AppError::InvalidConfig(
                "pipeline.workers_per_date must be >= 1".into(),
            ));
        }
        if self.concurrent_dates == 0 {
            return Err(AppError::InvalidConfig(
                "pipeline.concurrent_dates must be >= 1".into(),
            ));
        }
        if self.insert_batch_size == 0 {
            return Err(AppError::InvalidConfig(
                "pipeline.insert_batch_size must be >= 1".into(),
            ));
        }
        Ok(())
    }
}
