pub mod config;
pub mod date_pipeline;
pub mod orchestrator;
pub mod reconciler;
pub mod summary;
pub mod worker;

pub use config::PipelineConfig;
pub use orchestrator::RangeOrchestrator;
pub use reconciler::Reconciler;
