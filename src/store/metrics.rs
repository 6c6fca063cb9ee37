use crate::error::AppResult;

#[cfg(feature = "metrics")]
use prometheus::{IntCounter, Opts, Registry};

/// Gateway-level counters, mirroring the teacher's `DbMetrics`/`IngestMetrics`
/// shape: a handful of named counters registered against a private registry,
/// gathered through the shared `/metrics` endpoint.
#[derive(Clone, Debug)]
pub struct StoreMetrics {
    #[cfg(feature = "metrics")]
    registry: Registry,
    #[cfg(feature = "metrics")]
    batches_written_total: IntCounter,
    #[cfg(feature = "metrics")]
    rows_written_total: IntCounter,
    #[cfg(feature = "metrics")]
    batch_fallback_total: IntCounter,
    #[cfg(feature = "metrics")]
    failed_insert_total: IntCounter,
    #[cfg(feature = "metrics")]
    guard_truncated_total: IntCounter,
    #[cfg(feature = "metrics")]
    guard_remapped_category_total: IntCounter,

    #[cfg(not(feature = "metrics"))]
    _noop: (),
}

impl StoreMetrics {
    pub fn new() -> AppResult<Self> {
        #[cfg(feature = "metrics")]
        {
            let registry = Registry::new();

            let batches_written_total = IntCounter::with_opts(Opts::new(
                "store_batches_written_total",
                "Insert batches successfully written",
            ))?;
            let rows_written_total = IntCounter::with_opts(Opts::new(
                "store_rows_written_total",
                "KeywordRecord rows successfully inserted",
            ))?;
            let batch_fallback_total = IntCounter::with_opts(Opts::new(
                "store_batch_fallback_total",
                "Batches that fell back to per-row insert after a batch error",
            ))?;
            let failed_insert_total = IntCounter::with_opts(Opts::new(
                "store_failed_insert_total",
                "Rows that failed to insert even after per-row fallback",
            ))?;
            let guard_truncated_total = IntCounter::with_opts(Opts::new(
                "store_guard_truncated_total",
                "Rows whose keyword was truncated by the pre-insert guard",
            ))?;
            let guard_remapped_category_total = IntCounter::with_opts(Opts::new(
                "store_guard_remapped_category_total",
                "Rows whose category_id was remapped to the fallback by the pre-insert guard",
            ))?;

            registry.register(Box::new(batches_written_total.clone()))?;
            registry.register(Box::new(rows_written_total.clone()))?;
            registry.register(Box::new(batch_fallback_total.clone()))?;
            registry.register(Box::new(failed_insert_total.clone()))?;
            registry.register(Box::new(guard_truncated_total.clone()))?;
            registry.register(Box::new(guard_remapped_category_total.clone()))?;

            Ok(Self {
                registry,
                batches_written_total,
                rows_written_total,
                batch_fallback_total,
                failed_insert_total,
                guard_truncated_total,
                guard_remapped_category_total,
            })
        }

        #[cfg(not(feature = "metrics"))]
        {
            Ok(Self { _noop: () })
        }
    }

    #[cfg(feature = "metrics")]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn inc_batches_written(&self) {
        #[cfg(feature = "metrics")]
        self.batches_written_total.inc();
    }

    pub fn add_rows_written(&self, n: u64) {
        #[cfg(feature = "metrics")]
        self.rows_written_total.inc_by(n);
        #[cfg(not(feature = "metrics"))]
        let _ = n;
    }

    pub fn inc_batch_fallback(&self) {
        #[cfg(feature = "metrics")]
        self.batch_fallback_total.inc();
    }

    pub fn inc_failed_insert(&self) {
        #[cfg(feature = "metrics")]
        self.failed_insert_total.inc();
    }

    pub fn inc_guard_truncated(&self) {
        #[cfg(feature = "metrics")]
        self.guard_truncated_total.inc();
    }

    pub fn inc_guard_remapped_category(&self) {
        #[cfg(feature = "metrics")]
        self.guard_remapped_category_total.inc();
    }
}
