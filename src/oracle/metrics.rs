use crate::error::AppResult;

#[cfg(feature = "metrics")]
use prometheus::{Histogram, HistogramOpts, IntCounter, Opts, Registry};

#[derive(Clone, Debug)]
pub struct OracleMetrics {
    #[cfg(feature = "metrics")]
    registry: Registry,
    #[cfg(feature = "metrics")]
    requests_total: IntCounter,
    #[cfg(feature = "metrics")]
    retryable_errors_total: IntCounter,
    #[cfg(feature = "metrics")]
    permanent_errors_total: IntCounter,
    #[cfg(feature = "metrics")]
    malformed_responses_total: IntCounter,
    #[cfg(feature = "metrics")]
    fallbacks_total: IntCounter,
    #[cfg(feature = "metrics")]
    latency_seconds: Histogram,

    #[cfg(not(feature = "metrics"))]
    _noop: (),
}

impl OracleMetrics {
    pub fn new() -> AppResult<Self> {
        #[cfg(feature = "metrics")]
        {
            let registry = Registry::new();

            let requests_total = IntCounter::with_opts(Opts::new(
                "oracle_requests_total",
                "Oracle HTTP requests issued (one per attempt, including retries)",
            ))?;
            let retryable_errors_total = IntCounter::with_opts(Opts::new(
                "oracle_retryable_errors_total",
                "Oracle attempts that failed with a retryable error",
            ))?;
            let permanent_errors_total = IntCounter::with_opts(Opts::new(
                "oracle_permanent_errors_total",
                "Oracle attempts that failed with a non-retryable error",
            ))?;
            let malformed_responses_total = IntCounter::with_opts(Opts::new(
                "oracle_malformed_responses_total",
                "Oracle responses that did not match the expected schema",
            ))?;
            let fallbacks_total = IntCounter::with_opts(Opts::new(
                "oracle_fallbacks_total",
                "Classifications resolved via the local fallback path",
            ))?;
            let latency_seconds = Histogram::with_opts(HistogramOpts::new(
                "oracle_classify_latency_seconds",
                "End-to-end classify() latency including retries",
            ))?;

            registry.register(Box::new(requests_total.clone()))?;
            registry.register(Box::new(retryable_errors_total.clone()))?;
            registry.register(Box::new(permanent_errors_total.clone()))?;
            registry.register(Box::new(malformed_responses_total.clone()))?;
            registry.register(Box::new(fallbacks_total.clone()))?;
            registry.register(Box::new(latency_seconds.clone()))?;

            Ok(Self {
                registry,
                requests_total,
                retryable_errors_total,
                permanent_errors_total,
                malformed_responses_total,
                fallbacks_total,
                latency_seconds,
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

    pub fn inc_requests(&self) {
        #[cfg(feature = "metrics")]
        self.requests_total.inc();
    }

    pub fn inc_retryable_errors(&self) {
        #[cfg(feature = "metrics")]
        self.retryable_errors_total.inc();
    }

    pub fn inc_permanent_errors(&self) {
        #[cfg(feature = "metrics")]
        self.permanent_errors_total.inc();
    }

    pub fn inc_malformed_responses(&self) {
        #[cfg(feature = "metrics")]
        self.malformed_responses_total.inc();
    }

    pub fn inc_fallbacks(&self) {
        #[cfg(feature = "metrics")]
        self.fallbacks_total.inc();
    }

    pub fn observe_latency(&self, secs: f64) {
        #[cfg(feature = "metrics")]
        self.latency_seconds.observe(secs);
        #[cfg(not(feature = "metrics"))]
        let _ = secs;
    }
}
