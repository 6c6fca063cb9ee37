//! Ambient Prometheus `/metrics` HTTP server (axum), adapted from the
//! teacher's `prometheus/server.rs` to gather from the `StoreMetrics` and
//! `OracleMetrics` registries instead of a single exchange registry.

use crate::appconfig::MetricsConfig;
use crate::error::{AppError, AppResult};
use crate::oracle::metrics::OracleMetrics;
use crate::store::metrics::StoreMetrics;
use std::sync::Arc;

#[cfg(feature = "metrics")]
use axum::{Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};

#[cfg(feature = "metrics")]
#[derive(Clone)]
struct AppState {
    store_metrics: Arc<StoreMetrics>,
    oracle_metrics: Arc<OracleMetrics>,
}

#[cfg(feature = "metrics")]
pub async fn run_metrics_server(
    cfg: MetricsConfig,
    store_metrics: Arc<StoreMetrics>,
    oracle_metrics: Arc<OracleMetrics>,
) -> AppResult<()> {
    let addr: std::net::SocketAddr = format!("{}:{}", cfg.bind_addr, cfg.port)
        .parse()
        .map_err(|e| AppError::InvalidConfig(format!("metrics bind/port invalid: {e}")))?;

    let state = AppState { store_metrics, oracle_metrics };

    let app = Router::new()
        .route(&cfg.metrics_path, get(metrics_handler))
        .with_state(state);

    tracing::info!(
        bind_addr = %cfg.bind_addr,
        port = cfg.port,
        path = %cfg.metrics_path,
        "prometheus metrics server starting"
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Internal(format!("failed to bind metrics server: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Internal(format!("metrics server error: {e}")))?;

    Ok(())
}

#[cfg(feature = "metrics")]
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    use prometheus::Encoder;

    let encoder = prometheus::TextEncoder::new();
    let mut buffer = Vec::new();

    let mut families = state.store_metrics.registry().gather();
    families.extend(state.oracle_metrics.registry().gather());

    if let Err(e) = encoder.encode(&families, &mut buffer) {
        tracing::error!(error = %e, "failed to encode metrics");
        return (StatusCode::INTERNAL_SERVER_ERROR, "gather metrics failed\n").into_response();
    }

    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, encoder.format_type().to_string())],
        buffer,
    )
        .into_response()
}

#[cfg(not(feature = "metrics"))]
pub async fn run_metrics_server(
    _cfg: MetricsConfig,
    _store_metrics: Arc<StoreMetrics>,
    _oracle_metrics: Arc<OracleMetrics>,
) -> AppResult<()> {
    tracing::warn!("metrics feature disabled; /metrics endpoint will not start");
    Ok(())
}
