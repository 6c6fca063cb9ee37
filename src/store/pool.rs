use crate::error::{AppError, AppResult};
use crate::store::config::StoreConfig;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// Build the connection pool per §4.2: pool size P, overflow O, connection
/// max-age 3600s by default. No component holds a connection across an
/// oracle call — connections are acquired per query and dropped immediately.
pub async fn connect(cfg: &StoreConfig) -> AppResult<PgPool> {
    let dsn = cfg.dsn()?;

    PgPoolOptions::new()
        .max_connections(cfg.max_connections())
        .min_connections(cfg.pool_size)
        .acquire_timeout(Duration::from_millis(cfg.acquire_timeout_ms))
        .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs))
        .connect(&dsn)
        .await
        .map_err(AppError::Sqlx)
}
