use thiserror::Error;

/// Crate-wide result type.
pub type AppResult<T> = std::result::Result<T, AppError>;

use reqwest::StatusCode;

#[derive(Debug, Error)]
pub enum AppError {
    // =========
    // Config / startup
    // =========
    #[error("Configuration file IO error: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("Failed to parse TOML config: {0}")]
    ConfigToml(#[from] toml::de::Error),

    #[error("Missing configuration field: {0}")]
    MissingConfig(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // =========
    // Networking / HTTP (classification oracle)
    // =========
    #[error("HTTP transport error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// Oracle returned a non-success HTTP status.
    #[error("oracle error: status={status}, body={body}")]
    OracleHttp { status: StatusCode, body: String },

    /// Oracle response did not match the expected `{keyword, category_id}` schema.
    #[error("oracle response malformed: {0}")]
    OracleSchema(String),

    // =========
    // Serialization / deserialization
    // =========
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    // =========
    // Database
    // =========
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    // =========
    // Metrics / Prometheus
    // =========
    #[error("Prometheus registry error: {0}")]
    Prometheus(#[from] prometheus::Error),

    // =========
    // Application-domain errors
    // =========
    #[error("Unknown category id: {0}")]
    UnknownCategory(i32),

    #[error("Catalog error: {0}")]
    CatalogError(String),

    #[error("Date range invalid: {0}")]
    InvalidRange(String),

    #[error("Failed to spawn task: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Internal error: {0}")]
    Internal(String),
}
