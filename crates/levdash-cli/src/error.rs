//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Backend client error: {0}")]
    Backend(#[from] levdash_api::ApiError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] levdash_telemetry::TelemetryError),

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

pub type AppResult<T> = Result<T, AppError>;
