//! API error types.

use levdash_core::ClientError;
use thiserror::Error;

/// Failure of a single backend call.
///
/// `Clone` so one result can be shared between coalesced callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found")]
    NotFound,

    #[error("HTTP {status}: {}", message.as_deref().unwrap_or("<no message>"))]
    Server { status: u16, message: Option<String> },

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl ApiError {
    /// Short label used for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            ApiError::HttpClient(_) => "client_error",
            ApiError::Network(_) => "network_error",
            ApiError::NotFound => "not_found",
            ApiError::Server { .. } => "server_error",
            ApiError::Malformed(_) => "malformed",
        }
    }
}

impl From<ApiError> for ClientError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::HttpClient(msg) | ApiError::Network(msg) => ClientError::Network(msg),
            ApiError::NotFound => ClientError::server(Some(404), None),
            ApiError::Server { status, message } => ClientError::server(Some(status), message),
            // Payloads that fail schema validation are server faults
            ApiError::Malformed(_) => ClientError::server(None, None),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
