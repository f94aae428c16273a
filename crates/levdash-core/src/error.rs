//! Error types for levdash-core.
//!
//! `CoreError` covers local parsing failures. `ClientError` is the
//! user-facing taxonomy every command boundary reports in.

use thiserror::Error;

/// Message shown when the backend fails without explaining why.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong, please try again";

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid wallet id: {0}")]
    InvalidWalletId(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Broad category of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Connection,
    Network,
    Validation,
    Server,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Connection => "connection",
            ErrorKind::Network => "network",
            ErrorKind::Validation => "validation",
            ErrorKind::Server => "server",
        }
    }
}

/// User-facing error taxonomy.
///
/// None of these are fatal: a failed action can always be re-invoked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Wallet connector unavailable or the user rejected the request.
    #[error("Wallet connection failed: {0}")]
    Connection(String),

    /// HTTP transport failure.
    #[error("Network error: {0}")]
    Network(String),

    /// Rejected locally before anything was dispatched.
    #[error("{0}")]
    Validation(String),

    /// Non-2xx response or a payload that failed schema validation.
    #[error("{message}")]
    Server {
        status: Option<u16>,
        message: String,
    },
}

impl ClientError {
    /// Build a server error, falling back to the generic message when the
    /// backend did not provide one.
    pub fn server(status: Option<u16>, message: Option<String>) -> Self {
        let message = message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
        ClientError::Server { status, message }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Connection(_) => ErrorKind::Connection,
            ClientError::Network(_) => ErrorKind::Network,
            ClientError::Validation(_) => ErrorKind::Validation,
            ClientError::Server { .. } => ErrorKind::Server,
        }
    }

    /// Text to show the user. Server messages are passed through verbatim.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Server { message, .. } => message.clone(),
            ClientError::Validation(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for user-facing operations.
pub type ClientResult<T> = std::result::Result<T, ClientError>;
