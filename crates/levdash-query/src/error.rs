//! Query layer error types.

use levdash_api::ApiError;
use levdash_core::ClientError;
use thiserror::Error;

/// Message shown when an action needs a wallet and none is connected.
pub const WALLET_REQUIRED_MESSAGE: &str = "Connect a wallet first";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("{WALLET_REQUIRED_MESSAGE}")]
    WalletRequired,

    #[error("{0} is already in progress")]
    AlreadyPending(&'static str),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl From<QueryError> for ClientError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::WalletRequired => {
                ClientError::Connection(WALLET_REQUIRED_MESSAGE.to_string())
            }
            QueryError::AlreadyPending(_) => ClientError::Validation(err.to_string()),
            QueryError::Api(api) => api.into(),
        }
    }
}

pub type QueryResult<T> = Result<T, QueryError>;
