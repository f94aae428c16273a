//! External wallet connector abstraction.

use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by a wallet connector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectorError {
    #[error("Wallet connector unavailable: {0}")]
    Unavailable(String),

    #[error("Connection rejected: {0}")]
    Rejected(String),
}

/// Opaque capability provider that resolves a wallet address.
///
/// The handshake itself (browser extension, session wallet SDK, ...) lives
/// behind this trait.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletConnector: Send + Sync {
    /// Ask the wallet for its address.
    async fn connect(&self) -> Result<String, ConnectorError>;

    /// Tear down the wallet-side session.
    async fn disconnect(&self) -> Result<(), ConnectorError>;
}

/// Connector that resolves to a preconfigured address.
///
/// Used by the command-line front end, where the address comes from flags
/// or configuration instead of an interactive wallet.
#[derive(Debug, Clone, Default)]
pub struct StaticConnector {
    address: Option<String>,
}

impl StaticConnector {
    pub fn new(address: Option<String>) -> Self {
        Self { address }
    }
}

#[async_trait]
impl WalletConnector for StaticConnector {
    async fn connect(&self) -> Result<String, ConnectorError> {
        self.address
            .clone()
            .filter(|a| !a.trim().is_empty())
            .ok_or_else(|| ConnectorError::Unavailable("no wallet address configured".to_string()))
    }

    async fn disconnect(&self) -> Result<(), ConnectorError> {
        Ok(())
    }
}
