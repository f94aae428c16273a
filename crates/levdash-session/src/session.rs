//! Wallet session state.

use std::sync::Arc;

use levdash_core::{ClientError, ClientResult, WalletId};
use levdash_telemetry::Metrics;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::connector::WalletConnector;

/// Connected wallet identity with an explicit lifecycle.
///
/// `connect()` is the only way to populate the wallet id and `disconnect()`
/// the only way to clear it. Readers see `None` as "disabled": nothing that
/// needs a wallet may issue a request while the session is empty.
pub struct WalletSession {
    connector: Arc<dyn WalletConnector>,
    tx: watch::Sender<Option<WalletId>>,
}

impl WalletSession {
    /// Create a disconnected session bound to `connector`.
    pub fn new(connector: Arc<dyn WalletConnector>) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { connector, tx }
    }

    /// Resolve the wallet address through the connector and store it.
    ///
    /// On failure the session is left exactly as it was.
    pub async fn connect(&self) -> ClientResult<WalletId> {
        let address = self.connector.connect().await.map_err(|e| {
            warn!(error = %e, "Wallet connector failed");
            ClientError::Connection(e.to_string())
        })?;

        let wallet = WalletId::parse(&address).map_err(|e| {
            warn!(error = %e, "Wallet connector returned an invalid address");
            ClientError::Connection(e.to_string())
        })?;

        self.tx.send_replace(Some(wallet.clone()));
        Metrics::wallet_connected();
        info!(wallet = %wallet.short(), "Wallet connected");
        Ok(wallet)
    }

    /// Clear the session.
    ///
    /// The wallet id is cleared even if the connector fails to tear down its
    /// side; that failure is only logged.
    pub async fn disconnect(&self) {
        if let Err(e) = self.connector.disconnect().await {
            warn!(error = %e, "Wallet connector disconnect failed");
        }
        let previous = self.tx.send_replace(None);
        Metrics::wallet_disconnected();
        if let Some(wallet) = previous {
            info!(wallet = %wallet.short(), "Wallet disconnected");
        }
    }

    /// Current wallet id, `None` when disconnected.
    #[must_use]
    pub fn wallet_id(&self) -> Option<WalletId> {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Subscribe to connect/disconnect transitions.
    pub fn subscribe(&self) -> watch::Receiver<Option<WalletId>> {
        self.tx.subscribe()
    }
}
