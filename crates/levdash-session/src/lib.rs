//! Wallet session store for levdash.
//!
//! Holds the identity of the connected wallet. The session is an explicit
//! value with a connect/disconnect lifecycle; consumers receive it by
//! injection and observe changes through a watch channel.

pub mod connector;
pub mod session;

pub use connector::{ConnectorError, StaticConnector, WalletConnector};
pub use session::WalletSession;
