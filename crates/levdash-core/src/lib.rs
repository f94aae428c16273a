//! Core domain types for the levdash client.
//!
//! This crate provides the types every other crate builds on:
//! - `WalletId`: Validated wallet address with its truncated display form
//! - `LooseDecimal`: Numeric field parsed leniently from backend JSON
//! - `Position`, `PositionStatus`: Backend-owned position snapshot
//! - `TokenRegistry`: Static reference data (icons, max multipliers)
//! - `format`: The single display policy for balances, totals and multipliers

pub mod decimal;
pub mod error;
pub mod format;
pub mod position;
pub mod token;
pub mod wallet;

pub use decimal::LooseDecimal;
pub use error::{ClientError, ClientResult, CoreError, ErrorKind, Result, GENERIC_FAILURE_MESSAGE};
pub use position::{Position, PositionStatus};
pub use token::{TokenInfo, TokenRegistry};
pub use wallet::WalletId;
