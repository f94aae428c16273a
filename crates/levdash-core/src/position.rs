//! Position snapshot types.
//!
//! Positions are owned by the backend. The client only ever holds an
//! immutable snapshot obtained from a read; changes go through the close and
//! withdraw mutations followed by a re-read.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::decimal::LooseDecimal;
use crate::format;

/// Lifecycle status reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionStatus {
    Pending,
    Opened,
    Closed,
    /// Any status this client does not know, kept verbatim.
    Other(String),
}

impl PositionStatus {
    /// Parse a backend status string (case-insensitive).
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" => PositionStatus::Pending,
            "OPENED" | "OPEN" => PositionStatus::Opened,
            "CLOSED" => PositionStatus::Closed,
            _ => PositionStatus::Other(raw.trim().to_string()),
        }
    }

    /// Label for display (`Opened`, `Closed`, ...).
    pub fn label(&self) -> String {
        match self {
            PositionStatus::Pending => "Pending".to_string(),
            PositionStatus::Opened => "Opened".to_string(),
            PositionStatus::Closed => "Closed".to_string(),
            PositionStatus::Other(raw) => format::format_status(raw),
        }
    }
}

impl fmt::Display for PositionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Immutable snapshot of a leveraged position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    /// Collateral token (e.g., "ETH").
    pub token_symbol: String,
    /// Deposited amount in token units.
    pub amount: LooseDecimal,
    /// Token price at open.
    pub start_price: LooseDecimal,
    /// Leverage factor chosen at open.
    pub multiplier: LooseDecimal,
    pub is_liquidated: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub status: PositionStatus,
}

impl Position {
    /// Whether this position currently counts as the wallet's open position.
    pub fn is_open(&self) -> bool {
        self.status == PositionStatus::Opened && !self.is_liquidated
    }
}

/// Parse a backend timestamp.
///
/// Accepts RFC 3339 and naive `YYYY-MM-DDTHH:MM:SS[.f]` (read as UTC).
/// Anything else yields `None`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
