//! View types.
//!
//! Every figure is already formatted; the rendering layer only places
//! strings. All types serialize to JSON for the `--json` output mode.

use levdash_core::LooseDecimal;
use rust_decimal::Decimal;
use serde::Serialize;

/// Direction of the current sum relative to the start sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    /// One of the sums is missing.
    Flat,
}

impl Trend {
    pub fn between(start: LooseDecimal, current: LooseDecimal) -> Self {
        match (start.value(), current.value()) {
            (Some(start), Some(current)) if current >= start => Trend::Up,
            (Some(_), Some(_)) => Trend::Down,
            _ => Trend::Flat,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Flat => "flat",
        }
    }
}

/// Deposited balance of one token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenBalanceView {
    pub symbol: String,
    pub name: String,
    pub icon: String,
    pub balance: String,
}

/// Formatted position, used for the dashboard card and the history list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionCard {
    pub token_symbol: String,
    pub token_icon: String,
    /// Amount with eight decimals.
    pub amount: String,
    pub start_price: String,
    /// Multiplier with one decimal (`2.0`).
    pub multiplier: String,
    pub status: String,
    pub is_liquidated: bool,
    pub created_at: String,
    pub closed_at: String,
}

/// Dashboard view for the connected wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSnapshot {
    /// Shortened wallet id (`0xAB...1234`).
    pub wallet: String,
    pub health_factor: String,
    pub borrow_balance: String,
    pub collateral_balance: String,
    pub deposited_balances: Vec<TokenBalanceView>,
    pub current_sum: String,
    pub start_sum: String,
    pub trend: Trend,
    /// Open position, if any.
    pub position: Option<PositionCard>,
}

/// Platform-wide statistics view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsView {
    /// Total value locked, currency formatted.
    pub tvl: String,
    pub unique_users: String,
}

/// Parameters of a position the user intends to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRequest {
    pub token: String,
    pub amount: Decimal,
    pub multiplier: Decimal,
}

/// Result of checking whether a position can be opened right away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum OpenCheck {
    /// Nothing blocks the open.
    Ready,
    /// A position is already open and must be closed first.
    ConfirmationRequired { open: PositionCard },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_trend() {
        let up = Trend::between(LooseDecimal::new(dec!(100)), LooseDecimal::new(dec!(100)));
        let down = Trend::between(LooseDecimal::new(dec!(100)), LooseDecimal::new(dec!(99.99)));
        let flat = Trend::between(LooseDecimal::ABSENT, LooseDecimal::new(dec!(5)));

        assert_eq!(up, Trend::Up);
        assert_eq!(down, Trend::Down);
        assert_eq!(flat, Trend::Flat);
    }
}
