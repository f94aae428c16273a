//! Dashboard aggregation.
//!
//! DashboardAggregator combines backend figures, the open position and token
//! reference data into formatted views. It holds no server data itself; only
//! the token registry lives here, refreshed with backend max multipliers.

use parking_lot::RwLock;
use rust_decimal::Decimal;

use levdash_api::{DashboardData, PlatformStats};
use levdash_core::format::{
    format_balance, format_currency, format_multiplier, format_timestamp, format_verbatim,
};
use levdash_core::{ClientError, ClientResult, Position, TokenRegistry, WalletId};

use crate::types::{
    DashboardSnapshot, OpenRequest, PositionCard, StatsView, TokenBalanceView, Trend,
};

/// Aggregates server data into view-ready snapshots.
#[derive(Debug, Default)]
pub struct DashboardAggregator {
    tokens: RwLock<TokenRegistry>,
}

impl DashboardAggregator {
    pub fn new(tokens: TokenRegistry) -> Self {
        Self {
            tokens: RwLock::new(tokens),
        }
    }

    /// Current token reference data.
    pub fn tokens(&self) -> TokenRegistry {
        self.tokens.read().clone()
    }

    /// Build the dashboard view.
    ///
    /// Backend max multipliers in `data` replace the configured ones.
    pub fn snapshot(
        &self,
        wallet: &WalletId,
        data: &DashboardData,
        open: Option<&Position>,
    ) -> DashboardSnapshot {
        self.tokens.write().apply_max_multipliers(data.max_multipliers());

        DashboardSnapshot {
            wallet: wallet.short(),
            health_factor: format_verbatim(data.health_factor.as_deref()),
            borrow_balance: format_balance(data.borrow_balance),
            collateral_balance: format_balance(data.collateral_balance),
            deposited_balances: self.collect_deposited(data),
            current_sum: format_currency(data.current_sum),
            start_sum: format_currency(data.start_sum),
            trend: Trend::between(data.start_sum, data.current_sum),
            position: open.map(|pos| self.position_card(pos)),
        }
    }

    /// Deposited balances: every known token in registry order, then any
    /// symbol the backend reports that the registry does not know.
    fn collect_deposited(&self, data: &DashboardData) -> Vec<TokenBalanceView> {
        let tokens = self.tokens.read();

        let mut balances: Vec<TokenBalanceView> = tokens
            .iter()
            .map(|token| {
                let value = data
                    .deposited
                    .iter()
                    .find(|(symbol, _)| symbol.eq_ignore_ascii_case(&token.symbol))
                    .map(|(_, v)| *v)
                    .unwrap_or_default();
                TokenBalanceView {
                    symbol: token.symbol.clone(),
                    name: token.name.clone(),
                    icon: token.icon.clone(),
                    balance: format_balance(value),
                }
            })
            .collect();

        for (symbol, value) in &data.deposited {
            if tokens.get(symbol).is_none() {
                balances.push(TokenBalanceView {
                    symbol: symbol.clone(),
                    name: symbol.clone(),
                    icon: tokens.icon_for(symbol),
                    balance: format_balance(*value),
                });
            }
        }

        balances
    }

    pub fn position_card(&self, pos: &Position) -> PositionCard {
        PositionCard {
            token_symbol: pos.token_symbol.clone(),
            token_icon: self.tokens.read().icon_for(&pos.token_symbol),
            amount: format_balance(pos.amount),
            start_price: format_balance(pos.start_price),
            multiplier: format_multiplier(pos.multiplier),
            status: pos.status.label(),
            is_liquidated: pos.is_liquidated,
            created_at: format_timestamp(pos.created_at),
            closed_at: format_timestamp(pos.closed_at),
        }
    }

    /// Position history, newest first. Undated entries go last.
    pub fn position_history(&self, positions: &[Position]) -> Vec<PositionCard> {
        let mut sorted: Vec<&Position> = positions.iter().collect();
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sorted.into_iter().map(|pos| self.position_card(pos)).collect()
    }

    pub fn stats_view(&self, stats: &PlatformStats) -> StatsView {
        StatsView {
            tvl: format_currency(stats.total_opened_amount),
            unique_users: stats
                .unique_users
                .map(|n| n.to_string())
                .unwrap_or_else(|| "0".to_string()),
        }
    }

    /// Validate an open request against token reference data.
    ///
    /// Requires a known token, a positive amount and a multiplier in
    /// `(1, max_multiplier]`.
    pub fn validate_open(&self, req: &OpenRequest) -> ClientResult<()> {
        let tokens = self.tokens.read();
        let token = tokens.get(&req.token).ok_or_else(|| {
            ClientError::Validation(format!("Unsupported token: {}", req.token.trim()))
        })?;

        if req.amount <= Decimal::ZERO {
            return Err(ClientError::Validation(
                "Amount must be greater than zero".to_string(),
            ));
        }

        if req.multiplier <= Decimal::ONE || req.multiplier > token.max_multiplier {
            return Err(ClientError::Validation(format!(
                "Multiplier for {} must be above 1.0 and at most {:.1}",
                token.symbol, token.max_multiplier
            )));
        }

        Ok(())
    }
}
