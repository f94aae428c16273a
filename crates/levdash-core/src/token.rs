//! Static token reference data.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Reference data for a collateral token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Ticker (e.g., "ETH").
    pub symbol: String,
    /// Human-readable name.
    pub name: String,
    /// Icon identifier for the rendering layer.
    pub icon: String,
    /// Highest multiplier the backend accepts for this token.
    pub max_multiplier: Decimal,
}

impl TokenInfo {
    pub fn new(symbol: &str, name: &str, icon: &str, max_multiplier: Decimal) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            icon: icon.to_string(),
            max_multiplier,
        }
    }
}

/// Lookup table of supported tokens, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenRegistry {
    tokens: Vec<TokenInfo>,
}

impl TokenRegistry {
    pub fn new(tokens: Vec<TokenInfo>) -> Self {
        Self { tokens }
    }

    /// Case-insensitive lookup by symbol.
    pub fn get(&self, symbol: &str) -> Option<&TokenInfo> {
        let symbol = symbol.trim();
        self.tokens
            .iter()
            .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TokenInfo> {
        self.tokens.iter()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Icon for a symbol, falling back to a generic placeholder.
    pub fn icon_for(&self, symbol: &str) -> String {
        self.get(symbol)
            .map(|t| t.icon.clone())
            .unwrap_or_else(|| "token-generic".to_string())
    }

    /// Override the max multiplier of known tokens (backend-provided bounds).
    pub fn apply_max_multipliers<'a>(
        &mut self,
        bounds: impl IntoIterator<Item = (&'a str, Decimal)>,
    ) {
        for (symbol, max) in bounds {
            if let Some(token) = self
                .tokens
                .iter_mut()
                .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
            {
                token.max_multiplier = max;
            }
        }
    }
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self::new(vec![
            TokenInfo::new("ETH", "Ethereum", "token-eth", dec!(5.0)),
            TokenInfo::new("STRK", "Starknet", "token-strk", dec!(2.5)),
            TokenInfo::new("USDC", "USD Coin", "token-usdc", dec!(5.0)),
            TokenInfo::new("kSTRK", "Kinetic STRK", "token-kstrk", dec!(1.8)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = TokenRegistry::default();
        assert_eq!(registry.get("eth").unwrap().symbol, "ETH");
        assert_eq!(registry.get("KSTRK").unwrap().symbol, "kSTRK");
        assert!(registry.get("DOGE").is_none());
    }

    #[test]
    fn test_icon_fallback() {
        let registry = TokenRegistry::default();
        assert_eq!(registry.icon_for("STRK"), "token-strk");
        assert_eq!(registry.icon_for("DOGE"), "token-generic");
    }

    #[test]
    fn test_apply_max_multipliers() {
        let mut registry = TokenRegistry::default();
        registry.apply_max_multipliers([("eth", dec!(4.64)), ("DOGE", dec!(9))]);
        assert_eq!(registry.get("ETH").unwrap().max_multiplier, dec!(4.64));
        assert_eq!(registry.len(), 4);
    }
}
