//! Wire schemas for the backend REST API.
//!
//! Every field is treated as optionally absent. Structural mismatches (wrong
//! JSON shape, wrong field types) fail deserialization and surface as
//! `ApiError::Malformed`. Numeric display fields use `LooseDecimal` so that
//! unusable numbers fall through to the `"0.00"` display default instead.

use std::collections::BTreeMap;

use levdash_core::position::parse_timestamp;
use levdash_core::{LooseDecimal, Position, PositionStatus, WalletId};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Deserialize a number or string into its textual form; anything else is `None`.
fn de_verbatim<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Treat an explicit `null` like an absent field.
fn de_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize a count sent as a number or a numeric string.
fn de_loose_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Raw position entry.
///
/// Endpoint: `GET /api/user-positions/{wallet_id}`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawPosition {
    #[serde(default, alias = "tokenSymbol", alias = "token")]
    pub token_symbol: Option<String>,
    #[serde(default)]
    pub amount: LooseDecimal,
    #[serde(default, alias = "startPrice")]
    pub start_price: LooseDecimal,
    #[serde(default)]
    pub multiplier: LooseDecimal,
    #[serde(default, alias = "isLiquidated")]
    pub is_liquidated: Option<bool>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<String>,
    #[serde(default, alias = "closedAt")]
    pub closed_at: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl RawPosition {
    /// Convert into the domain snapshot.
    pub fn into_position(self) -> Position {
        Position {
            token_symbol: self.token_symbol.unwrap_or_default(),
            amount: self.amount,
            start_price: self.start_price,
            multiplier: self.multiplier,
            is_liquidated: self.is_liquidated.unwrap_or(false),
            created_at: self.created_at.as_deref().and_then(parse_timestamp),
            closed_at: self.closed_at.as_deref().and_then(parse_timestamp),
            status: self
                .status
                .as_deref()
                .map(PositionStatus::parse)
                .unwrap_or_else(|| PositionStatus::Other("unknown".to_string())),
        }
    }
}

/// The positions endpoint returns either a single object or a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PositionsPayload {
    Many(Vec<RawPosition>),
    One(RawPosition),
}

impl PositionsPayload {
    pub fn into_positions(self) -> Vec<Position> {
        match self {
            PositionsPayload::Many(raw) => raw.into_iter().map(RawPosition::into_position).collect(),
            PositionsPayload::One(raw) => vec![raw.into_position()],
        }
    }
}

/// Dashboard figures for a wallet.
///
/// Endpoint: `GET /api/dashboard?wallet_id=...`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DashboardData {
    /// Backend-computed solvency ratio, kept verbatim.
    #[serde(
        default,
        alias = "health_ratio",
        alias = "healthFactor",
        deserialize_with = "de_verbatim"
    )]
    pub health_factor: Option<String>,
    #[serde(default, alias = "borrowed", alias = "borrowBalance")]
    pub borrow_balance: LooseDecimal,
    #[serde(default, alias = "balance", alias = "collateralBalance")]
    pub collateral_balance: LooseDecimal,
    #[serde(default, alias = "currentSum")]
    pub current_sum: LooseDecimal,
    #[serde(default, alias = "startSum")]
    pub start_sum: LooseDecimal,
    /// Deposited balance per token symbol.
    #[serde(
        default,
        alias = "deposited_data",
        alias = "depositedBalances",
        deserialize_with = "de_null_default"
    )]
    pub deposited: BTreeMap<String, LooseDecimal>,
    /// Backend-provided max multiplier per token symbol.
    #[serde(default, deserialize_with = "de_null_default")]
    pub multipliers: BTreeMap<String, LooseDecimal>,
}

impl DashboardData {
    /// Max multipliers that parsed to usable numbers.
    pub fn max_multipliers(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.multipliers
            .iter()
            .filter_map(|(symbol, value)| value.non_negative().map(|v| (symbol.as_str(), v)))
    }
}

/// Platform-wide statistics.
///
/// Endpoint: `GET /api/get_stats`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlatformStats {
    /// Total value locked, in USD.
    #[serde(default, alias = "tvl", alias = "totalOpenedAmount")]
    pub total_opened_amount: LooseDecimal,
    #[serde(default, alias = "uniqueUsers", deserialize_with = "de_loose_count")]
    pub unique_users: Option<u64>,
}

/// Bug report body.
///
/// Endpoint: `POST /api/save-bug-report`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BugReport {
    pub wallet_id: WalletId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram_id: Option<String>,
    pub bug_description: String,
}

/// Notification subscription body.
///
/// Endpoint: `POST /api/subscribe-to-notification`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscribeRequest {
    pub wallet_id: WalletId,
    pub telegram_id: String,
}

/// Acknowledgement of a mutation.
///
/// Bodies vary by endpoint; only an optional `message` is interpreted and the
/// rest is kept for callers that need it (e.g., withdraw transaction data).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationAck {
    pub message: Option<String>,
    pub data: Value,
}

impl MutationAck {
    /// Build from a 2xx response body. Empty and non-JSON bodies are accepted.
    pub fn from_body(body: &str) -> Self {
        if body.trim().is_empty() {
            return Self::default();
        }
        match serde_json::from_str::<Value>(body) {
            Ok(data) => Self {
                message: data
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                data,
            },
            Err(_) => Self {
                message: Some(body.trim().to_string()),
                data: Value::Null,
            },
        }
    }
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub detail: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl ErrorBody {
    /// Extract the human-readable message, if any.
    pub fn extract(body: &str) -> Option<String> {
        let parsed: ErrorBody = serde_json::from_str(body).ok()?;
        [parsed.message, parsed.detail, parsed.error]
            .into_iter()
            .flatten()
            .find_map(|v| match v {
                Value::String(s) if !s.trim().is_empty() => Some(s),
                _ => None,
            })
    }
}
