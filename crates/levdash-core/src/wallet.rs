//! Wallet identifier.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Maximum hex digits in a wallet address (a 252-bit field element fits in 63).
const MAX_HEX_DIGITS: usize = 64;

/// Characters kept on each side of the truncated display form.
const DISPLAY_EDGE: usize = 4;

/// Address of a connected wallet (`0x` followed by hex digits).
///
/// The original casing is preserved for display. Equality, hashing and
/// ordering ignore ASCII case, so `0xAB..` and `0xab..` are the same wallet.
/// Use [`WalletId::parse`] or `FromStr` to construct one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WalletId(String);

impl WalletId {
    /// Validate and wrap an address.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| CoreError::InvalidWalletId(format!("missing 0x prefix: {trimmed}")))?;

        if digits.is_empty() || digits.len() > MAX_HEX_DIGITS {
            return Err(CoreError::InvalidWalletId(format!(
                "expected 1-{MAX_HEX_DIGITS} hex digits, got {}",
                digits.len()
            )));
        }
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CoreError::InvalidWalletId(format!(
                "non-hex characters in {trimmed}"
            )));
        }

        Ok(Self(trimmed.to_string()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Truncated form for display, e.g. `0xAB...1234`.
    ///
    /// Addresses too short to benefit from truncation are returned whole.
    pub fn short(&self) -> String {
        let s = self.0.as_str();
        if s.len() <= DISPLAY_EDGE * 2 + 3 {
            return s.to_string();
        }
        format!(
            "{}...{}",
            &s[..DISPLAY_EDGE],
            &s[s.len() - DISPLAY_EDGE..]
        )
    }

    fn folded(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.bytes().map(|b| b.to_ascii_lowercase())
    }
}

impl PartialEq for WalletId {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for WalletId {}

impl Hash for WalletId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.folded() {
            state.write_u8(b);
        }
        state.write_usize(self.0.len());
    }
}

impl PartialOrd for WalletId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WalletId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.folded().cmp(other.folded())
    }
}

impl fmt::Display for WalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WalletId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for WalletId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<WalletId> for String {
    fn from(id: WalletId) -> Self {
        id.0
    }
}
