//! Leniently parsed decimal fields.
//!
//! The backend sends numbers as JSON numbers, numeric strings, `null`, or
//! leaves them out entirely. `LooseDecimal` accepts all of these and keeps
//! `None` for anything that is not a finite number, so the display layer can
//! apply its `"0.00"` default in one place.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Numeric field that may be absent or malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct LooseDecimal(Option<Decimal>);

impl LooseDecimal {
    pub const ABSENT: Self = Self(None);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(Some(value))
    }

    #[inline]
    pub fn value(&self) -> Option<Decimal> {
        self.0
    }

    #[inline]
    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }

    /// Value if present and not negative.
    #[inline]
    pub fn non_negative(&self) -> Option<Decimal> {
        self.0.filter(|d| !d.is_sign_negative() || d.is_zero())
    }

    /// Interpret an arbitrary JSON value.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Number(n) => Self(parse_decimal(&n.to_string())),
            Value::String(s) => Self(parse_decimal(s)),
            _ => Self(None),
        }
    }
}

/// Parse plain or scientific notation, ignoring surrounding whitespace.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

impl From<Decimal> for LooseDecimal {
    fn from(d: Decimal) -> Self {
        Self(Some(d))
    }
}

impl From<Option<Decimal>> for LooseDecimal {
    fn from(d: Option<Decimal>) -> Self {
        Self(d)
    }
}

impl fmt::Display for LooseDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(d) => write!(f, "{d}"),
            None => write!(f, "-"),
        }
    }
}

impl<'de> Deserialize<'de> for LooseDecimal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_json(&value))
    }
}

impl Serialize for LooseDecimal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.0 {
            Some(d) => serializer.serialize_str(&d.to_string()),
            None => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default)]
        amount: LooseDecimal,
    }

    #[test]
    fn test_accepts_numbers_and_strings() {
        assert_eq!(LooseDecimal::from_json(&json!(10.5)).value(), Some(dec!(10.5)));
        assert_eq!(LooseDecimal::from_json(&json!("12.3")).value(), Some(dec!(12.3)));
        assert_eq!(LooseDecimal::from_json(&json!(2)).value(), Some(dec!(2)));
        assert_eq!(LooseDecimal::from_json(&json!(" 7 ")).value(), Some(dec!(7)));
    }

    #[test]
    fn test_scientific_notation() {
        assert_eq!(LooseDecimal::from_json(&json!("1e-7")).value(), Some(dec!(0.0000001)));
    }

    #[test]
    fn test_rejects_non_numeric() {
        assert!(!LooseDecimal::from_json(&json!("abc")).is_present());
        assert!(!LooseDecimal::from_json(&json!("")).is_present());
        assert!(!LooseDecimal::from_json(&json!(null)).is_present());
        assert!(!LooseDecimal::from_json(&json!(true)).is_present());
        assert!(!LooseDecimal::from_json(&json!({"v": 1})).is_present());
    }

    #[test]
    fn test_missing_field_defaults_to_absent() {
        let holder: Holder = serde_json::from_str("{}").unwrap();
        assert!(!holder.amount.is_present());

        let holder: Holder = serde_json::from_str(r#"{"amount": "NaN"}"#).unwrap();
        assert!(!holder.amount.is_present());
    }

    #[test]
    fn test_non_negative_filter() {
        assert_eq!(LooseDecimal::new(dec!(-1)).non_negative(), None);
        assert_eq!(LooseDecimal::new(dec!(0)).non_negative(), Some(dec!(0)));
        assert_eq!(LooseDecimal::new(dec!(3)).non_negative(), Some(dec!(3)));
    }
}
