//! Display formatting policy.
//!
//! Every balance, total and multiplier shown to the user goes through these
//! functions. Absent, non-numeric and negative inputs all render as
//! [`ZERO_DISPLAY`].

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::decimal::LooseDecimal;

/// Literal shown for any missing or unusable numeric value.
pub const ZERO_DISPLAY: &str = "0.00";

/// Fixed precision for balance-like values.
pub const BALANCE_DECIMALS: u32 = 8;

/// Totals at or above this value switch to compact notation.
pub const COMPACT_THRESHOLD: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// Compact suffixes, largest first, with their power of ten.
const COMPACT_UNITS: [(u32, &str); 4] = [(12, "T"), (9, "B"), (6, "M"), (3, "K")];

fn round(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Render with exactly `dp` decimals, padding the plain `Display` output.
fn fixed(value: Decimal, dp: u32) -> String {
    let rounded = round(value, dp);
    let text = if rounded.is_zero() {
        "0".to_string()
    } else {
        rounded.to_string()
    };
    let (int, frac) = match text.split_once('.') {
        Some((int, frac)) => (int, frac),
        None => (text.as_str(), ""),
    };
    format!("{int}.{frac:0<width$}", width = dp as usize)
}

/// Format a balance with exactly eight decimals.
pub fn format_balance(value: LooseDecimal) -> String {
    match value.non_negative() {
        Some(d) => fixed(d, BALANCE_DECIMALS),
        None => ZERO_DISPLAY.to_string(),
    }
}

/// Format a multiplier with one decimal (`2` -> `"2.0"`).
pub fn format_multiplier(value: LooseDecimal) -> String {
    match value.non_negative() {
        Some(d) => fixed(d, 1),
        None => ZERO_DISPLAY.to_string(),
    }
}

/// Format a currency total in USD.
///
/// Below [`COMPACT_THRESHOLD`] this is standard currency (`$999.50`).
/// At or above it, compact notation with two significant digits for scaled
/// values under 100 (`$1.2K`, `$12K`) and whole units otherwise (`$123K`).
pub fn format_currency(value: LooseDecimal) -> String {
    let Some(d) = value.non_negative() else {
        return ZERO_DISPLAY.to_string();
    };

    if d < COMPACT_THRESHOLD {
        return format!("${}", fixed(d, 2));
    }

    for (idx, (exp, suffix)) in COMPACT_UNITS.iter().enumerate() {
        let unit = Decimal::from(10u64.pow(*exp));
        if d < unit {
            continue;
        }
        let scaled = compact_round(d / unit);
        // 999.96K rounds up into the next unit
        if scaled >= COMPACT_THRESHOLD && idx > 0 {
            let (_, bigger) = COMPACT_UNITS[idx - 1];
            return format!("$1{bigger}");
        }
        return format!("${}{suffix}", scaled.normalize());
    }

    format!("${}", fixed(d, 2))
}

fn compact_round(scaled: Decimal) -> Decimal {
    if scaled < Decimal::TEN {
        round(scaled, 1)
    } else {
        round(scaled, 0)
    }
}

/// Pass-through formatting for backend-computed ratios such as health factor.
pub fn format_verbatim(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => ZERO_DISPLAY.to_string(),
    }
}

/// Capitalize a status label (`OPENED` -> `Opened`).
pub fn format_status(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Format a timestamp for position tables, `-` when absent.
pub fn format_timestamp(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(ts) => ts.format("%Y-%m-%d %H:%M").to_string(),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn d(v: Decimal) -> LooseDecimal {
        LooseDecimal::new(v)
    }

    #[test]
    fn test_balance_absent_is_zero_literal() {
        assert_eq!(format_balance(LooseDecimal::ABSENT), "0.00");
    }

    #[test]
    fn test_balance_negative_is_zero_literal() {
        assert_eq!(format_balance(d(dec!(-0.5))), "0.00");
    }

    #[test]
    fn test_balance_eight_decimals() {
        assert_eq!(format_balance(d(dec!(12.3))), "12.30000000");
        assert_eq!(format_balance(d(dec!(0))), "0.00000000");
        assert_eq!(format_balance(d(dec!(1.123456789))), "1.12345679");
        assert_eq!(format_balance(d(dec!(1.000000005))), "1.00000001");
        assert_eq!(format_balance(d(dec!(42))), "42.00000000");
    }

    #[test]
    fn test_balance_large_values() {
        use std::str::FromStr;

        let big = Decimal::from_str("100000000000000000000000").unwrap();
        assert_eq!(
            format_balance(d(big)),
            "100000000000000000000000.00000000"
        );
        assert_eq!(
            format_balance(d(Decimal::MAX)),
            "79228162514264337593543950335.00000000"
        );
        assert_eq!(
            format_balance(LooseDecimal::from_json(&serde_json::json!("1e28"))),
            "10000000000000000000000000000.00000000"
        );
        assert_eq!(format_multiplier(d(Decimal::MAX)), "79228162514264337593543950335.0");
    }

    #[test]
    fn test_multiplier_one_decimal() {
        assert_eq!(format_multiplier(d(dec!(2))), "2.0");
        assert_eq!(format_multiplier(d(dec!(4.64))), "4.6");
        assert_eq!(format_multiplier(LooseDecimal::ABSENT), "0.00");
    }

    #[test]
    fn test_currency_below_threshold() {
        assert_eq!(format_currency(d(dec!(999.5))), "$999.50");
        assert_eq!(format_currency(d(dec!(0))), "$0.00");
        assert_eq!(format_currency(d(dec!(12.345))), "$12.35");
    }

    #[test]
    fn test_currency_compact() {
        assert_eq!(format_currency(d(dec!(1000))), "$1K");
        assert_eq!(format_currency(d(dec!(1234))), "$1.2K");
        assert_eq!(format_currency(d(dec!(12345))), "$12K");
        assert_eq!(format_currency(d(dec!(123456))), "$123K");
        assert_eq!(format_currency(d(dec!(1500000))), "$1.5M");
        assert_eq!(format_currency(d(dec!(2000000000))), "$2B");
    }

    #[test]
    fn test_currency_rolls_into_next_unit() {
        assert_eq!(format_currency(d(dec!(999960))), "$1M");
    }

    #[test]
    fn test_currency_absent() {
        assert_eq!(format_currency(LooseDecimal::ABSENT), "0.00");
    }

    #[test]
    fn test_verbatim() {
        assert_eq!(format_verbatim(Some("1.4523")), "1.4523");
        assert_eq!(format_verbatim(Some("")), "0.00");
        assert_eq!(format_verbatim(None), "0.00");
    }

    #[test]
    fn test_status() {
        assert_eq!(format_status("OPENED"), "Opened");
        assert_eq!(format_status("closed"), "Closed");
        assert_eq!(format_status(""), "");
    }

    #[test]
    fn test_timestamp() {
        let ts = Utc.with_ymd_and_hms(2024, 10, 3, 14, 5, 0).unwrap();
        assert_eq!(format_timestamp(Some(ts)), "2024-10-03 14:05");
        assert_eq!(format_timestamp(None), "-");
    }
}
