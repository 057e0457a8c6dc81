//! Fixed-point conversion between human-readable amounts and base units

use alloy::primitives::U256;

use crate::error::{Error, Result};

/// Decimal exponent of the native coin
pub const QUAI_DECIMALS: u32 = 18;

/// Parse a decimal string (e.g. "1.5") into base units with the given number of decimals.
///
/// `parse_units("1.5", 18)` → `U256(1_500_000_000_000_000_000)`.
pub fn parse_units(amount: &str, decimals: u32) -> Result<U256> {
    let invalid = |reason: &str| Error::InvalidAmount {
        value: amount.to_string(),
        reason: reason.to_string(),
    };

    if amount.is_empty() {
        return Err(invalid("amount cannot be empty"));
    }
    if amount.starts_with('-') {
        return Err(invalid("amount must not be negative"));
    }

    let (integer, fractional) = match amount.split_once('.') {
        Some((i, f)) => (i, f),
        None => (amount, ""),
    };

    if integer.is_empty() && fractional.is_empty() {
        return Err(invalid("no digits"));
    }
    if !integer.chars().all(|c| c.is_ascii_digit()) || !fractional.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid("not a decimal number"));
    }
    // Zeros past the last representable digit do not change the value
    let fractional = if fractional.len() > decimals as usize {
        fractional.trim_end_matches('0')
    } else {
        fractional
    };
    if fractional.len() > decimals as usize {
        return Err(invalid(&format!(
            "too many decimal places: got {}, max {}",
            fractional.len(),
            decimals
        )));
    }

    // Pad fractional part to `decimals` digits
    let padded = format!("{fractional:0<width$}", width = decimals as usize);
    let combined = format!("{integer}{padded}");

    // Strip leading zeros (but keep at least "0")
    let combined = combined.trim_start_matches('0');
    let combined = if combined.is_empty() { "0" } else { combined };

    U256::from_str_radix(combined, 10).map_err(|e| invalid(&e.to_string()))
}

/// Convert a base-unit value to a decimal string with the given number of decimals.
pub fn format_units(value: U256, decimals: u32) -> String {
    let s = value.to_string();
    let decimals = decimals as usize;

    if s.len() <= decimals {
        if value.is_zero() {
            return "0.0".to_string();
        }
        let zeros = decimals - s.len();
        let mut result = "0.".to_string();
        result.push_str(&"0".repeat(zeros));
        result.push_str(s.trim_end_matches('0'));
        result
    } else {
        let integer_part = &s[..s.len() - decimals];
        let fractional = s[s.len() - decimals..].trim_end_matches('0');
        if fractional.is_empty() {
            format!("{integer_part}.0")
        } else {
            format!("{integer_part}.{fractional}")
        }
    }
}
