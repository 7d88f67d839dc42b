//! Lenient numeric coercion for values written by forms and older stores.
//!
//! Malformed, negative or non-finite input becomes zero instead of an error.
//! The `deserialize_with` helpers below apply these rules at the serde
//! boundary so that typed fields never hold out-of-range values.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::Money;

/// Reads a decimal from a JSON number or a numeric string.
pub fn decimal(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// Coerces a value to a stock quantity.
///
/// Fractions are truncated; anything unusable becomes 0.
pub fn to_quantity(value: &Value) -> u32 {
    match decimal(value) {
        Some(v) if v > 0.0 => v.trunc().min(u32::MAX as f64) as u32,
        _ => 0,
    }
}

/// Coerces a value to a non-negative price.
pub fn to_price(value: &Value) -> Money {
    decimal(value)
        .and_then(Money::from_decimal)
        .map(Money::non_negative)
        .unwrap_or_default()
}

/// `deserialize_with` helper for quantity fields.
pub fn quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(to_quantity(&value))
}

/// `deserialize_with` helper for price fields.
pub fn price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(to_price(&value))
}

/// `deserialize_with` helper for optional quantity fields (patches).
///
/// `null` means "not provided"; any other value is coerced.
pub fn optional_quantity<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<u32>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok((!value.is_null()).then(|| to_quantity(&value)))
}

/// `deserialize_with` helper for optional price fields.
pub fn optional_price<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Money>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok((!value.is_null()).then(|| to_price(&value)))
}
