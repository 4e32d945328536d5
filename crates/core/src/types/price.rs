//! Price coercion.
//!
//! Prices arrive as JSON numbers, numeric strings, `null`, or not at all. Every
//! write path funnels through [`coerce_price`] and [`price_or_sentinel`] so the
//! stored value is always a finite, non-negative `f64`.

use serde_json::Value;

use crate::error::ValidationError;

/// Price substituted whenever no usable explicit price exists.
///
/// Zero is treated the same as missing: a catalog item is never free.
pub const SENTINEL_PRICE: f64 = 2.0;

/// Coerce a raw JSON value to a price.
///
/// - `null` yields `Ok(None)`
/// - numbers and strings holding a decimal number (after trimming) yield `Some`
///
/// # Errors
///
/// Returns [`ValidationError::InvalidPrice`] for any other shape, and for
/// negative or non-finite numbers.
pub fn coerce_price(value: &Value) -> Result<Option<f64>, ValidationError> {
    let parsed = match value {
        Value::Null => return Ok(None),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(price) if price.is_finite() && price >= 0.0 => Ok(Some(price)),
        _ => Err(ValidationError::InvalidPrice(value.to_string())),
    }
}

/// Apply the sentinel rule: missing and zero prices become [`SENTINEL_PRICE`].
#[must_use]
pub fn price_or_sentinel(price: Option<f64>) -> f64 {
    match price {
        Some(p) if p != 0.0 => p,
        _ => SENTINEL_PRICE,
    }
}

/// Coerce an optional raw value and apply the sentinel rule in one step.
///
/// # Errors
///
/// See [`coerce_price`].
pub fn coerce_or_sentinel(value: Option<&Value>) -> Result<f64, ValidationError> {
    let coerced = value.map(coerce_price).transpose()?.flatten();
    Ok(price_or_sentinel(coerced))
}
