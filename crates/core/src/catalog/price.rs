//! Canonical price derivation.
//!
//! Imported catalog data carries prices in several shapes:
//!
//! - an ordered list of `{type, price}` records, of which the first record
//!   tagged [`PRINT_PRICE`] is authoritative
//! - a single `{price}` object, as written by admin create
//! - nothing at all
//!
//! [`normalize_price`] reduces all of them to one `f64`.

use serde_json::Value;

use crate::error::ValidationError;
use crate::types::price::coerce_or_sentinel;
use crate::types::Document;

/// Tag of the physical edition's price record.
pub const PRINT_PRICE: &str = "printPrice";

/// Document field holding the raw price data.
pub const PRICES_FIELD: &str = "prices";

/// Reduce a raw `prices` value to the canonical price.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidPrice`] if the selected price is not a
/// non-negative number or numeric string.
pub fn normalize_price(raw: Option<&Value>) -> Result<f64, ValidationError> {
    let selected = match raw {
        Some(Value::Array(records)) => records
            .iter()
            .filter_map(Value::as_object)
            .find(|record| record.get("type").and_then(Value::as_str) == Some(PRINT_PRICE))
            .and_then(|record| record.get("price")),
        Some(Value::Object(record)) => record.get("price"),
        _ => None,
    };

    coerce_or_sentinel(selected)
}

/// The canonical price of a stored document.
///
/// # Errors
///
/// See [`normalize_price`].
pub fn canonical_price(doc: &Document) -> Result<f64, ValidationError> {
    normalize_price(doc.get(PRICES_FIELD))
}
