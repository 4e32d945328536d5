//! Projection of stored documents into response DTOs.

use serde::Serialize;
use serde_json::Value;

use crate::catalog::price::canonical_price;
use crate::error::ValidationError;
use crate::types::{Document, DocumentId, coerce_price, price_or_sentinel};

/// Image shown when a document has no thumbnail.
pub const PLACEHOLDER_IMAGE: &str = "https://placedog.net/500/280";

/// Public catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComicSummary {
    pub id: String,
    pub title: String,
    #[serde(rename = "img")]
    pub image: String,
    pub description: String,
    pub price: f64,
}

/// Administrative inventory entry.
///
/// Unlike [`ComicSummary`], explicit admin-managed `price` and `image` fields
/// take precedence over the values derived from imported data, and an
/// explicit `null` price is reported as such.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub title: String,
    pub image: String,
    pub description: String,
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Stringify a stored `_id`.
///
/// Unknown shapes fall back to their JSON text so a malformed import still
/// renders.
#[must_use]
pub fn display_id(doc: &Document) -> String {
    match doc.get("_id") {
        None | Some(Value::Null) => String::new(),
        Some(raw) => DocumentId::from_value(raw).map_or_else(|| raw.to_string(), |id| id.to_string()),
    }
}

fn text_field(doc: &Document, field: &str) -> String {
    doc.get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// The image derived from imported `thumbnail` data.
#[must_use]
pub fn thumbnail_image(doc: &Document) -> String {
    match doc.get("thumbnail") {
        Some(Value::Object(thumb)) if !thumb.is_empty() => {
            let path = thumb.get("path").and_then(Value::as_str).unwrap_or_default();
            format!("{path}.jpg")
        }
        Some(Value::String(path)) if !path.is_empty() => format!("{path}.jpg"),
        _ => PLACEHOLDER_IMAGE.to_string(),
    }
}

/// Project a document into the public DTO.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidPrice`] if the stored price data cannot
/// be normalized.
pub fn to_summary(doc: &Document) -> Result<ComicSummary, ValidationError> {
    Ok(ComicSummary {
        id: display_id(doc),
        title: text_field(doc, "title"),
        image: thumbnail_image(doc),
        description: text_field(doc, "description"),
        price: canonical_price(doc)?,
    })
}

/// Project a document into the administrative DTO.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidPrice`] if the stored price data cannot
/// be interpreted.
///
/// A stored zero price reports the sentinel; only an explicit `null` stays
/// empty.
pub fn to_inventory_item(doc: &Document) -> Result<InventoryItem, ValidationError> {
    let price = match doc.get("price") {
        Some(explicit) => coerce_price(explicit)?.map(|p| price_or_sentinel(Some(p))),
        None => Some(canonical_price(doc)?),
    };

    let image = match doc.get("image").and_then(Value::as_str) {
        Some(explicit) if !explicit.trim().is_empty() => explicit.to_string(),
        _ => thumbnail_image(doc),
    };

    Ok(InventoryItem {
        id: display_id(doc),
        title: text_field(doc, "title"),
        image,
        description: text_field(doc, "description"),
        price,
        created_at: doc
            .get("created_at")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}
