//! Admin inventory payloads.
//!
//! [`NewInventoryItem`] and [`InventoryPatch`] are the request bodies of admin
//! create and update. Both only ever produce documents or field sets keyed by
//! the four managed fields, so nothing a client submits can reach the store
//! as structure.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::{Value, json};

use crate::catalog::predicate::FieldSet;
use crate::error::ValidationError;
use crate::types::{Document, DocumentId, ObjectId, coerce_or_sentinel, coerce_price, price_or_sentinel};

/// Title given to items created without one.
pub const UNTITLED: &str = "Untitled";

/// Distinguishes an explicit `null` (`Some(None)`) from an absent key (`None`).
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Value>::deserialize(deserializer).map(Some)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Body of an admin create.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewInventoryItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewInventoryItem {
    /// Build the document to insert.
    ///
    /// The price is written both as the explicit `price` and as
    /// `prices.price`, so the public catalog derives the same value.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPrice`] if the price is not numeric.
    pub fn into_document(self, id: ObjectId, now: DateTime<Utc>) -> Result<Document, ValidationError> {
        let price = coerce_or_sentinel(self.price.as_ref())?;

        let mut doc = Document::new();
        doc.insert("_id".to_string(), DocumentId::ObjectId(id).to_value());
        doc.insert(
            "title".to_string(),
            Value::String(non_blank(self.title).unwrap_or_else(|| UNTITLED.to_string())),
        );
        doc.insert("price".to_string(), Value::from(price));
        doc.insert("prices".to_string(), json!({ "price": price }));
        doc.insert(
            "description".to_string(),
            Value::String(self.description.unwrap_or_default()),
        );
        if let Some(image) = non_blank(self.image) {
            doc.insert("image".to_string(), Value::String(image));
        }
        doc.insert(
            "created_at".to_string(),
            Value::String(now.to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
        Ok(doc)
    }
}

/// Body of an admin update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InventoryPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub price: Option<Option<Value>>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl InventoryPatch {
    /// Build the field set to apply.
    ///
    /// An explicit `null` price is stored as `null` and leaves `prices` alone.
    /// Any other price is written to both `price` and `prices.price`, as on
    /// create, and a zero price becomes the sentinel.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NoUpdatableFields`] if nothing was supplied,
    /// or [`ValidationError::InvalidPrice`] for a non-numeric price.
    pub fn into_field_set(self) -> Result<FieldSet, ValidationError> {
        let mut set = FieldSet::new();

        if let Some(title) = self.title {
            set.insert("title".to_string(), Value::String(title));
        }
        match self.price {
            None => {}
            Some(None) => {
                set.insert("price".to_string(), Value::Null);
            }
            Some(Some(raw)) => {
                let price = price_or_sentinel(coerce_price(&raw)?);
                set.insert("price".to_string(), Value::from(price));
                set.insert("prices".to_string(), json!({ "price": price }));
            }
        }
        if let Some(image) = self.image {
            set.insert("image".to_string(), Value::String(image));
        }
        if let Some(description) = self.description {
            set.insert("description".to_string(), Value::String(description));
        }

        if set.is_empty() {
            return Err(ValidationError::NoUpdatableFields);
        }
        Ok(set)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_create_defaults() {
        let id = ObjectId::parse_str("65f1c0ffee0000000000abcd").unwrap();
        let doc = NewInventoryItem::default().into_document(id, now()).unwrap();

        assert_eq!(doc["_id"], json!({"$oid": "65f1c0ffee0000000000abcd"}));
        assert_eq!(doc["title"], "Untitled");
        assert_eq!(doc["price"], json!(2.0));
        assert_eq!(doc["prices"], json!({"price": 2.0}));
        assert_eq!(doc["description"], "");
        assert_eq!(doc["created_at"], "2026-03-01T12:30:00Z");
        assert!(!doc.contains_key("image"));
    }

    #[test]
    fn test_create_coerces_price_and_blank_title() {
        let item: NewInventoryItem = serde_json::from_value(json!({
            "title": "  ",
            "price": "4.50",
            "image": "https://img.example/x.jpg",
            "role": "admin"
        }))
        .unwrap();
        let doc = item.into_document(ObjectId::new(), now()).unwrap();

        assert_eq!(doc["title"], "Untitled");
        assert_eq!(doc["price"], json!(4.5));
        assert_eq!(doc["image"], "https://img.example/x.jpg");
        assert!(!doc.contains_key("role"));
    }

    #[test]
    fn test_create_zero_or_null_price_uses_sentinel() {
        for raw in [json!(0), Value::Null] {
            let item = NewInventoryItem {
                price: Some(raw),
                ..NewInventoryItem::default()
            };
            let doc = item.into_document(ObjectId::new(), now()).unwrap();
            assert_eq!(doc["price"], json!(2.0));
        }
    }

    #[test]
    fn test_create_rejects_non_numeric_price() {
        let item = NewInventoryItem {
            price: Some(json!("lots")),
            ..NewInventoryItem::default()
        };
        assert!(matches!(
            item.into_document(ObjectId::new(), now()),
            Err(ValidationError::InvalidPrice(_))
        ));
    }

    #[test]
    fn test_empty_patch_is_rejected() {
        let patch: InventoryPatch = serde_json::from_value(json!({})).unwrap();
        assert_eq!(patch.into_field_set(), Err(ValidationError::NoUpdatableFields));
    }

    #[test]
    fn test_patch_ignores_unknown_fields() {
        let patch: InventoryPatch =
            serde_json::from_value(json!({"$set": {"role": "admin"}})).unwrap();
        assert_eq!(patch.into_field_set(), Err(ValidationError::NoUpdatableFields));
    }

    #[test]
    fn test_patch_distinguishes_null_from_absent_price() {
        let absent: InventoryPatch = serde_json::from_value(json!({"title": "X"})).unwrap();
        assert_eq!(absent.price, None);
        assert!(!absent.into_field_set().unwrap().contains_key("price"));

        let null: InventoryPatch = serde_json::from_value(json!({"price": null})).unwrap();
        assert_eq!(null.price, Some(None));
        let set = null.into_field_set().unwrap();
        assert_eq!(set["price"], Value::Null);
        assert!(!set.contains_key("prices"));
    }

    #[test]
    fn test_patch_price_coercion() {
        let patch: InventoryPatch = serde_json::from_value(json!({"price": "0"})).unwrap();
        assert_eq!(patch.into_field_set().unwrap()["price"], json!(2.0));

        let patch: InventoryPatch = serde_json::from_value(json!({"price": 7.25})).unwrap();
        let set = patch.into_field_set().unwrap();
        assert_eq!(set["price"], json!(7.25));
        assert_eq!(set["prices"], json!({"price": 7.25}));

        let patch: InventoryPatch = serde_json::from_value(json!({"price": "?"})).unwrap();
        assert!(patch.into_field_set().is_err());
    }
}
