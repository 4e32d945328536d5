//! Stored document shapes.
//!
//! Catalog documents are open-ended JSON objects and are handled as
//! [`Document`] maps. User records have a fixed outer shape with open-ended
//! cart and favorites entries.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::types::price::coerce_or_sentinel;

/// A raw stored document.
pub type Document = Map<String, Value>;

/// Named document collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// The comic catalog, also holding admin-managed inventory items.
    Comics,
    /// Per-identity cart and favorites.
    Users,
}

impl Collection {
    /// Returns the collection name as stored.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Comics => "comics",
            Self::Users => "users",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entry in a cart or favorites list.
///
/// Only `price` is interpreted. Every other key is kept verbatim in `extra`,
/// including keys that look like store operators (`$set`, `$where`, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartItem {
    pub price: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CartItem {
    /// Build an item from a submitted JSON object, coercing its price.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPrice`] if `price` is present but not
    /// numeric.
    pub fn from_map(mut fields: Map<String, Value>) -> Result<Self, ValidationError> {
        let price = coerce_or_sentinel(fields.remove("price").as_ref())?;
        Ok(Self {
            price,
            extra: fields,
        })
    }

    /// Parse a submitted list of items.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidItem`] with the position of the first
    /// entry that is not an object, or the price error of the first entry
    /// with a non-numeric price.
    pub fn parse_list(values: Vec<Value>) -> Result<Vec<Self>, ValidationError> {
        values
            .into_iter()
            .enumerate()
            .map(|(position, value)| match value {
                Value::Object(fields) => Self::from_map(fields),
                _ => Err(ValidationError::InvalidItem(position)),
            })
            .collect()
    }

    /// Returns the stored JSON form.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut fields = self.extra.clone();
        fields.insert("price".to_string(), Value::from(self.price));
        Value::Object(fields)
    }
}

impl<'de> Deserialize<'de> for CartItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Map::deserialize(deserializer)?;
        Self::from_map(fields).map_err(serde::de::Error::custom)
    }
}

/// A per-identity user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub sub: String,
    #[serde(default)]
    pub cart: Vec<CartItem>,
    #[serde(default)]
    pub favorites: Vec<CartItem>,
}

impl UserRecord {
    /// A fresh, empty record for `sub`.
    #[must_use]
    pub fn empty(sub: impl Into<String>) -> Self {
        Self {
            sub: sub.into(),
            cart: Vec::new(),
            favorites: Vec::new(),
        }
    }

    /// The document inserted when `sub` is seen for the first time.
    ///
    /// Built anew on every call so no two records share list storage.
    #[must_use]
    pub fn default_document(sub: &str) -> Document {
        let mut doc = Document::new();
        doc.insert("sub".to_string(), Value::String(sub.to_string()));
        doc.insert("cart".to_string(), Value::Array(Vec::new()));
        doc.insert("favorites".to_string(), Value::Array(Vec::new()));
        doc
    }

    /// Read a record back from a stored document, ignoring unknown keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not have the user record shape.
    pub fn from_document(doc: Document) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(doc))
    }
}
