//! The predicate language understood by document stores.
//!
//! Filters are built as a [`Predicate`] tree and handed to a store adapter,
//! which either evaluates it in memory or compiles it to a query. User input
//! only ever appears as bound values inside a predicate, never as structure.

use std::ops::Bound;

use chrono::NaiveDateTime;
use serde_json::{Map, Value};

use crate::types::DocumentId;

/// A filter condition over stored documents.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// All sub-predicates match. An empty list matches every document.
    And(Vec<Predicate>),
    /// Any sub-predicate matches. An empty list matches nothing.
    Or(Vec<Predicate>),
    /// `_id` equals the given typed identifier.
    IdEquals(DocumentId),
    /// A top-level field equals a JSON value exactly.
    FieldEquals { field: String, value: Value },
    /// A string field contains `needle`, ignoring case. On an array field, any
    /// string element containing `needle` matches.
    Contains { field: String, needle: String },
    /// A string field equals `value`, ignoring case.
    EqualsIgnoreCase { field: String, value: String },
    /// The canonical price lies within the given bounds.
    PriceWithin { lower: Bound<f64>, upper: Bound<f64> },
    /// Some entry of the `field` array has `type == kind` and a `date` whose
    /// wall-clock part lies within `[from, to]`.
    DateRecord {
        field: String,
        kind: String,
        from: NaiveDateTime,
        to: NaiveDateTime,
    },
}

impl Predicate {
    /// A predicate matching every document.
    #[must_use]
    pub const fn all() -> Self {
        Self::And(Vec::new())
    }

    /// Returns true if this predicate matches every document.
    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, Self::And(clauses) if clauses.is_empty())
    }

    /// Equality on a top-level string field.
    #[must_use]
    pub fn field_eq(field: &str, value: impl Into<Value>) -> Self {
        Self::FieldEquals {
            field: field.to_string(),
            value: value.into(),
        }
    }
}

/// A set of top-level fields to overwrite on a matched document.
pub type FieldSet = Map<String, Value>;

/// Direction of the canonical price sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Sort and window options for `find`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    /// Sort by canonical price, `None` keeps insertion order.
    pub sort: Option<SortOrder>,
    pub skip: u64,
    pub limit: Option<u64>,
}
