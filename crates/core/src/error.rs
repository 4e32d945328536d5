//! Validation errors raised while interpreting client input.

use thiserror::Error;

/// Errors produced when request parameters or payloads cannot be interpreted.
///
/// Every variant is safe to show to the client verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// `page` is not a positive integer.
    #[error("page must be a positive integer (got '{0}')")]
    InvalidPage(String),

    /// `limit` is not a positive integer.
    #[error("limit must be a positive integer (got '{0}')")]
    InvalidLimit(String),

    /// A price could not be coerced to a non-negative number.
    #[error("price must be a non-negative number (got {0})")]
    InvalidPrice(String),

    /// `year` is not a calendar year.
    #[error("year must be a four digit year (got '{0}')")]
    InvalidYear(String),

    /// `priceRange` is not one of the known buckets.
    #[error("priceRange must be one of <5, 5-10, 10-20, 20+ or all (got '{0}')")]
    InvalidPriceRange(String),

    /// `sortOrder` is not `asc` or `desc`.
    #[error("sortOrder must be asc or desc (got '{0}')")]
    InvalidSortOrder(String),

    /// The featured sample size is not a positive integer.
    #[error("count must be a positive integer (got '{0}')")]
    InvalidCount(String),

    /// A cart or favorites entry is not a JSON object.
    #[error("item at position {0} must be an object")]
    InvalidItem(usize),

    /// An admin update carried none of the updatable fields.
    #[error("no updatable fields")]
    NoUpdatableFields,
}
