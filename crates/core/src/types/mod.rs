//! Core types for Longbox.
//!
//! This module provides type-safe wrappers for the loosely shaped documents the
//! catalog store hands back.

pub mod document;
pub mod id;
pub mod price;

pub use document::{CartItem, Collection, Document, UserRecord};
pub use id::{DocumentId, ObjectId, ObjectIdError};
pub use price::{SENTINEL_PRICE, coerce_or_sentinel, coerce_price, price_or_sentinel};
