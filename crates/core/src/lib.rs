//! Longbox Core - Catalog query and normalization engine.
//!
//! This crate provides the decision logic shared by every Longbox component:
//! - `storefront` - Public catalog API, user carts/favorites, admin inventory
//! - `cli` - Command-line tools for migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Store adapters consume the [`catalog::Predicate`] trees built
//! here and hand raw documents back for formatting.
//!
//! # Modules
//!
//! - [`types`] - Document identifiers, prices, user records
//! - [`catalog`] - Filter composition, price normalization, pagination,
//!   result formatting, identifier resolution and admin field sets
//! - [`error`] - Client-facing validation errors

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod error;
pub mod types;

pub use error::ValidationError;
pub use types::*;
