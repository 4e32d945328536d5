//! The catalog query and normalization engine.
//!
//! Request parameters flow through [`filter`] into a [`Predicate`], the store
//! counts and fetches matching documents using [`page`] options, and
//! [`format`] projects each document into a DTO using the [`price`]
//! normalizer. [`resolve`] and [`admin`] serve the admin mutation path.

pub mod admin;
pub mod filter;
pub mod format;
pub mod page;
pub mod predicate;
pub mod price;
pub mod resolve;

pub use admin::{InventoryPatch, NewInventoryItem};
pub use filter::{CatalogQuery, series_filter};
pub use format::{ComicSummary, InventoryItem, to_inventory_item, to_summary};
pub use page::{Page, PageRequest};
pub use predicate::{FieldSet, FindOptions, Predicate, SortOrder};
pub use price::{canonical_price, normalize_price};
pub use resolve::{IdCandidate, candidates};
