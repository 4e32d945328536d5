//! Business logic services for storefront.
//!
//! # Services
//!
//! - `catalog` - Public listing, featured sample, series lookup
//! - `users` - Per-identity cart and favorites
//! - `inventory` - Admin create/update/delete with identifier resolution
//!
//! Services borrow the document store from `AppState` and return DTOs ready
//! to serialize.

mod error;

pub mod catalog;
pub mod inventory;
pub mod users;

pub use catalog::CatalogService;
pub use error::ServiceError;
pub use inventory::{InventoryService, UpdateOutcome};
pub use users::UserService;
