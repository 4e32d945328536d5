//! Document store access.
//!
//! All catalog and user data lives in named collections of JSON documents.
//! Handlers and services only see the [`DocumentStore`] trait; the concrete
//! store is chosen at startup and injected through `AppState`.
//!
//! # Implementations
//!
//! - [`PgDocumentStore`] - `PostgreSQL` JSONB rows in `longbox.document`
//! - [`MemoryStore`] - In-process store for tests and local development
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p lb-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use longbox_core::Collection;
use longbox_core::Document;
use longbox_core::catalog::{FieldSet, FindOptions, Predicate};

pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;

/// Errors raised by document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be interpreted.
    #[error("Data corruption: {0}")]
    DataCorruption(String),

    /// A value could not be encoded for storage.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Outcome of [`DocumentStore::update_one`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateResult {
    /// Documents matching the predicate (0 or 1).
    pub matched: u64,
    /// Documents whose content actually changed (0 or 1).
    pub modified: u64,
}

/// A collection-oriented JSON document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Verify the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Count documents matching `filter`.
    async fn count(&self, collection: Collection, filter: &Predicate) -> Result<u64, StoreError>;

    /// Fetch documents matching `filter`, sorted and windowed by `options`.
    ///
    /// Without a sort, documents come back in insertion order. With a sort,
    /// ties on canonical price keep insertion order and unpriceable documents
    /// come last.
    async fn find(
        &self,
        collection: Collection,
        filter: &Predicate,
        options: FindOptions,
    ) -> Result<Vec<Document>, StoreError>;

    /// Fetch the first document matching `filter`, in insertion order.
    async fn find_one(
        &self,
        collection: Collection,
        filter: &Predicate,
    ) -> Result<Option<Document>, StoreError>;

    /// Fetch up to `size` documents chosen at random.
    async fn sample(&self, collection: Collection, size: u64) -> Result<Vec<Document>, StoreError>;

    /// Append a document.
    async fn insert(&self, collection: Collection, document: Document) -> Result<(), StoreError>;

    /// Overwrite top-level fields of the first document matching `filter`.
    async fn update_one(
        &self,
        collection: Collection,
        filter: &Predicate,
        set: &FieldSet,
    ) -> Result<UpdateResult, StoreError>;

    /// Remove the first document matching `filter`, returning how many were
    /// removed.
    async fn delete_one(&self, collection: Collection, filter: &Predicate)
    -> Result<u64, StoreError>;

    /// Return the document whose `key_field` equals `key`, inserting
    /// `default` first if there is none.
    ///
    /// Concurrent calls for the same key create at most one document.
    async fn get_or_insert(
        &self,
        collection: Collection,
        key_field: &str,
        key: &str,
        default: Document,
    ) -> Result<Document, StoreError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
