//! Admin inventory management.
//!
//! Inventory items live in the comics collection, so every change here is
//! visible through the public catalog as well.

use chrono::Utc;
use serde::Serialize;
use tracing::instrument;

use longbox_core::ObjectId;
use longbox_core::catalog::{
    FindOptions, IdCandidate, InventoryItem, InventoryPatch, NewInventoryItem, Predicate,
    candidates, to_inventory_item,
};
use longbox_core::{Collection, Document};

use super::ServiceError;
use crate::db::DocumentStore;

/// Result of an admin update.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub item: InventoryItem,
    pub matched_count: u64,
    pub modified_count: u64,
    /// Set when the target matched but none of its fields changed.
    pub unmodified: bool,
}

fn not_found(raw: &str) -> ServiceError {
    ServiceError::NotFound(format!("inventory item '{raw}' not found"))
}

/// Admin-only create, update and delete of catalog items.
pub struct InventoryService<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> InventoryService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Every catalog item, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if the store fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<InventoryItem>, ServiceError> {
        let docs = self
            .store
            .find(Collection::Comics, &Predicate::all(), FindOptions::default())
            .await?;
        docs.iter()
            .map(|doc| to_inventory_item(doc).map_err(|e| ServiceError::corrupt_document(&e)))
            .collect()
    }

    /// Insert a new item with a fresh identifier.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a non-numeric price and
    /// `ServiceError::Store` if the store fails.
    #[instrument(skip(self, fields))]
    pub async fn create(&self, fields: NewInventoryItem) -> Result<InventoryItem, ServiceError> {
        let doc = fields.into_document(ObjectId::new(), Utc::now())?;
        let item = to_inventory_item(&doc)?;
        self.store.insert(Collection::Comics, doc).await?;

        tracing::info!(id = %item.id, "Created inventory item");
        Ok(item)
    }

    /// Find the first identifier interpretation of `raw` that matches a
    /// stored item.
    ///
    /// Interpretations are tried as an `ObjectId`, then as a literal string,
    /// then as an integer.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if the store fails.
    #[instrument(skip(self))]
    pub async fn resolve(&self, raw: &str) -> Result<Option<(IdCandidate, Document)>, ServiceError> {
        for candidate in candidates(raw) {
            let found = self
                .store
                .find_one(Collection::Comics, &candidate.predicate())
                .await?;
            if let Some(doc) = found {
                return Ok(Some((candidate, doc)));
            }
        }
        Ok(None)
    }

    /// Apply a partial update to the item identified by `raw`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for an empty or malformed patch,
    /// `ServiceError::NotFound` if no item matches, and `ServiceError::Store`
    /// if the store fails.
    #[instrument(skip(self, patch))]
    pub async fn update(
        &self,
        raw: &str,
        patch: InventoryPatch,
    ) -> Result<UpdateOutcome, ServiceError> {
        let set = patch.into_field_set()?;

        let (candidate, _) = self.resolve(raw).await?.ok_or_else(|| not_found(raw))?;
        let target = candidate.predicate();

        let result = self
            .store
            .update_one(Collection::Comics, &target, &set)
            .await?;
        if result.matched == 0 {
            return Err(not_found(raw));
        }

        let doc = self
            .store
            .find_one(Collection::Comics, &target)
            .await?
            .ok_or_else(|| not_found(raw))?;

        Ok(UpdateOutcome {
            item: to_inventory_item(&doc).map_err(|e| ServiceError::corrupt_document(&e))?,
            matched_count: result.matched,
            modified_count: result.modified,
            unmodified: result.modified == 0,
        })
    }

    /// Remove the item identified by `raw`, returning the number removed.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if no item matches and
    /// `ServiceError::Store` if the store fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, raw: &str) -> Result<u64, ServiceError> {
        let (candidate, _) = self.resolve(raw).await?.ok_or_else(|| not_found(raw))?;

        let deleted = self
            .store
            .delete_one(Collection::Comics, &candidate.predicate())
            .await?;
        if deleted == 0 {
            return Err(not_found(raw));
        }

        tracing::info!(id = raw, "Deleted inventory item");
        Ok(deleted)
    }
}
