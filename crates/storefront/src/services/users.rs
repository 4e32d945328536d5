//! Per-identity cart and favorites.
//!
//! A user record is created lazily the first time an identity is seen.
//! Cart and favorites are always replaced wholesale; concurrent replacements
//! resolve as last write wins.

use serde_json::Value;
use tracing::instrument;

use longbox_core::catalog::{FieldSet, Predicate};
use longbox_core::{CartItem, Collection, UserRecord};

use super::ServiceError;
use crate::db::{DocumentStore, StoreError};

const SUB_FIELD: &str = "sub";

/// Access to user records.
pub struct UserService<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> UserService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Return the record for `sub`, creating an empty one if needed.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if the store fails or the stored record
    /// is malformed.
    #[instrument(skip(self, sub))]
    pub async fn get_or_create(&self, sub: &str) -> Result<UserRecord, ServiceError> {
        let doc = self
            .store
            .get_or_insert(
                Collection::Users,
                SUB_FIELD,
                sub,
                UserRecord::default_document(sub),
            )
            .await?;

        UserRecord::from_document(doc).map_err(|e| {
            ServiceError::Store(StoreError::DataCorruption(format!(
                "invalid user record: {e}"
            )))
        })
    }

    /// Replace the cart of `sub`, returning the stored items.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` if an item is not an object or has a
    /// non-numeric price, and `ServiceError::Store` if the store fails.
    pub async fn replace_cart(
        &self,
        sub: &str,
        items: Vec<Value>,
    ) -> Result<Vec<CartItem>, ServiceError> {
        self.replace_list(sub, "cart", items).await
    }

    /// Replace the favorites of `sub`, returning the stored items.
    ///
    /// # Errors
    ///
    /// See [`Self::replace_cart`].
    pub async fn replace_favorites(
        &self,
        sub: &str,
        items: Vec<Value>,
    ) -> Result<Vec<CartItem>, ServiceError> {
        self.replace_list(sub, "favorites", items).await
    }

    #[instrument(skip(self, sub, items), fields(count = items.len()))]
    async fn replace_list(
        &self,
        sub: &str,
        field: &'static str,
        items: Vec<Value>,
    ) -> Result<Vec<CartItem>, ServiceError> {
        let items = CartItem::parse_list(items)?;

        self.get_or_create(sub).await?;

        let mut set = FieldSet::new();
        set.insert(
            field.to_string(),
            Value::Array(items.iter().map(CartItem::to_value).collect()),
        );
        self.store
            .update_one(
                Collection::Users,
                &Predicate::field_eq(SUB_FIELD, sub),
                &set,
            )
            .await?;

        Ok(items)
    }
}
