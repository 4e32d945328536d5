//! Service error types.

use thiserror::Error;

use longbox_core::ValidationError;

use crate::db::StoreError;

/// Errors that can occur in catalog, user and inventory operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Client input could not be interpreted.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No document matched.
    #[error("{0}")]
    NotFound(String),

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// A stored document failed to project into a response.
    ///
    /// This is a data problem, not a client one, so it surfaces as a store
    /// error and never echoes the stored value.
    pub(crate) fn corrupt_document(err: &ValidationError) -> Self {
        tracing::error!(error = %err, "Stored document could not be projected");
        Self::Store(StoreError::DataCorruption(err.to_string()))
    }
}
