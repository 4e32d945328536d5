//! Public catalog queries.

use tracing::instrument;

use longbox_core::catalog::{
    CatalogQuery, ComicSummary, Page, PageRequest, series_filter, to_summary,
};
use longbox_core::{Collection, Document, ValidationError};

use super::ServiceError;
use crate::db::DocumentStore;

/// Number of featured comics when the client does not ask for a count.
pub const DEFAULT_FEATURED_COUNT: u64 = 5;

/// Parse the `count` parameter of the featured endpoint.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidCount`] unless `raw` is absent, blank, or
/// a positive integer.
pub fn parse_featured_count(raw: Option<&str>) -> Result<u64, ValidationError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(DEFAULT_FEATURED_COUNT),
        Some(value) => match value.parse::<u64>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ValidationError::InvalidCount(value.to_string())),
        },
    }
}

fn summarize(docs: &[Document]) -> Result<Vec<ComicSummary>, ServiceError> {
    docs.iter()
        .map(|doc| to_summary(doc).map_err(|e| ServiceError::corrupt_document(&e)))
        .collect()
}

/// Read-only access to the comic catalog.
pub struct CatalogService<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Filter, sort and paginate the catalog.
    ///
    /// Totals are counted under the filter before the page window is applied.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for malformed parameters and
    /// `ServiceError::Store` if the store fails.
    #[instrument(skip(self))]
    pub async fn list(&self, query: &CatalogQuery) -> Result<Page<ComicSummary>, ServiceError> {
        let filter = query.predicate()?;
        let request = PageRequest::parse(query)?;

        let total = self.store.count(Collection::Comics, &filter).await?;
        let docs = self
            .store
            .find(Collection::Comics, &filter, request.find_options())
            .await?;

        Ok(Page::new(&request, total, summarize(&docs)?))
    }

    /// A random sample of `count` comics.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if the store fails.
    #[instrument(skip(self))]
    pub async fn featured(&self, count: u64) -> Result<Vec<ComicSummary>, ServiceError> {
        let docs = self.store.sample(Collection::Comics, count).await?;
        summarize(&docs)
    }

    /// Every comic whose title contains `name`, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if the store fails.
    #[instrument(skip(self))]
    pub async fn by_series(&self, name: &str) -> Result<Vec<ComicSummary>, ServiceError> {
        let docs = self
            .store
            .find(
                Collection::Comics,
                &series_filter(name),
                longbox_core::catalog::FindOptions::default(),
            )
            .await?;
        summarize(&docs)
    }
}
