//! Pagination and sort parameters.

use serde::Serialize;

use crate::catalog::filter::CatalogQuery;
use crate::catalog::predicate::{FindOptions, SortOrder};
use crate::error::ValidationError;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 50;

/// A validated page window and sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u64,
    pub limit: u64,
    pub sort: Option<SortOrder>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            sort: Some(SortOrder::Asc),
        }
    }
}

fn positive(raw: Option<&str>, default: u64) -> Result<u64, String> {
    let Some(value) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(default);
    };

    match value.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(value.to_string()),
    }
}

/// Parse a sort direction.
///
/// Absent means ascending. `all`, `none` and the empty string keep natural
/// order.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidSortOrder`] for any other value.
pub fn parse_sort(raw: Option<&str>) -> Result<Option<SortOrder>, ValidationError> {
    let Some(value) = raw.map(str::trim) else {
        return Ok(Some(SortOrder::Asc));
    };

    match value.to_ascii_lowercase().as_str() {
        "asc" => Ok(Some(SortOrder::Asc)),
        "desc" => Ok(Some(SortOrder::Desc)),
        "" | "all" | "none" => Ok(None),
        _ => Err(ValidationError::InvalidSortOrder(value.to_string())),
    }
}

impl PageRequest {
    /// Validate the paging parameters of a catalog query.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if `page` or `limit` is not a positive
    /// integer, or `sortOrder` is not recognized.
    pub fn parse(query: &CatalogQuery) -> Result<Self, ValidationError> {
        Ok(Self {
            page: positive(query.page.as_deref(), DEFAULT_PAGE)
                .map_err(ValidationError::InvalidPage)?,
            limit: positive(query.limit.as_deref(), DEFAULT_LIMIT)
                .map_err(ValidationError::InvalidLimit)?,
            sort: parse_sort(query.sort_order.as_deref())?,
        })
    }

    /// Number of documents before this page.
    #[must_use]
    pub const fn skip(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    #[must_use]
    pub const fn find_options(&self) -> FindOptions {
        FindOptions {
            sort: self.sort,
            skip: self.skip(),
            limit: Some(self.limit),
        }
    }

    #[must_use]
    pub const fn total_pages(&self, total_results: u64) -> u64 {
        total_results.div_ceil(self.limit)
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub page: u64,
    pub total_pages: u64,
    pub total_results: u64,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(request: &PageRequest, total_results: u64, results: Vec<T>) -> Self {
        Self {
            page: request.page,
            total_pages: request.total_pages(total_results),
            total_results,
            results,
        }
    }
}
