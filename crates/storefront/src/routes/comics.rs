//! Public catalog handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use longbox_core::catalog::{CatalogQuery, ComicSummary, Page};

use crate::error::Result;
use crate::services::CatalogService;
use crate::services::catalog::parse_featured_count;
use crate::state::AppState;

/// Query parameters for the featured endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct FeaturedParams {
    pub count: Option<String>,
}

/// Filtered, sorted and paginated catalog.
///
/// GET /api/comics
///
/// Unknown and bracketed parameters (`search[$ne]=1`) are ignored.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<Page<ComicSummary>>> {
    let page = CatalogService::new(state.store()).list(&query).await?;
    Ok(Json(page))
}

/// Random sample of comics.
///
/// GET /api/comics/featured?count=5
#[instrument(skip(state))]
pub async fn featured(
    State(state): State<AppState>,
    Query(params): Query<FeaturedParams>,
) -> Result<Json<Vec<ComicSummary>>> {
    let count = parse_featured_count(params.count.as_deref())?;
    let comics = CatalogService::new(state.store()).featured(count).await?;
    Ok(Json(comics))
}

/// Comics whose title contains the series name.
///
/// GET /api/comics/series/{name}
#[instrument(skip(state))]
pub async fn series(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<ComicSummary>>> {
    let comics = CatalogService::new(state.store()).by_series(&name).await?;
    Ok(Json(comics))
}
