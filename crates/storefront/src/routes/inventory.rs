//! Admin inventory handlers.
//!
//! Every handler takes [`RequireAdmin`], so a missing or foreign identity is
//! rejected before the body is read.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Serialize;
use tracing::instrument;

use longbox_core::catalog::{InventoryItem, InventoryPatch, NewInventoryItem};

use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequireAdmin;
use crate::services::{InventoryService, UpdateOutcome};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub deleted_count: u64,
}

/// GET /api/admin/inventory
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<Vec<InventoryItem>>> {
    let items = InventoryService::new(state.store()).list().await?;
    Ok(Json(items))
}

/// POST /api/admin/inventory
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    body: std::result::Result<Json<NewInventoryItem>, JsonRejection>,
) -> Result<(StatusCode, Json<InventoryItem>)> {
    let Json(fields) = body?;
    let item = InventoryService::new(state.store()).create(fields).await?;
    add_breadcrumb("inventory", "Created item", Some(&[("id", item.id.as_str())]));
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/admin/inventory/{id}
#[instrument(skip(state, _admin, body))]
pub async fn update(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
    body: std::result::Result<Json<InventoryPatch>, JsonRejection>,
) -> Result<Json<UpdateOutcome>> {
    let Json(patch) = body?;
    let outcome = InventoryService::new(state.store())
        .update(&id, patch)
        .await?;
    add_breadcrumb("inventory", "Updated item", Some(&[("id", id.as_str())]));
    Ok(Json(outcome))
}

/// DELETE /api/admin/inventory/{id}
#[instrument(skip(state, _admin))]
pub async fn delete(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let deleted_count = InventoryService::new(state.store()).delete(&id).await?;
    add_breadcrumb("inventory", "Deleted item", Some(&[("id", id.as_str())]));
    Ok(Json(DeleteResponse { deleted_count }))
}
