//! User cart, favorites and the privileged landing endpoint.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use longbox_core::{CartItem, UserRecord};

use crate::error::{AppError, Result};
use crate::middleware::is_privileged;
use crate::services::UserService;
use crate::state::AppState;

/// Message returned to the privileged identity.
pub const BATCAVE_MESSAGE: &str = "Welcome to the Batcave";

/// Request body for `PUT /api/users/{sub}/cart`.
#[derive(Debug, Deserialize)]
pub struct CartBody {
    #[serde(default)]
    pub cart: Vec<Value>,
}

/// Request body for `PUT /api/users/{sub}/favorites`.
#[derive(Debug, Deserialize)]
pub struct FavoritesBody {
    #[serde(default)]
    pub favorites: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub success: bool,
    pub cart: Vec<CartItem>,
}

#[derive(Debug, Serialize)]
pub struct FavoritesResponse {
    pub success: bool,
    pub favorites: Vec<CartItem>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Fetch a user record, creating it on first sight.
///
/// GET /api/users/{sub}
#[instrument(skip(state, sub))]
pub async fn show(
    State(state): State<AppState>,
    Path(sub): Path<String>,
) -> Result<Json<UserRecord>> {
    let user = UserService::new(state.store()).get_or_create(&sub).await?;
    Ok(Json(user))
}

/// Replace the cart.
///
/// PUT /api/users/{sub}/cart
#[instrument(skip(state, sub, body))]
pub async fn replace_cart(
    State(state): State<AppState>,
    Path(sub): Path<String>,
    body: std::result::Result<Json<CartBody>, JsonRejection>,
) -> Result<Json<CartResponse>> {
    let Json(body) = body?;
    let cart = UserService::new(state.store())
        .replace_cart(&sub, body.cart)
        .await?;
    Ok(Json(CartResponse {
        success: true,
        cart,
    }))
}

/// Replace the favorites.
///
/// PUT /api/users/{sub}/favorites
#[instrument(skip(state, sub, body))]
pub async fn replace_favorites(
    State(state): State<AppState>,
    Path(sub): Path<String>,
    body: std::result::Result<Json<FavoritesBody>, JsonRejection>,
) -> Result<Json<FavoritesResponse>> {
    let Json(body) = body?;
    let favorites = UserService::new(state.store())
        .replace_favorites(&sub, body.favorites)
        .await?;
    Ok(Json(FavoritesResponse {
        success: true,
        favorites,
    }))
}

/// Landing endpoint for the privileged identity.
///
/// GET /api/batcave/{sub}
#[instrument(skip(state, sub))]
pub async fn batcave(
    State(state): State<AppState>,
    Path(sub): Path<String>,
) -> Result<Json<MessageResponse>> {
    if !is_privileged(state.config(), &sub) {
        return Err(AppError::Forbidden("access denied".to_string()));
    }
    Ok(Json(MessageResponse {
        message: BATCAVE_MESSAGE,
    }))
}
