//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                        - Liveness check
//! GET  /health/ready                  - Readiness check (store ping)
//!
//! # Catalog
//! GET  /api/comics                    - Filtered, sorted, paginated catalog
//! GET  /api/comics/featured           - Random sample
//! GET  /api/comics/series/{name}      - Title contains series name
//!
//! # Users
//! GET  /api/users/{sub}               - Get or create user record
//! PUT  /api/users/{sub}/cart          - Replace cart
//! PUT  /api/users/{sub}/favorites     - Replace favorites
//! GET  /api/batcave/{sub}             - Privileged landing
//!
//! # Admin inventory (requires x-authenticated-sub)
//! GET    /api/admin/inventory         - List items
//! POST   /api/admin/inventory         - Create item
//! PUT    /api/admin/inventory/{id}    - Update item
//! DELETE /api/admin/inventory/{id}    - Delete item
//! ```

pub mod comics;
pub mod inventory;
pub mod users;

use axum::{
    Router,
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode},
    middleware::from_fn,
    routing::{get, put},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::StorefrontConfig;
use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the catalog routes router.
pub fn comic_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(comics::index))
        .route("/featured", get(comics::featured))
        .route("/series/{name}", get(comics::series))
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/{sub}", get(users::show))
        .route("/{sub}/cart", put(users::replace_cart))
        .route("/{sub}/favorites", put(users::replace_favorites))
}

/// Create the admin inventory routes router.
pub fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(inventory::index).post(inventory::create))
        .route("/{id}", put(inventory::update).delete(inventory::delete))
}

/// Create all `/api` routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/comics", comic_routes())
        .nest("/api/users", user_routes())
        .route("/api/batcave/{sub}", get(users::batcave))
        .nest("/api/admin/inventory", inventory_routes())
}

/// Build the CORS layer from the configured origins.
///
/// No configured origins means any origin is allowed.
#[must_use]
pub fn cors_layer(config: &StorefrontConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
}

/// Assemble the full application router with health checks and the shared
/// middleware stack.
pub fn app(state: AppState) -> Router {
    app_with_api(state, routes())
}

/// Like [`app`], but with a caller-supplied `/api` router so the binary can
/// layer rate limiting onto the API without touching health checks.
pub fn app_with_api(state: AppState, api: Router<AppState>) -> Router {
    let cors = cors_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(api)
        .with_state(state)
        .layer(cors)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::header;
    use tower::ServiceExt;

    use super::*;
    use crate::db::MemoryStore;

    fn state_with_origins(origins: &str) -> AppState {
        let env = HashMap::from([
            ("LONGBOX_STORE", "memory"),
            ("LONGBOX_ADMIN_SUB", "bruce"),
            ("LONGBOX_CORS_ORIGINS", origins),
        ]);
        let config =
            StorefrontConfig::from_lookup(|key| env.get(key).map(ToString::to_string)).unwrap();
        AppState::new(config, Arc::new(MemoryStore::new()))
    }

    async fn allowed_origin(app: Router, origin: &str) -> Option<String> {
        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, origin)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_configured_origins_are_enforced() {
        let app = app(state_with_origins("http://localhost:5173"));

        assert_eq!(
            allowed_origin(app.clone(), "http://localhost:5173").await.as_deref(),
            Some("http://localhost:5173")
        );
        assert_eq!(allowed_origin(app, "http://evil.example").await, None);
    }

    #[tokio::test]
    async fn test_wildcard_allows_any_origin() {
        let app = app(state_with_origins("*"));
        assert_eq!(
            allowed_origin(app, "http://anywhere.example").await.as_deref(),
            Some("*")
        );
    }
}
