//! Privileged-identity extractor.
//!
//! Authentication happens upstream. The gateway forwards the verified caller
//! identity in [`AUTHENTICATED_SUB_HEADER`]; this module only compares it with
//! the configured privileged identity.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::config::StorefrontConfig;
use crate::error::{AppError, set_sentry_user};
use crate::state::AppState;

/// Header carrying the caller identity set by the auth gateway.
pub const AUTHENTICATED_SUB_HEADER: &str = "x-authenticated-sub";

/// Whether `sub` is the configured privileged identity.
#[must_use]
pub fn is_privileged(config: &StorefrontConfig, sub: &str) -> bool {
    !sub.is_empty() && sub == config.admin_sub
}

/// Extractor that requires the privileged identity.
///
/// Rejects with 403 when the header is missing or names anyone else.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireAdmin(sub): RequireAdmin) -> impl IntoResponse {
///     format!("Hello, {sub}!")
/// }
/// ```
pub struct RequireAdmin(pub String);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let sub = parts
            .headers
            .get(AUTHENTICATED_SUB_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .unwrap_or_default();

        if !is_privileged(state.config(), sub) {
            tracing::warn!(path = %parts.uri.path(), "Rejected non-admin request");
            return Err(AppError::Forbidden("access denied".to_string()));
        }

        set_sentry_user(sub);
        Ok(Self(sub.to_string()))
    }
}
