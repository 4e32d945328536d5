//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS
//! 5. Rate limiting on `/api` (governor, binary only)
//!
//! `RequireAdmin` is an extractor rather than a layer and gates the inventory
//! routes.

pub mod admin;
pub mod rate_limit;
pub mod request_id;

pub use admin::{AUTHENTICATED_SUB_HEADER, RequireAdmin, is_privileged};
pub use rate_limit::api_rate_limiter;
pub use request_id::request_id_middleware;
