//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{code}`      - Short link redirect
//! - `GET  /health`      - Health check: store and click queue
//! - `/api/*`            - Link management API
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **CORS** - Any origin may call the API
//! - **Rate limiting** - Per-IP token bucket (configurable for proxy deployments)
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{cors, rate_limit, tracing};
use crate::state::AppState;
use anyhow::Result;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_governor::key_extractor::{PeerIpKeyExtractor, SmartIpKeyExtractor};
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Per-client request quota.
#[derive(Debug, Clone, Copy)]
pub struct RateLimit {
    pub per_second: u64,
    pub burst: u32,
    /// When `true`, clients are keyed by `X-Forwarded-For` / `X-Real-IP`
    /// instead of the peer socket address; enable only behind a trusted proxy.
    pub behind_proxy: bool,
}

/// Builds the routes without rate limiting.
///
/// Useful in tests, where requests carry no peer address.
pub fn base_router(state: AppState) -> Router {
    Router::new()
        .route("/{code}", get(redirect_handler))
        .route("/health", get(health_handler))
        .nest("/api", api::routes::api_routes())
        .with_state(state)
}

/// Constructs the application router with all routes and middleware.
///
/// # Errors
///
/// Returns an error if the rate limit quota is invalid.
pub fn app_router(state: AppState, limit: RateLimit) -> Result<NormalizePath<Router>> {
    let router = base_router(state);

    let router = if limit.behind_proxy {
        router.layer(rate_limit::layer(
            SmartIpKeyExtractor,
            limit.per_second,
            limit.burst,
        )?)
    } else {
        router.layer(rate_limit::layer(
            PeerIpKeyExtractor,
            limit.per_second,
            limit.burst,
        )?)
    };

    let router = router.layer(cors::layer()).layer(tracing::layer());

    Ok(NormalizePathLayer::trim_trailing_slash().layer(router))
}
