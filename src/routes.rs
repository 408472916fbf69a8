//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET /{code}`  - Short link resolution (public, unlimited)
//! - `GET /health`  - Liveness: DB, cache, click queue (public)
//! - `/api/*`       - Account-facing REST API, sliding-window rate limited
//! - `/api/v1/*`    - Programmatic API, Bearer API key with per-key quotas

use axum::{Router, middleware, routing::get};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

use crate::api;
use crate::api::handlers::{health::health_handler, redirect::redirect_handler};
use crate::api::middleware::{api_key, rate_limit, tracing};
use crate::state::AppState;

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let v1_router = api::routes::v1_routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        api_key::layer,
    ));

    // route_layer binds to the routes registered so far, so the v1 nest
    // added afterwards answers to its own per-key quota instead of the
    // shared window.
    let api_router = api::routes::api_routes()
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::layer,
        ))
        .nest("/v1", v1_router);

    let router = Router::new()
        .route("/{code}", get(redirect_handler))
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
