//! HTTP gateway: the `/test/*` admin surface plus a liveness root, wired
//! behind request-id correlation, permissive CORS, and request tracing.

pub mod error;
pub mod handlers;
pub mod request_id;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::lifecycle::AppContext;
use handlers::SharedContext;

/// Builds the full axum router over a shared [`AppContext`].
pub fn build_router(ctx: Arc<AppContext>) -> Router {
    let state: SharedContext = ctx;

    Router::new()
        .route("/", get(handlers::liveness))
        .route("/test/retrieve", get(handlers::retrieve))
        .route("/test/embed-and-store", post(handlers::embed_and_store))
        .route("/test/redis-cache", get(handlers::redis_cache))
        .route("/test/clear-cache", post(handlers::clear_cache))
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
