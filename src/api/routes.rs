//! API Routes
//!
//! Configures the Axum router with the proxy and diagnostics endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_key_handler, filters_handler, health_handler, invalidate_handler, reset_stats_handler,
    stats_handler, try_it_handler, validate_filters_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /try-it` - Proxy one API call through the cache
/// - `GET /filters` - Filter requirement of an endpoint
/// - `POST /filters/validate` - Check query parameters against it
/// - `POST /cache/key` - Cache key and TTL a call would use
/// - `GET /cache/stats` - Cache statistics
/// - `POST /cache/stats/reset` - Zero hit/miss counters
/// - `DELETE /cache` - Invalidate all entries or those matching `pattern`
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin, the portal pages are served elsewhere
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/try-it", post(try_it_handler))
        .route("/filters", get(filters_handler))
        .route("/filters/validate", post(validate_filters_handler))
        .route("/cache", delete(invalidate_handler))
        .route("/cache/key", post(cache_key_handler))
        .route("/cache/stats", get(stats_handler))
        .route("/cache/stats/reset", post(reset_stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
