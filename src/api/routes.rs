//! API Routes
//!
//! Configures the Axum router with the placeholder and cache endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clean_expired_handler, clear_handler, evict_handler, export_handler, generate_handler,
    get_entry_handler, health_handler, max_size_handler, optimize_handler, preload_handler,
    set_entry_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /placeholder` - Generate (or fetch cached) placeholder
/// - `POST /placeholder/preload` - Warm the cache with the common presets
/// - `GET /cache/entries/:key` - Read a cache entry
/// - `PUT /cache/entries/:key` - Store a placeholder under a key
/// - `POST /cache/clean` - Sweep expired entries
/// - `POST /cache/evict` - Evict the lowest-scoring entry
/// - `POST /cache/optimize` - Collapse entries sharing a url
/// - `PUT /cache/max-size` - Change capacity
/// - `DELETE /cache` - Drop all entries and reset statistics
/// - `GET /cache/stats` - Cache statistics
/// - `GET /cache/export` - Full cache snapshot
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/placeholder", post(generate_handler))
        .route("/placeholder/preload", post(preload_handler))
        .route(
            "/cache/entries/:key",
            get(get_entry_handler).put(set_entry_handler),
        )
        .route("/cache/clean", post(clean_expired_handler))
        .route("/cache/evict", post(evict_handler))
        .route("/cache/optimize", post(optimize_handler))
        .route("/cache/max-size", put(max_size_handler))
        .route("/cache", delete(clear_handler))
        .route("/cache/stats", get(stats_handler))
        .route("/cache/export", get(export_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
