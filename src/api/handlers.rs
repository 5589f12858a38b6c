//! API Handlers
//!
//! HTTP request handlers for placeholder generation and cache administration.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{CacheExport, CacheStats, SharedCache};
use crate::error::{PlaceholderError, Result};
use crate::generation::PlaceholderOrchestrator;
use crate::models::{
    GeneratedPlaceholder, HealthResponse, MaxSizeRequest, MessageResponse, PlaceholderRequest,
    RemovedResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The placeholder engine
    pub orchestrator: Arc<PlaceholderOrchestrator>,
    /// The same cache the orchestrator writes to
    pub cache: SharedCache,
}

impl AppState {
    /// Creates a new AppState around an orchestrator.
    pub fn new(orchestrator: PlaceholderOrchestrator) -> Self {
        let cache = orchestrator.cache().clone();
        Self {
            orchestrator: Arc::new(orchestrator),
            cache,
        }
    }

    /// Creates the production state (HTTP prober, system clock) from config.
    pub fn from_config(config: crate::config::PlaceholderConfig) -> Result<Self> {
        Ok(Self::new(PlaceholderOrchestrator::from_config(config)?))
    }
}

/// Handler for POST /placeholder
///
/// Always answers 200 with a usable placeholder.
pub async fn generate_handler(
    State(state): State<AppState>,
    Json(req): Json<PlaceholderRequest>,
) -> Json<GeneratedPlaceholder> {
    Json(state.orchestrator.generate_placeholder(req).await)
}

/// Handler for POST /placeholder/preload
pub async fn preload_handler(State(state): State<AppState>) -> Json<MessageResponse> {
    state.orchestrator.preload_common().await;
    Json(MessageResponse::new("Common placeholders preloaded"))
}

/// Handler for GET /cache/entries/:key
pub async fn get_entry_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GeneratedPlaceholder>> {
    // Write lock: reads update access bookkeeping and stats
    let mut cache = state.cache.write().await;
    cache
        .get(&key)
        .map(Json)
        .ok_or(PlaceholderError::NotFound(key))
}

/// Handler for PUT /cache/entries/:key
pub async fn set_entry_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(placeholder): Json<GeneratedPlaceholder>,
) -> Result<Json<MessageResponse>> {
    if key.trim().is_empty() {
        return Err(PlaceholderError::InvalidRequest("Key cannot be empty".to_string()));
    }
    if placeholder.url.is_empty() {
        return Err(PlaceholderError::InvalidRequest("url cannot be empty".to_string()));
    }

    state.cache.write().await.set(key.clone(), placeholder);
    Ok(Json(MessageResponse::new(format!("Key '{}' set successfully", key))))
}

/// Handler for POST /cache/clean
pub async fn clean_expired_handler(State(state): State<AppState>) -> Json<RemovedResponse> {
    let removed = state.cache.write().await.clean_expired();
    Json(RemovedResponse::new(removed))
}

/// Handler for POST /cache/evict
pub async fn evict_handler(State(state): State<AppState>) -> Json<RemovedResponse> {
    let evicted = state.cache.write().await.evict_oldest();
    Json(RemovedResponse::new(usize::from(evicted.is_some())))
}

/// Handler for POST /cache/optimize
pub async fn optimize_handler(State(state): State<AppState>) -> Json<RemovedResponse> {
    let removed = state.cache.write().await.optimize();
    Json(RemovedResponse::new(removed))
}

/// Handler for PUT /cache/max-size
pub async fn max_size_handler(
    State(state): State<AppState>,
    Json(req): Json<MaxSizeRequest>,
) -> Result<Json<MessageResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(PlaceholderError::InvalidRequest(error_msg));
    }

    state.cache.write().await.set_max_size(req.max_size);
    Ok(Json(MessageResponse::new(format!(
        "Max size set to {}",
        req.max_size
    ))))
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<MessageResponse> {
    state.cache.write().await.clear();
    Json(MessageResponse::new("Cache cleared"))
}

/// Handler for GET /cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<CacheStats> {
    // Acquire read lock for stats
    let cache = state.cache.read().await;
    Json(cache.stats())
}

/// Handler for GET /cache/export
pub async fn export_handler(State(state): State<AppState>) -> Json<CacheExport> {
    let cache = state.cache.read().await;
    Json(cache.export())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
