//! Response models for the placeholder engine
//!
//! Defines the generated placeholder handed back to callers and the small
//! DTOs returned by the cache administration endpoints.

use serde::{Deserialize, Serialize};

/// Randomized cutout treatment applied to a rendered placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aesthetic {
    /// Rotation in degrees
    pub rotation: f64,
    /// Horizontal offset in pixels
    pub translate_x: f64,
    /// Vertical offset in pixels
    pub translate_y: f64,
    /// Whether the card gets a decoration (one tape strip or one staple)
    pub has_decorations: bool,
}

impl Aesthetic {
    /// An untransformed aesthetic, used when nothing was sampled.
    pub fn neutral() -> Self {
        Self {
            rotation: 0.0,
            translate_x: 0.0,
            translate_y: 0.0,
            has_decorations: false,
        }
    }
}

/// A usable image reference produced by the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedPlaceholder {
    /// Image source (provider URL or `data:` URI)
    pub url: String,
    /// Procedural fallback to show if the provider URL fails to load
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_url: Option<String>,
    /// Provider name, `svg-fallback` or `emergency-fallback`
    pub service: String,
    /// Whether this value came from the cache
    #[serde(default)]
    pub cached: bool,
    pub aesthetic: Aesthetic,
}

/// Response body for maintenance operations that remove entries
#[derive(Debug, Clone, Serialize)]
pub struct RemovedResponse {
    pub removed: usize,
}

impl RemovedResponse {
    pub fn new(removed: usize) -> Self {
        Self { removed }
    }
}

/// Response body for administration operations without a payload
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
