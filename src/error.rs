//! Error types for the placeholder engine
//!
//! Provides unified error handling using thiserror. None of these ever escape
//! `PlaceholderOrchestrator::generate_placeholder`; they surface only through
//! the ordered fallback chain, the logs, and the cache administration API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Placeholder Error Enum ==
/// Unified error type for the placeholder engine.
#[derive(Error, Debug)]
pub enum PlaceholderError {
    /// A single provider answered with an error or was unreachable
    #[error("Service unavailable: {target}: {reason}")]
    ServiceUnavailable { target: String, reason: String },

    /// A single provider did not settle within the probe timeout
    #[error("Service timed out after {timeout_ms}ms: {target}")]
    Timeout { target: String, timeout_ms: u64 },

    /// Every configured provider failed
    #[error("All {attempted} providers exhausted")]
    AllProvidersExhausted { attempted: usize },

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Key not present in the cache (administration API only)
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Unexpected internal failure
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for PlaceholderError {
    fn into_response(self) -> Response {
        let status = match &self {
            PlaceholderError::NotFound(_) => StatusCode::NOT_FOUND,
            PlaceholderError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            PlaceholderError::ServiceUnavailable { .. }
            | PlaceholderError::Timeout { .. }
            | PlaceholderError::AllProvidersExhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
            PlaceholderError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the placeholder engine.
pub type Result<T> = std::result::Result<T, PlaceholderError>;
