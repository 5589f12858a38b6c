//! Request and response models for the placeholder engine
//!
//! Shared by the orchestrator, the cache and the HTTP layer.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{
    ContentCategory, MaxSizeRequest, PlaceholderRequest, Priority, ResolvedConfig, StyleModifier,
};
pub use responses::{
    Aesthetic, GeneratedPlaceholder, HealthResponse, MessageResponse, RemovedResponse,
};
