//! Cutout Placeholder - magazine-cutout placeholder image engine
//!
//! Resolves a placeholder request to an image reference: cached result,
//! first responsive remote provider, or a procedurally synthesized SVG.
//! Results live in a bounded TTL cache with access-weighted eviction.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod generation;
pub mod models;
pub mod tasks;

pub use api::{create_router, AppState};
pub use cache::{PlaceholderCache, SharedCache};
pub use config::{Config, PlaceholderConfig};
pub use error::{PlaceholderError, Result};
pub use generation::PlaceholderOrchestrator;
pub use tasks::{spawn_cleanup_task, spawn_optimize_task};
