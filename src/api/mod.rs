//! API Module
//!
//! HTTP handlers and routing for the placeholder server REST API.
//!
//! # Endpoints
//! - `POST /placeholder` - Generate a placeholder
//! - `POST /placeholder/preload` - Warm the cache
//! - `/cache/...` - Cache administration
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
