//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - TTL Cleanup: Removes expired cache entries (default every 5 minutes)
//! - Optimize: Collapses entries sharing a url (default every 30 minutes)

mod cleanup;

pub use cleanup::{spawn_cleanup_task, spawn_optimize_task};
