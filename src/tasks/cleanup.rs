//! Cache Maintenance Tasks
//!
//! Background tasks that periodically sweep expired entries and collapse
//! duplicate urls. Each run holds the write lock for one pass over at most
//! `max_size` entries.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCache;

/// Spawns a background task that periodically removes expired cache entries.
///
/// # Arguments
/// * `cache` - Shared reference to the cache
/// * `cleanup_interval_secs` - Interval in seconds between cleanup runs
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = PlaceholderCache::new(100, 3_600_000).shared();
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), 300);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(cache: SharedCache, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.write().await.clean_expired();

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}

/// Spawns a background task that periodically deduplicates entries by url.
pub fn spawn_optimize_task(cache: SharedCache, optimize_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(optimize_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting cache optimize task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.write().await.optimize();

            if removed > 0 {
                info!("Cache optimize: removed {} duplicate entries", removed);
            } else {
                debug!("Cache optimize: no duplicates found");
            }
        }
    })
}
