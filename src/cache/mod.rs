//! Cache Module
//!
//! Provides the in-memory placeholder cache with TTL expiration,
//! frequency-weighted eviction and url deduplication.

mod clock;
mod entry;
mod key;
mod stats;
mod store;


// Re-export public types
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use key::cache_key;
pub use stats::CacheStats;
pub use store::{CacheExport, ExportedEntry, PlaceholderCache, SharedCache};
