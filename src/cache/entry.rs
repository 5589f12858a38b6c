//! Cache Entry Module
//!
//! Defines a stored placeholder together with its access bookkeeping.

use crate::models::GeneratedPlaceholder;

// == Cache Entry ==
/// A cached placeholder. Only the access fields change after creation.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored placeholder, always with `cached = false`
    pub placeholder: GeneratedPlaceholder,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Number of reads plus the initial write, never below 1
    pub access_count: u64,
    /// Timestamp of the last read or of creation (Unix milliseconds)
    pub last_accessed_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped at `now`.
    pub fn new(mut placeholder: GeneratedPlaceholder, now: u64) -> Self {
        placeholder.cached = false;
        Self {
            placeholder,
            created_at: now,
            access_count: 1,
            last_accessed_at: now,
        }
    }

    // == Age ==
    pub fn age_ms(&self, now: u64) -> u64 {
        now.saturating_sub(self.created_at)
    }

    // == Is Expired ==
    /// An entry is expired once its age is strictly greater than the TTL.
    pub fn is_expired(&self, now: u64, ttl_ms: u64) -> bool {
        self.age_ms(now) > ttl_ms
    }

    // == Record Access ==
    pub fn record_access(&mut self, now: u64) {
        self.access_count += 1;
        self.last_accessed_at = now;
    }

    // == Eviction Score ==
    /// `last_accessed_at / (access_count + 1)`; the lowest score is evicted first.
    pub fn eviction_score(&self) -> f64 {
        self.last_accessed_at as f64 / (self.access_count + 1) as f64
    }

    // == Estimated Size ==
    /// Approximate bytes held for this entry: key plus serialized placeholder.
    pub fn estimated_size(&self, key: &str) -> usize {
        let payload = serde_json::to_vec(&self.placeholder)
            .map(|bytes| bytes.len())
            .unwrap_or(0);
        key.len() + payload
    }

    /// Returns the stored placeholder marked as served from cache.
    pub fn cached_copy(&self) -> GeneratedPlaceholder {
        GeneratedPlaceholder {
            cached: true,
            ..self.placeholder.clone()
        }
    }
}
