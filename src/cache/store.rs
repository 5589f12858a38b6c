//! Placeholder Cache Module
//!
//! Bounded, TTL-aware cache of generated placeholders with frequency-weighted
//! eviction and url deduplication.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::cache::{CacheEntry, CacheStats, Clock, SystemClock};
use crate::config::PerformanceConfig;
use crate::models::GeneratedPlaceholder;

/// The single cache instance shared by the orchestrator, the maintenance
/// tasks and the HTTP handlers. Every mutation goes through the write lock.
pub type SharedCache = Arc<RwLock<PlaceholderCache>>;

// == Export Types ==
/// One entry in a diagnostics dump.
#[derive(Debug, Clone, Serialize)]
pub struct ExportedEntry {
    pub key: String,
    pub url: String,
    pub service: String,
    pub access_count: u64,
    pub created_at: u64,
    pub last_accessed_at: u64,
    pub age_ms: u64,
}

/// A diagnostics dump of the whole cache.
#[derive(Debug, Clone, Serialize)]
pub struct CacheExport {
    pub exported_at: DateTime<Utc>,
    pub max_size: usize,
    pub ttl_ms: u64,
    pub entries: Vec<ExportedEntry>,
}

// == Placeholder Cache ==
#[derive(Debug)]
pub struct PlaceholderCache {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_size: usize,
    /// Entry time-to-live in milliseconds
    ttl_ms: u64,
    clock: Arc<dyn Clock>,
}

impl PlaceholderCache {
    // == Constructor ==
    /// Creates a cache on the system clock.
    ///
    /// # Arguments
    /// * `max_size` - Maximum number of entries (at least 1)
    /// * `ttl_ms` - Entry time-to-live in milliseconds
    pub fn new(max_size: usize, ttl_ms: u64) -> Self {
        Self::with_clock(max_size, ttl_ms, Arc::new(SystemClock))
    }

    /// Creates a cache driven by the given clock.
    pub fn with_clock(max_size: usize, ttl_ms: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            max_size: max_size.max(1),
            ttl_ms,
            clock,
        }
    }

    pub fn from_config(performance: &PerformanceConfig) -> Self {
        Self::new(performance.max_cache_entries, performance.cache_duration_ms)
    }

    /// Wraps the cache for sharing across tasks.
    pub fn shared(self) -> SharedCache {
        Arc::new(RwLock::new(self))
    }

    // == Get ==
    /// Returns a copy of the placeholder marked `cached = true`.
    ///
    /// Expired entries are removed and counted as misses.
    pub fn get(&mut self, key: &str) -> Option<GeneratedPlaceholder> {
        let now = self.clock.now_ms();

        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(now, self.ttl_ms),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.entries.remove(key);
            self.stats.record_miss();
            return None;
        }

        let entry = self.entries.get_mut(key)?;
        entry.record_access(now);
        let placeholder = entry.cached_copy();
        self.stats.record_hit();
        Some(placeholder)
    }

    // == Set ==
    /// Stores a placeholder, evicting one entry first if the cache is full.
    pub fn set(&mut self, key: String, placeholder: GeneratedPlaceholder) {
        if self.entries.len() >= self.max_size {
            self.evict_oldest();
        }

        let entry = CacheEntry::new(placeholder, self.clock.now_ms());
        self.entries.insert(key, entry);
    }

    // == Evict Oldest ==
    /// Removes the single entry with the lowest eviction score.
    ///
    /// Ties go to the lexicographically smallest key so eviction is
    /// deterministic. Returns the evicted key, None if the cache is empty.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let victim = self
            .entries
            .iter()
            .min_by(|(key_a, a), (key_b, b)| {
                a.eviction_score()
                    .total_cmp(&b.eviction_score())
                    .then_with(|| key_a.cmp(key_b))
            })
            .map(|(key, _)| key.clone())?;

        self.entries.remove(&victim);
        self.stats.record_eviction();
        Some(victim)
    }

    // == Clean Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn clean_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let ttl_ms = self.ttl_ms;
        let before = self.entries.len();

        self.entries.retain(|_, entry| !entry.is_expired(now, ttl_ms));

        before - self.entries.len()
    }

    // == Optimize ==
    /// Collapses entries that resolved to the same url, keeping the most accessed.
    ///
    /// Returns the number of entries removed.
    pub fn optimize(&mut self) -> usize {
        let mut by_url: HashMap<&str, Vec<(&String, u64)>> = HashMap::new();
        for (key, entry) in &self.entries {
            by_url
                .entry(entry.placeholder.url.as_str())
                .or_default()
                .push((key, entry.access_count));
        }

        let mut duplicates: Vec<String> = Vec::new();
        for mut group in by_url.into_values().filter(|group| group.len() > 1) {
            group.sort_by(|(key_a, count_a), (key_b, count_b)| {
                count_b.cmp(count_a).then_with(|| key_a.cmp(key_b))
            });
            duplicates.extend(group.into_iter().skip(1).map(|(key, _)| key.clone()));
        }

        for key in &duplicates {
            self.entries.remove(key);
        }

        duplicates.len()
    }

    // == Clear ==
    /// Removes every entry and resets the statistics.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats.reset();
    }

    // == Set Max Size ==
    /// Changes the capacity, evicting until the cache fits.
    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size.max(1);
        while self.entries.len() > self.max_size {
            if self.evict_oldest().is_none() {
                break;
            }
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn ttl_ms(&self) -> u64 {
        self.ttl_ms
    }

    // == Stats ==
    /// Returns a statistics snapshot.
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now_ms();
        let mut stats = self.stats.clone();

        stats.total_entries = self.entries.len();
        stats.hit_rate = stats.compute_hit_rate();
        stats.memory_usage_estimate = self
            .entries
            .iter()
            .map(|(key, entry)| entry.estimated_size(key))
            .sum();
        stats.oldest_entry_age_ms = self
            .entries
            .values()
            .map(|entry| entry.created_at)
            .min()
            .map(|created_at| now.saturating_sub(created_at))
            .unwrap_or(0);
        stats.most_accessed_key = self
            .entries
            .iter()
            .max_by(|(key_a, a), (key_b, b)| {
                a.access_count
                    .cmp(&b.access_count)
                    .then_with(|| key_b.cmp(key_a))
            })
            .map(|(key, _)| key.clone());

        stats
    }

    // == Export ==
    /// Dumps every entry, sorted by key.
    pub fn export(&self) -> CacheExport {
        let now = self.clock.now_ms();
        let mut entries: Vec<ExportedEntry> = self
            .entries
            .iter()
            .map(|(key, entry)| ExportedEntry {
                key: key.clone(),
                url: entry.placeholder.url.clone(),
                service: entry.placeholder.service.clone(),
                access_count: entry.access_count,
                created_at: entry.created_at,
                last_accessed_at: entry.last_accessed_at,
                age_ms: entry.age_ms(now),
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));

        CacheExport {
            exported_at: DateTime::from_timestamp_millis(now as i64).unwrap_or_default(),
            max_size: self.max_size,
            ttl_ms: self.ttl_ms,
            entries,
        }
    }

    // == Length ==
    /// Returns the current number of entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether an entry is stored under `key`, without touching stats or expiry.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}
