//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, and evictions.

use serde::{Deserialize, Serialize};

// == Storage Type ==
/// Where the cache keeps its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// In-memory only
    Memory,
    /// Mirrored to a persistence backend
    Persistent,
}

// == Cache Stats ==
/// Tracks cache performance metrics.
///
/// Returned by value from `CacheEngine::stats`, never as a live view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Current number of entries in the table (expired-but-unswept included)
    pub total_items: usize,
    /// Number of live hits
    pub hit_count: u64,
    /// Number of misses (absent or expired)
    pub miss_count: u64,
    /// Approximate footprint: key bytes plus serialized entry bytes
    pub memory_usage: usize,
    /// Whether the cache is persisted
    pub storage_type: StorageType,
    /// Number of entries evicted to make room
    pub evictions: u64,
    /// Number of entries removed because they expired
    pub expirations: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new(storage_type: StorageType) -> Self {
        Self {
            total_items: 0,
            hit_count: 0,
            miss_count: 0,
            memory_usage: 0,
            storage_type,
            evictions: 0,
            expirations: 0,
        }
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hit_count += 1;
    }

    pub fn record_miss(&mut self) {
        self.miss_count += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    // == Derived Fields ==
    /// Replaces the fields derived from the table contents.
    pub fn set_derived(&mut self, total_items: usize, memory_usage: usize) {
        self.total_items = total_items;
        self.memory_usage = memory_usage;
    }
}
