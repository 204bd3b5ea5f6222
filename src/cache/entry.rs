//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL and usage metadata.

use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// A single cached value plus its expiry and access metadata.
///
/// All timestamps are Unix milliseconds. The serialized field names are the
/// ones used in persisted snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<V> {
    /// The stored value
    pub data: V,
    /// Absolute expiration timestamp
    pub expire_time: u64,
    /// Creation timestamp
    pub created_at: u64,
    /// Number of live hits since the entry was (re)written
    pub access_count: u64,
    /// Timestamp of the last write or live hit
    pub last_accessed: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a fresh entry expiring `ttl_ms` after `now_ms`.
    pub fn new(data: V, now_ms: u64, ttl_ms: u64) -> Self {
        Self {
            data,
            expire_time: now_ms.saturating_add(ttl_ms),
            created_at: now_ms,
            access_count: 0,
            last_accessed: now_ms,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry is expired at `now_ms`.
    ///
    /// Boundary condition: an entry is expired once the current time reaches
    /// the expiration time, so a zero TTL is dead on the next access. Lazy
    /// expiry and the sweep both go through this check.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms >= self.expire_time
    }

    // == Touch ==
    /// Records a live hit.
    pub fn touch(&mut self, now_ms: u64) {
        self.access_count = self.access_count.saturating_add(1);
        self.last_accessed = now_ms;
    }

    // == Time To Live ==
    /// Returns the remaining TTL in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> u64 {
        self.expire_time.saturating_sub(now_ms)
    }
}
