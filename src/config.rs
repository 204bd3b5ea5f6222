//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Cache configuration parameters.
///
/// Set once at construction and read-only afterwards. All values can be
/// configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL applied to entries stored without an explicit TTL
    pub default_ttl: Duration,
    /// Maximum number of entries the cache can hold (an entry count, not bytes)
    pub max_size: usize,
    /// Key the full table snapshot is stored under in the persistence backend
    pub storage_key: String,
    /// Whether every mutation is synchronized to the persistence backend
    pub enable_persistence: bool,
    /// Interval between background sweeps of expired entries
    pub cleanup_interval: Duration,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 30 minutes)
    /// - `CACHE_MAX_SIZE` - Maximum cache entries (default: 1000)
    /// - `CACHE_STORAGE_KEY` - Persistence key (default: "advanced_cache")
    /// - `CACHE_ENABLE_PERSISTENCE` - "true"/"false" (default: true)
    /// - `CACHE_CLEANUP_INTERVAL_MS` - Sweep interval in milliseconds (default: 5 minutes)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_ttl: env_parse::<u64>("CACHE_DEFAULT_TTL_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.default_ttl),
            max_size: env_parse("CACHE_MAX_SIZE").unwrap_or(defaults.max_size),
            storage_key: env::var("CACHE_STORAGE_KEY")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.storage_key),
            enable_persistence: env_parse("CACHE_ENABLE_PERSISTENCE")
                .unwrap_or(defaults.enable_persistence),
            cleanup_interval: env_parse::<u64>("CACHE_CLEANUP_INTERVAL_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.cleanup_interval),
        }
    }

    /// Overrides the storage key, keeping everything else.
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Checks the invariants the engine relies on.
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(CacheError::InvalidConfig(
                "max_size must be at least 1".to_string(),
            ));
        }
        if self.cleanup_interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "cleanup_interval must be greater than zero".to_string(),
            ));
        }
        if self.enable_persistence && self.storage_key.is_empty() {
            return Err(CacheError::InvalidConfig(
                "storage_key cannot be empty when persistence is enabled".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(30 * 60),
            max_size: 1000,
            storage_key: "advanced_cache".to_string(),
            enable_persistence: true,
            cleanup_interval: Duration::from_secs(5 * 60),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
