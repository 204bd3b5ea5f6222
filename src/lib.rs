//! Durable Cache - A bounded in-memory cache with optional persistence
//!
//! Provides TTL expiration, least-used eviction, hit/miss statistics,
//! change notifications and a record store built on top of the cache.

pub mod cache;
pub mod config;
pub mod error;
pub mod handle;
pub mod models;
pub mod persistence;
pub mod records;
pub mod tasks;

pub use cache::{CacheEngine, CacheStats};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use handle::CacheHandle;
pub use persistence::{FileBackend, MemoryBackend, PersistenceBackend};
pub use records::{Record, RecordStore};
pub use tasks::spawn_sweep_task;
