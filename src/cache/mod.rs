//! Cache Module
//!
//! Provides in-memory caching with TTL expiration, least-used eviction and
//! optional persistence.

mod clock;
mod engine;
mod entry;
mod events;
mod eviction;
mod stats;


// Re-export public types
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub use engine::CacheEngine;
pub use entry::CacheEntry;
pub use events::{CacheChange, ChangeKind, ChangeNotifier, CHANGE_CHANNEL_CAPACITY};
pub use eviction::select_victim;
pub use stats::{CacheStats, StorageType};
