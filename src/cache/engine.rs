//! Cache Engine Module
//!
//! Main cache engine combining HashMap storage with TTL expiration,
//! usage-based eviction and optional persistence of the whole table.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::cache::eviction::select_victim;
use crate::cache::{
    CacheChange, CacheEntry, CacheStats, ChangeKind, ChangeNotifier, Clock, StorageType,
    SystemClock,
};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::persistence::{snapshot, MemoryBackend, PersistenceBackend};

/// State of a key as seen by an access at a given instant.
enum Liveness {
    Absent,
    Expired,
    Live,
}

// == Cache Engine ==
/// Bounded, time-aware key-value cache.
///
/// The engine has a single owner and no internal locking; share it through
/// [`crate::CacheHandle`] when a background sweep needs to reach it.
/// Expired entries stay in the table, counting toward capacity and memory
/// usage, until an access observes them or a sweep removes them.
pub struct CacheEngine<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Performance statistics
    stats: CacheStats,
    config: CacheConfig,
    backend: Box<dyn PersistenceBackend>,
    clock: Arc<dyn Clock>,
    notifier: ChangeNotifier,
}

impl<V> fmt::Debug for CacheEngine<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEngine")
            .field("len", &self.entries.len())
            .field("stats", &self.stats)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<V> CacheEngine<V>
where
    V: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    // == Constructors ==
    /// Creates an engine mirrored to `backend`, restoring any snapshot found
    /// under the configured storage key.
    ///
    /// An unreadable or malformed snapshot is erased and the engine starts
    /// empty. Only an invalid configuration makes construction fail.
    pub fn new(config: CacheConfig, backend: impl PersistenceBackend + 'static) -> Result<Self> {
        Self::with_clock(config, backend, Arc::new(SystemClock))
    }

    /// Creates an engine that never touches a durable store.
    pub fn in_memory(config: CacheConfig) -> Result<Self> {
        let config = CacheConfig {
            enable_persistence: false,
            ..config
        };
        Self::new(config, MemoryBackend::new())
    }

    /// Like [`CacheEngine::new`] with an explicit time source.
    pub fn with_clock(
        config: CacheConfig,
        backend: impl PersistenceBackend + 'static,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        let storage_type = if config.enable_persistence {
            StorageType::Persistent
        } else {
            StorageType::Memory
        };

        let mut engine = Self {
            entries: HashMap::new(),
            stats: CacheStats::new(storage_type),
            config,
            backend: Box::new(backend),
            clock,
            notifier: ChangeNotifier::new(),
        };

        if engine.config.enable_persistence {
            engine.restore();
        }

        Ok(engine)
    }

    // == Set ==
    /// Stores a value, overwriting any previous entry for `key`.
    ///
    /// If the key is new and the cache is at capacity, one entry is evicted
    /// first. The entry expires `ttl` (or the configured default) from now.
    ///
    /// The in-memory table is always updated; an error means only that the
    /// persisted snapshot could not be written.
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl: Option<Duration>) -> Result<()> {
        let key = key.into();

        if !self.entries.contains_key(&key) && self.entries.len() >= self.config.max_size {
            self.evict_one();
        }

        let now = self.clock.now_ms();
        let ttl_ms = duration_ms(ttl.unwrap_or(self.config.default_ttl));
        self.entries
            .insert(key.clone(), CacheEntry::new(value, now, ttl_ms));
        self.refresh_derived();

        debug!("Set key '{}' (ttl {}ms)", key, ttl_ms);
        self.notifier
            .publish(CacheChange::keyed(key.as_str(), ChangeKind::Set));

        self.sync().map_err(|err| {
            error!("[key: {}] {}", key, err);
            err
        })
    }

    // == Get ==
    /// Retrieves a live value.
    ///
    /// A hit bumps the entry's access count and last-access time. Absent and
    /// expired keys count as misses; an expired entry is removed.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let now = self.clock.now_ms();

        match self.liveness(key, now) {
            Liveness::Absent | Liveness::Expired => {
                self.stats.record_miss();
                debug!("Cache miss for key '{}'", key);
                None
            }
            Liveness::Live => {
                let entry = self.entries.get_mut(key)?;
                entry.touch(now);
                let value = entry.data.clone();
                self.stats.record_hit();

                if let Err(err) = self.sync() {
                    warn!("[key: {}] access metadata not persisted: {}", key, err);
                }
                Some(value)
            }
        }
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether anything was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_none() {
            return false;
        }

        self.refresh_derived();
        debug!("Deleted key '{}'", key);
        self.notifier
            .publish(CacheChange::keyed(key, ChangeKind::Deleted));

        if let Err(err) = self.sync() {
            warn!("[key: {}] deletion not persisted: {}", key, err);
        }
        true
    }

    // == Has ==
    /// Returns whether `key` is live without touching statistics or access
    /// metadata. An expired entry is removed as a side effect.
    pub fn has(&mut self, key: &str) -> bool {
        let now = self.clock.now_ms();
        matches!(self.liveness(key, now), Liveness::Live)
    }

    // == Clear ==
    /// Empties the table and erases the persisted snapshot.
    ///
    /// Hit and miss counters are kept; item count and memory usage reset.
    pub fn clear(&mut self) -> Result<()> {
        let removed = self.entries.len();
        self.entries.clear();
        self.refresh_derived();

        info!("Cleared {} entries", removed);
        self.notifier.publish(CacheChange::table(ChangeKind::Cleared));

        if self.config.enable_persistence {
            let key = &self.config.storage_key;
            self.backend.erase(key).map_err(|err| {
                error!("Failed to erase snapshot '{}': {}", key, err);
                CacheError::Persistence(format!("failed to erase snapshot '{}': {}", key, err))
            })?;
        }
        Ok(())
    }

    // == Stats ==
    /// Returns a copy of the current statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.total_items = self.entries.len();
        stats
    }

    // == Sweep ==
    /// Removes every entry expired at call time.
    ///
    /// Returns the number of entries removed.
    pub fn sweep(&mut self) -> usize {
        let now = self.clock.now_ms();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        let removed = before - self.entries.len();

        if removed > 0 {
            self.stats.record_expirations(removed);
            self.refresh_derived();
            self.notifier
                .publish(CacheChange::table(ChangeKind::Swept { removed }));

            if let Err(err) = self.sync() {
                warn!("Sweep of {} entries not persisted: {}", removed, err);
            }
        }
        removed
    }

    // == Subscribe ==
    /// Returns a receiver of every change committed from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheChange> {
        self.notifier.subscribe()
    }

    /// Remaining TTL of a live entry, without counting as an access.
    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        let now = self.clock.now_ms();
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| Duration::from_millis(entry.ttl_remaining_ms(now)))
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns the number of entries in the table, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Internals ==
    /// Classifies `key` at `now`, removing it if it turned out to be expired.
    fn liveness(&mut self, key: &str, now: u64) -> Liveness {
        let expired = match self.entries.get(key) {
            None => return Liveness::Absent,
            Some(entry) => entry.is_expired_at(now),
        };
        if !expired {
            return Liveness::Live;
        }

        self.entries.remove(key);
        self.stats.record_expirations(1);
        self.refresh_derived();
        debug!("Key '{}' expired on access", key);
        self.notifier
            .publish(CacheChange::keyed(key, ChangeKind::Expired));
        Liveness::Expired
    }

    fn evict_one(&mut self) {
        let Some(victim) = select_victim(&self.entries).map(str::to_owned) else {
            return;
        };
        self.entries.remove(&victim);
        self.stats.record_eviction();
        debug!("Evicted key '{}' to make room", victim);
        self.notifier
            .publish(CacheChange::keyed(victim, ChangeKind::Evicted));
    }

    fn refresh_derived(&mut self) {
        let memory_usage = self
            .entries
            .iter()
            .map(|(key, entry)| key.len() + serialized_len(entry))
            .sum();
        self.stats.set_derived(self.entries.len(), memory_usage);
    }

    /// Writes the whole table to the backend when persistence is enabled.
    fn sync(&self) -> Result<()> {
        if !self.config.enable_persistence {
            return Ok(());
        }
        let key = &self.config.storage_key;
        let raw = snapshot::encode(&self.entries)?;
        self.backend.write(key, &raw).map_err(|err| {
            CacheError::Persistence(format!("failed to write snapshot '{}': {}", key, err))
        })
    }

    fn restore(&mut self) {
        let key = self.config.storage_key.clone();
        let raw = match self.backend.read(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No snapshot under '{}', starting empty", key);
                return;
            }
            Err(err) => {
                warn!("Discarding unreadable snapshot '{}': {}", key, err);
                self.discard_snapshot(&key);
                return;
            }
        };

        match snapshot::decode::<V>(&raw) {
            Ok(entries) => {
                self.entries = entries;
                while self.entries.len() > self.config.max_size {
                    self.evict_one();
                }
                self.refresh_derived();
                info!("Restored {} entries from '{}'", self.entries.len(), key);
            }
            Err(err) => {
                warn!("Discarding malformed snapshot '{}': {}", key, err);
                self.discard_snapshot(&key);
            }
        }
    }

    /// Erases a stored snapshot that could not be loaded so later starts do
    /// not trip over it again. The engine starts empty either way.
    fn discard_snapshot(&self, key: &str) {
        if let Err(err) = self.backend.erase(key) {
            warn!("Could not erase snapshot '{}': {}", key, err);
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn serialized_len<V: Serialize>(value: &V) -> usize {
    serde_json::to_vec(value).map(|bytes| bytes.len()).unwrap_or(0)
}
