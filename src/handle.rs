//! Cache Handle
//!
//! An explicitly constructed owner of one cache engine and its background
//! sweep. Clones share both.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{CacheChange, CacheEngine, CacheStats};
use crate::error::Result;
use crate::tasks::{spawn_sweep_task, SharedEngine};

/// Shared, async access to a [`CacheEngine`] plus control of its sweep task.
pub struct CacheHandle<V> {
    engine: SharedEngine<V>,
    sweeper: Arc<Sweeper>,
}

/// Owns the sweep task; aborts it when the last handle goes away.
#[derive(Default)]
struct Sweeper(Mutex<Option<JoinHandle<()>>>);

impl Drop for Sweeper {
    fn drop(&mut self) {
        let task = match self.0.get_mut() {
            Ok(slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(task) = task {
            task.abort();
            debug!("TTL sweep task aborted: last cache handle dropped");
        }
    }
}

impl<V> Clone for CacheHandle<V> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            sweeper: self.sweeper.clone(),
        }
    }
}

impl<V> CacheHandle<V>
where
    V: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Wraps an engine without starting a sweep.
    pub fn new(engine: CacheEngine<V>) -> Self {
        Self {
            engine: Arc::new(RwLock::new(engine)),
            sweeper: Arc::new(Sweeper::default()),
        }
    }

    /// Wraps an engine and starts sweeping at its configured interval.
    ///
    /// Must be called from within a tokio runtime. The task runs until
    /// [`shutdown`](Self::shutdown) or until every clone of the handle is
    /// dropped, whichever comes first.
    pub fn start(engine: CacheEngine<V>) -> Self {
        let interval = engine.config().cleanup_interval;
        let handle = Self::new(engine);
        let task = spawn_sweep_task(handle.engine.clone(), interval);
        *handle.lock_sweeper() = Some(task);
        handle
    }

    /// Stops the periodic sweep.
    ///
    /// Returns true if a sweep task was running. Later calls, or calls on a
    /// handle that never started one, do nothing.
    pub fn shutdown(&self) -> bool {
        match self.lock_sweeper().take() {
            Some(task) => {
                task.abort();
                info!("TTL sweep task stopped");
                true
            }
            None => false,
        }
    }

    /// Returns true while the sweep task is scheduled.
    pub fn is_sweeping(&self) -> bool {
        self.lock_sweeper()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    pub async fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) -> Result<()> {
        self.engine.write().await.set(key, value, ttl)
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        self.engine.write().await.get(key)
    }

    pub async fn delete(&self, key: &str) -> bool {
        self.engine.write().await.delete(key)
    }

    pub async fn has(&self, key: &str) -> bool {
        self.engine.write().await.has(key)
    }

    pub async fn clear(&self) -> Result<()> {
        self.engine.write().await.clear()
    }

    pub async fn stats(&self) -> CacheStats {
        self.engine.read().await.stats()
    }

    pub async fn sweep(&self) -> usize {
        self.engine.write().await.sweep()
    }

    pub async fn subscribe(&self) -> broadcast::Receiver<CacheChange> {
        self.engine.read().await.subscribe()
    }

    /// The shared engine, for callers that need several operations under one lock.
    pub fn engine(&self) -> SharedEngine<V> {
        self.engine.clone()
    }

    fn lock_sweeper(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.sweeper
            .0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
