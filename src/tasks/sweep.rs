//! TTL Sweep Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::cache::CacheEngine;

/// Engine shared between its owner and the sweep task.
pub type SharedEngine<V> = Arc<RwLock<CacheEngine<V>>>;

/// Spawns a background task that periodically sweeps expired cache entries.
///
/// The task is a single loop, so at most one sweep is in flight. Ticks
/// missed while a sweep waits for the lock are skipped rather than queued.
/// Abort the returned handle to stop sweeping.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(RwLock::new(CacheEngine::<String>::in_memory(config)?));
/// let sweep_handle = spawn_sweep_task(cache.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task<V>(cache: SharedEngine<V>, interval: Duration) -> JoinHandle<()>
where
    V: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    let period = interval.max(Duration::from_millis(1));

    tokio::spawn(async move {
        info!("Starting TTL sweep task with interval of {:?}", period);

        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let removed = {
                let mut cache_guard = cache.write().await;
                cache_guard.sweep()
            };

            if removed > 0 {
                info!("TTL sweep: removed {} expired entries", removed);
            } else {
                debug!("TTL sweep: no expired entries found");
            }
        }
    })
}
