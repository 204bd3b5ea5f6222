//! Persistence Backend Module
//!
//! The durable string-keyed store the cache mirrors its table into.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{CacheError, Result};

// == Persistence Backend Trait ==
/// A durable string-keyed store.
///
/// Methods take `&self`; implementations provide their own interior
/// mutability so one store can be shared by successive engine instances.
pub trait PersistenceBackend: Send + Sync {
    /// Returns the value stored under `key`, or None if absent.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Erasing an absent key succeeds.
    fn erase(&self, key: &str) -> Result<()>;
}

impl<B: PersistenceBackend + ?Sized> PersistenceBackend for Arc<B> {
    fn read(&self, key: &str) -> Result<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        (**self).write(key, value)
    }

    fn erase(&self, key: &str) -> Result<()> {
        (**self).erase(key)
    }
}

// == Memory Backend ==
/// Process-local backend. Clones are handles to the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `key` currently holds a value.
    pub fn contains(&self, key: &str) -> bool {
        self.lock().map(|v| v.contains_key(key)).unwrap_or(false)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
        self.values
            .lock()
            .map_err(|_| CacheError::Persistence("memory backend lock poisoned".to_string()))
    }
}

impl PersistenceBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn erase(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}
