//! Record Store Module
//!
//! Keeps a `Vec<R>` under a single cache key.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::handle::CacheHandle;

/// Cache key the collection is stored under unless overridden.
pub const DEFAULT_COLLECTION_KEY: &str = "users";

// == Record Trait ==
/// An item of a record collection, identified by a string id.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    fn id(&self) -> &str;
}

// == Record Store ==
/// Named collection of records stored as one cache value.
///
/// Every write replaces the whole collection, so each one goes through the
/// cache's persistence and change notification like any other `set`.
pub struct RecordStore<R> {
    cache: CacheHandle<Vec<R>>,
    key: String,
}

impl<R> Clone for RecordStore<R> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            key: self.key.clone(),
        }
    }
}

impl<R: Record> RecordStore<R> {
    /// Creates a store over `cache` using [`DEFAULT_COLLECTION_KEY`].
    pub fn new(cache: CacheHandle<Vec<R>>) -> Self {
        Self::with_key(cache, DEFAULT_COLLECTION_KEY)
    }

    pub fn with_key(cache: CacheHandle<Vec<R>>, key: impl Into<String>) -> Self {
        Self {
            cache,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn cache(&self) -> &CacheHandle<Vec<R>> {
        &self.cache
    }

    /// Returns the whole collection; empty if absent or expired.
    pub async fn list(&self) -> Vec<R> {
        self.cache.get(&self.key).await.unwrap_or_default()
    }

    /// Replaces the whole collection.
    pub async fn save_all(&self, records: Vec<R>) -> Result<()> {
        debug!("Saving {} records under '{}'", records.len(), self.key);
        self.cache.set(self.key.as_str(), records, None).await
    }

    pub async fn find(&self, id: &str) -> Option<R> {
        self.list().await.into_iter().find(|record| record.id() == id)
    }

    /// Adds a record, replacing any existing record with the same id.
    pub async fn add(&self, record: R) -> Result<()> {
        let mut records = self.list().await;
        match records.iter_mut().find(|existing| existing.id() == record.id()) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
        self.save_all(records).await
    }

    /// Removes the record with `id`. Returns whether one was removed.
    pub async fn remove(&self, id: &str) -> Result<bool> {
        let mut records = self.list().await;
        let before = records.len();
        records.retain(|record| record.id() != id);
        if records.len() == before {
            return Ok(false);
        }
        self.save_all(records).await?;
        Ok(true)
    }

    /// Replaces the record with the same id.
    pub async fn update(&self, record: R) -> Result<()> {
        let mut records = self.list().await;
        let existing = records
            .iter_mut()
            .find(|existing| existing.id() == record.id())
            .ok_or_else(|| CacheError::NotFound(record.id().to_string()))?;
        *existing = record;
        self.save_all(records).await
    }
}
