//! Snapshot Module
//!
//! Serialized form of the whole entry table: a JSON array of
//! `[key, entry]` pairs, sorted by key.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::CacheEntry;
use crate::error::Result;

/// Serializes the table.
pub fn encode<V: Serialize>(entries: &HashMap<String, CacheEntry<V>>) -> Result<String> {
    let mut pairs: Vec<(&String, &CacheEntry<V>)> = entries.iter().collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0));
    Ok(serde_json::to_string(&pairs)?)
}

/// Parses a snapshot produced by [`encode`]. A repeated key keeps its last entry.
pub fn decode<V: DeserializeOwned>(raw: &str) -> Result<HashMap<String, CacheEntry<V>>> {
    let pairs: Vec<(String, CacheEntry<V>)> = serde_json::from_str(raw)?;
    Ok(pairs.into_iter().collect())
}
