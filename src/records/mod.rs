//! Records Module
//!
//! A collection store layered on the cache: the whole collection lives under
//! one cache key and is read, modified and written back as a unit.

mod store;

pub use store::{Record, RecordStore, DEFAULT_COLLECTION_KEY};
