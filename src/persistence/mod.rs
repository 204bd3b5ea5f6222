//! Persistence Module
//!
//! Durable mirrors of the cache table and the snapshot format they hold.

mod backend;
mod file;
pub mod snapshot;

pub use backend::{MemoryBackend, PersistenceBackend};
pub use file::FileBackend;
