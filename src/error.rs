//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache engine and its consumers.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The persistence backend failed to read, write or erase a snapshot
    #[error("Persistence failure: {0}")]
    Persistence(String),

    /// A value or snapshot could not be (de)serialized
    #[error("Serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration rejected at construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Record not found in a record store
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Filesystem error from a file-backed store
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;
