/// Local cache store for the profile and the log collection
///
/// This module is a small persistent key-value surface. It holds exactly two
/// keys, each with a JSON value, and is owned by the sync coordinator.

pub mod memory;
pub mod migrations;
pub mod sqlite;

// Re-export the main storage types
pub use memory::MemoryCache;
pub use sqlite::SqliteCache;

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur during cache operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Cache lock poisoned")]
    Poisoned,
}

/// The two entries the cache knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Profile,
    Logs,
}

impl CacheKey {
    /// Key name as stored on disk
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheKey::Profile => "profile",
            CacheKey::Logs => "logs",
        }
    }
}

/// Trait defining the local cache interface
///
/// No transactions and no expiry: a write replaces the whole value stored
/// under the key.
pub trait CacheStore {
    /// Read the value stored under `key`, if any
    fn read(&self, key: CacheKey) -> Result<Option<Value>, StorageError>;

    /// Replace the value stored under `key`
    fn write(&self, key: CacheKey, value: &Value) -> Result<(), StorageError>;
}
