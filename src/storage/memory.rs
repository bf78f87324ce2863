/// In-memory cache store
///
/// Values are kept serialized, so reads go through the same JSON decoding as
/// the SQLite store. Useful for tests and for hosts without a filesystem.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use crate::storage::{CacheKey, CacheStore, StorageError};

#[derive(Default)]
pub struct MemoryCache {
    data: Mutex<HashMap<CacheKey, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored
    pub fn len(&self) -> usize {
        self.data.lock().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheStore for MemoryCache {
    fn read(&self, key: CacheKey) -> Result<Option<Value>, StorageError> {
        let data = self.data.lock().map_err(|_| StorageError::Poisoned)?;
        match data.get(&key) {
            Some(text) => Ok(Some(serde_json::from_str(text)?)),
            None => Ok(None),
        }
    }

    fn write(&self, key: CacheKey, value: &Value) -> Result<(), StorageError> {
        let text = serde_json::to_string(value)?;
        let mut data = self.data.lock().map_err(|_| StorageError::Poisoned)?;
        data.insert(key, text);
        Ok(())
    }
}
