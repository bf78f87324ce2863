/// SQLite implementation of the local cache store
///
/// Each cache key is one row; the value is kept as JSON text so the stored
/// shape is exactly what the coordinator wrote.

use std::path::PathBuf;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use crate::storage::{migrations, CacheKey, CacheStore, StorageError};

/// SQLite-based cache store
pub struct SqliteCache {
    conn: Connection,
}

impl SqliteCache {
    /// Open (or create) the cache database at `db_path`
    ///
    /// This opens the database file and runs any necessary migrations
    /// to ensure the schema is up to date.
    pub fn new(db_path: PathBuf) -> Result<Self, StorageError> {
        let conn = Connection::open(&db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        migrations::initialize_database(&conn)?;

        tracing::info!("SQLite cache initialized at: {:?}", db_path);

        Ok(Self { conn })
    }

    /// Cache that lives only as long as this value
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        migrations::initialize_database(&conn)?;

        Ok(Self { conn })
    }
}

impl CacheStore for SqliteCache {
    fn read(&self, key: CacheKey) -> Result<Option<Value>, StorageError> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM cache_entries WHERE key = ?1",
                params![key.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn write(&self, key: CacheKey, value: &Value) -> Result<(), StorageError> {
        let text = serde_json::to_string(value)?;

        self.conn.execute(
            "INSERT INTO cache_entries (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key.as_str(), text, Utc::now().to_rfc3339()],
        )?;

        tracing::debug!("Wrote cache key '{}' ({} bytes)", key.as_str(), text.len());
        Ok(())
    }
}
