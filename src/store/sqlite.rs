//! SQLite storage for documents

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::error::StoreError;
use crate::store::DocumentStore;

/// Durable store keeping each document as JSON text in one table
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database at the given path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                key TEXT NOT NULL,
                body TEXT NOT NULL,
                PRIMARY KEY (collection, key)
            )",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure against the connection on the blocking pool
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().map_err(|_| StoreError::Poisoned)?;
            f(&guard)
        })
        .await?
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError> {
        let (collection, key) = (collection.to_string(), key.to_string());
        self.with_conn(move |conn| {
            let body: Option<String> = conn
                .query_row(
                    "SELECT body FROM documents WHERE collection = ?1 AND key = ?2",
                    params![collection, key],
                    |row| row.get(0),
                )
                .optional()?;

            match body {
                Some(text) => Ok(Some(serde_json::from_str(&text)?)),
                None => Ok(None),
            }
        })
        .await
    }

    async fn set(&self, collection: &str, key: &str, value: Value) -> Result<(), StoreError> {
        let (collection, key) = (collection.to_string(), key.to_string());
        let body = serde_json::to_string(&value)?;
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO documents (collection, key, body) VALUES (?1, ?2, ?3)",
                params![collection, key, body],
            )?;
            Ok(())
        })
        .await
    }

    async fn set_if_absent(
        &self,
        collection: &str,
        key: &str,
        value: Value,
    ) -> Result<bool, StoreError> {
        let (collection, key) = (collection.to_string(), key.to_string());
        let body = serde_json::to_string(&value)?;
        self.with_conn(move |conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO documents (collection, key, body) VALUES (?1, ?2, ?3)",
                params![collection, key, body],
            )?;
            Ok(inserted == 1)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.get("cooldowns", "alice").await.unwrap().is_none());

        store
            .set("cooldowns", "alice", json!({"cooldownEnd": 16000}))
            .await
            .unwrap();
        store
            .set("cooldowns", "alice", json!({"cooldownEnd": 31000}))
            .await
            .unwrap();

        let doc = store.get("cooldowns", "alice").await.unwrap().unwrap();
        assert_eq!(doc["cooldownEnd"], 31000);
    }

    #[tokio::test]
    async fn test_set_if_absent() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.set_if_absent("canvas", "current", json!(1)).await.unwrap());
        assert!(!store.set_if_absent("canvas", "current", json!(2)).await.unwrap());
        assert_eq!(store.get("canvas", "current").await.unwrap(), Some(json!(1)));
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("place.db");

        {
            let store = SqliteStore::new(&path).unwrap();
            store.set("cooldowns", "bob", json!(42)).await.unwrap();
        }

        let store = SqliteStore::new(&path).unwrap();
        assert_eq!(store.get("cooldowns", "bob").await.unwrap(), Some(json!(42)));
    }
}
