//! Backing document stores
//!
//! The core only needs get/set by key over a couple of named collections. Each
//! `set` is an atomic upsert of one whole document.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Collection holding the singleton canvas document
pub const CANVAS_COLLECTION: &str = "canvas";
/// Key of the canvas document
pub const CANVAS_KEY: &str = "current";
/// Collection holding one cooldown record per identity
pub const COOLDOWN_COLLECTION: &str = "cooldowns";

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document, `None` if the key has never been written
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError>;

    /// Insert or replace a document
    async fn set(&self, collection: &str, key: &str, value: Value) -> Result<(), StoreError>;

    /// Insert a document only if the key is vacant. Returns whether this call wrote it.
    async fn set_if_absent(
        &self,
        collection: &str,
        key: &str,
        value: Value,
    ) -> Result<bool, StoreError>;
}
