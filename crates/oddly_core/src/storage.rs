use async_trait::async_trait;

use crate::Result;

/// Persistent string key-value store surviving process restarts.
///
/// Both caches are layered over this seam, so tests run against the in-memory
/// backend and the app against sqlite without either side knowing.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Look up a value by key.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value under a key, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Enumerate all stored keys. Needed for bulk removal by prefix.
    async fn keys(&self) -> Result<Vec<String>>;
}
