//! Store contract.

use async_trait::async_trait;

use crate::KvResult;

/// Asynchronous string store keyed by name.
///
/// Every `set` replaces the whole value stored under the key; there is no
/// partial update.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get the value stored under `key`.
    ///
    /// Returns `None` if the key doesn't exist.
    async fn get(&self, key: &str) -> KvResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> KvResult<()>;

    /// Delete the value under `key`. Deleting an absent key succeeds.
    async fn delete(&self, key: &str) -> KvResult<()>;

    /// Check if a key exists.
    async fn exists(&self, key: &str) -> KvResult<bool> {
        Ok(self.get(key).await?.is_some())
    }
}
