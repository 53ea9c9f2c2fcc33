//! In-memory store for development and testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::{KeyValueStore, KvError, KvResult};

#[derive(Default)]
struct Shared {
    entries: Mutex<HashMap<String, String>>,
    writes: AtomicU64,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

/// In-memory Key-Value store.
///
/// Clones share the same entries, so a test can keep one handle while the
/// code under test owns another.
#[derive(Clone, Default)]
pub struct MemoryStore {
    shared: Arc<Shared>,
    write_delay: Option<Duration>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every `set` by `delay` before it lands.
    pub fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = Some(delay);
        self
    }

    /// Make subsequent reads fail.
    pub fn fail_reads(&self, fail: bool) {
        self.shared.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent writes fail.
    pub fn fail_writes(&self, fail: bool) {
        self.shared.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `set` calls so far.
    pub fn write_count(&self) -> u64 {
        self.shared.writes.load(Ordering::SeqCst)
    }

    /// Read a value without going through the async contract.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Check if the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // A panic while holding the lock cannot leave the map half-written.
        self.shared
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> KvResult<Option<String>> {
        if self.shared.fail_reads.load(Ordering::SeqCst) {
            return Err(KvError::Store(format!("read of {key:?} refused")));
        }
        Ok(self.entries().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> KvResult<()> {
        if let Some(delay) = self.write_delay {
            tokio::time::sleep(delay).await;
        }
        if self.shared.fail_writes.load(Ordering::SeqCst) {
            return Err(KvError::Store(format!("write of {key:?} refused")));
        }
        self.entries().insert(key.to_string(), value.to_string());
        self.shared.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, key: &str) -> KvResult<()> {
        if self.shared.fail_writes.load(Ordering::SeqCst) {
            return Err(KvError::Store(format!("delete of {key:?} refused")));
        }
        self.entries().remove(key);
        Ok(())
    }
}
