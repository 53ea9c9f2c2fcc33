//! Change notification for cart consumers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::cart::{Cart, Change};

/// Handle returned by [`crate::CartStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Delivered to observers after every in-memory update.
#[derive(Debug)]
pub struct CartEvent<'a> {
    /// Cart version after the update.
    pub version: u64,
    /// What happened.
    pub change: &'a Change,
    /// Cart contents after the update.
    pub cart: &'a Cart,
}

type Callback = Arc<dyn Fn(&CartEvent<'_>) + Send + Sync>;

#[derive(Default)]
pub(crate) struct Observers {
    next_id: AtomicU64,
    entries: Mutex<Vec<(SubscriptionId, Callback)>>,
}

impl Observers {
    pub(crate) fn subscribe(&self, callback: Callback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries().push((id, callback));
        id
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|(existing, _)| *existing != id);
        entries.len() < before
    }

    pub(crate) fn clear(&self) {
        self.entries().clear();
    }

    /// Call every observer in subscription order.
    ///
    /// The registry lock is released first so callbacks may read the store or
    /// (un)subscribe.
    pub(crate) fn notify(&self, event: &CartEvent<'_>) {
        let callbacks: Vec<Callback> = self.entries().iter().map(|(_, cb)| cb.clone()).collect();
        for callback in callbacks {
            callback(event);
        }
    }

    fn entries(&self) -> MutexGuard<'_, Vec<(SubscriptionId, Callback)>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
