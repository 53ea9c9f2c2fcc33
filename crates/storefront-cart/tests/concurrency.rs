//! Overlapping mutations on one cart.
//!
//! Mutations are serialized through a single writer, so overlapping calls
//! never lose each other's updates.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use storefront_cart::codec;
use storefront_cart::prelude::*;
use storefront_kv::{KeyValueStore, KvError, KvResult, MemoryStore};

fn item(id: &str) -> NewLineItem {
    NewLineItem::new(id, format!("Item {id}"), format!("img/{id}"), 1.0)
}

fn stored(kv: &MemoryStore) -> Cart {
    codec::decode(&kv.peek("products").unwrap()).unwrap()
}

#[tokio::test(start_paused = true)]
async fn concurrent_adds_of_different_items_are_not_lost() {
    let kv = MemoryStore::new().with_write_delay(Duration::from_millis(20));
    let cart = CartStore::with_store(kv.clone(), CartConfig::default());

    let (a, b) = tokio::join!(cart.add_to_cart(item("p1")), cart.add_to_cart(item("p2")));
    a.unwrap();
    b.unwrap();

    let snapshot = cart.snapshot().unwrap();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(stored(&kv), snapshot);
    assert_eq!(kv.write_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn concurrent_adds_of_same_item_accumulate() {
    let kv = MemoryStore::new().with_write_delay(Duration::from_millis(5));
    let cart = CartStore::with_store(kv.clone(), CartConfig::default());

    let results = join_all((0..10).map(|_| cart.add_to_cart(item("p1")))).await;
    assert!(results.iter().all(Result::is_ok));

    let snapshot = cart.snapshot().unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.items()[0].quantity, 10);
    assert_eq!(stored(&kv).items()[0].quantity, 10);
    assert_eq!(cart.version().unwrap(), 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn spawned_tasks_from_many_handles_are_serialized() {
    let kv = MemoryStore::new();
    let cart = CartStore::with_store(kv.clone(), CartConfig::default());
    cart.add_to_cart(item("p1")).await.unwrap();

    let tasks: Vec<_> = (0..50)
        .map(|n| {
            let cart = cart.clone();
            tokio::spawn(async move {
                if n % 2 == 0 {
                    cart.increment(&"p1".into()).await
                } else {
                    cart.add_to_cart(item("p1")).await
                }
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(cart.snapshot().unwrap().items()[0].quantity, 51);
    assert_eq!(stored(&kv).items()[0].quantity, 51);
    assert_eq!(kv.write_count(), 51);
}

#[tokio::test(start_paused = true)]
async fn snapshot_reflects_mutation_while_write_is_in_flight() {
    let kv = MemoryStore::new().with_write_delay(Duration::from_secs(1));
    let cart = CartStore::with_store(kv.clone(), CartConfig::default());

    let task = tokio::spawn({
        let cart = cart.clone();
        async move { cart.add_to_cart(item("p1")).await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(cart.snapshot().unwrap().len(), 1);
    assert_eq!(kv.write_count(), 0);
    assert!(kv.peek("products").is_none());

    task.await.unwrap().unwrap();
    assert_eq!(kv.write_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn last_write_matches_final_cart() {
    let kv = MemoryStore::new().with_write_delay(Duration::from_millis(3));
    let cart = CartStore::with_store(kv.clone(), CartConfig::default());
    let p1 = ProductId::new("p1");

    let (a, b, c) = tokio::join!(
        cart.add_to_cart(item("p1")),
        cart.add_to_cart(item("p2")),
        cart.decrement(&p1),
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();

    assert_eq!(stored(&kv), cart.snapshot().unwrap());
}

/// Store whose writes run on a detached task, the way blocking file I/O
/// does, so dropping the `set` future does not stop the write.
struct DetachedWrites {
    inner: MemoryStore,
    delays: Mutex<VecDeque<Duration>>,
}

impl DetachedWrites {
    fn new(inner: MemoryStore, delays: impl IntoIterator<Item = Duration>) -> Self {
        Self {
            inner,
            delays: Mutex::new(delays.into_iter().collect()),
        }
    }
}

#[async_trait]
impl KeyValueStore for DetachedWrites {
    async fn get(&self, key: &str) -> KvResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> KvResult<()> {
        let delay = self
            .delays
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Duration::from_millis(1));
        let inner = self.inner.clone();
        let (key, value) = (key.to_string(), value.to_string());
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            inner.set(&key, &value).await
        })
        .await
        .map_err(|e| KvError::Store(e.to_string()))?
    }

    async fn delete(&self, key: &str) -> KvResult<()> {
        self.inner.delete(key).await
    }
}

fn timing_out_after(kv: &MemoryStore, delays: &[u64]) -> CartStore {
    let store = DetachedWrites::new(kv.clone(), delays.iter().map(|ms| Duration::from_millis(*ms)));
    let config = CartConfig::default().with_persist_timeout(Some(Duration::from_millis(100)));
    CartStore::new(Arc::new(store), config)
}

#[tokio::test(start_paused = true)]
async fn next_write_waits_for_timed_out_write() {
    let kv = MemoryStore::new();
    let cart = timing_out_after(&kv, &[150]);

    assert!(matches!(
        cart.add_to_cart(item("p1")).await,
        Err(CartError::Persistence(PersistenceError::Timeout(_)))
    ));
    cart.add_to_cart(item("p2")).await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(stored(&kv), cart.snapshot().unwrap());
    assert_eq!(stored(&kv).len(), 2);
    assert_eq!(kv.write_count(), 2);
    assert!(cart.is_synced());
}

#[tokio::test(start_paused = true)]
async fn stale_write_never_lands_after_newer_one() {
    let kv = MemoryStore::new();
    let cart = timing_out_after(&kv, &[500]);

    assert!(cart.add_to_cart(item("p1")).await.is_err());
    // Still waiting on the first write, so the second one is not started.
    assert!(matches!(
        cart.add_to_cart(item("p2")).await,
        Err(CartError::Persistence(PersistenceError::Timeout(_)))
    ));
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(kv.write_count(), 1);
    assert_eq!(stored(&kv).len(), 1);
    assert!(!cart.is_synced());

    cart.flush().await.unwrap();

    assert_eq!(stored(&kv), cart.snapshot().unwrap());
    assert_eq!(stored(&kv).len(), 2);
    assert!(cart.is_synced());
}
