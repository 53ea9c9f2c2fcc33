//! Persisted cart state shared by every consumer of one cart.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use storefront_kv::{KeyValueStore, KvError, KvResult};
use tokio::sync::Mutex;
use tokio::task::{JoinError, JoinHandle};

use crate::cart::{Cart, Change};
use crate::codec;
use crate::config::{CartConfig, MissingItemPolicy};
use crate::error::{CartError, PersistenceError};
use crate::ids::ProductId;
use crate::item::{is_valid_price, NewLineItem};
use crate::observer::{CartEvent, Observers, SubscriptionId};

/// Result of [`CartStore::initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hydration {
    /// A stored snapshot replaced the empty cart.
    Restored { items: usize },
    /// Nothing was stored under the key.
    Empty,
    /// The stored snapshot was corrupt and ignored.
    Discarded,
    /// The cart was mutated before hydration ran; the in-memory cart was kept.
    Superseded,
    /// Hydration already happened.
    AlreadyHydrated,
}

#[derive(Default)]
struct CartState {
    cart: Cart,
    version: u64,
}

/// A store write that outlived its timeout and may still land.
type PendingWrite = JoinHandle<KvResult<()>>;

struct Inner {
    store: Arc<dyn KeyValueStore>,
    config: CartConfig,
    state: RwLock<CartState>,
    /// Held for the whole of every mutation, persistence write included.
    /// Holds the write that last timed out until it has finished.
    writer: Mutex<Option<PendingWrite>>,
    observers: Observers,
    active: AtomicBool,
    hydrated: AtomicBool,
    synced: AtomicBool,
}

/// Handle to the authoritative in-memory cart and its persisted mirror.
///
/// Clones share the same cart. Mutations are applied one at a time: each one
/// updates memory, notifies observers, and writes the whole cart to the
/// store before the next mutation starts. A snapshot taken while a write is
/// still in flight already reflects that mutation.
///
/// # Example
///
/// ```rust,ignore
/// let cart = CartStore::with_store(MemoryStore::new(), CartConfig::default());
/// cart.initialize().await?;
/// cart.add_to_cart(NewLineItem::new("p1", "Shoe", "u", 10.0)).await?;
/// assert_eq!(cart.snapshot()?.item_count(), 1);
/// ```
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read_state();
        f.debug_struct("CartStore")
            .field("storage_key", &self.inner.config.storage_key)
            .field("version", &state.version)
            .field("items", &state.cart.len())
            .field("active", &self.is_active())
            .finish()
    }
}

impl CartStore {
    /// Create an empty, active cart backed by `store`.
    pub fn new(store: Arc<dyn KeyValueStore>, config: CartConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                config,
                state: RwLock::new(CartState::default()),
                writer: Mutex::new(None),
                observers: Observers::default(),
                active: AtomicBool::new(true),
                hydrated: AtomicBool::new(false),
                synced: AtomicBool::new(true),
            }),
        }
    }

    /// Create a cart from a concrete store.
    pub fn with_store<S: KeyValueStore + 'static>(store: S, config: CartConfig) -> Self {
        Self::new(Arc::new(store), config)
    }

    /// The configuration this cart was built with.
    pub fn config(&self) -> &CartConfig {
        &self.inner.config
    }

    /// Load the stored snapshot, once.
    ///
    /// A corrupt snapshot is logged and treated as absent. A failed read
    /// leaves the cart empty and unhydrated, so the call can be retried.
    pub async fn initialize(&self) -> Result<Hydration, CartError> {
        self.ensure_active()?;
        let _writer = self.inner.writer.lock().await;
        self.ensure_active()?;

        if self.inner.hydrated.load(Ordering::SeqCst) {
            return Ok(Hydration::AlreadyHydrated);
        }

        let key = &self.inner.config.storage_key;
        let raw = with_timeout(self.inner.config.persist_timeout(), self.inner.store.get(key))
            .await?
            .map_err(PersistenceError::Read)?;
        self.inner.hydrated.store(true, Ordering::SeqCst);

        let Some(raw) = raw else {
            tracing::info!(key = %key, "no stored cart");
            return Ok(Hydration::Empty);
        };

        let restored = match codec::decode(&raw) {
            Ok(cart) => cart,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "discarding corrupt cart snapshot");
                return Ok(Hydration::Discarded);
            }
        };

        let (cart, version) = {
            let mut state = self.write_state();
            if state.version > 0 {
                tracing::info!(key = %key, version = state.version, "cart changed before hydration");
                return Ok(Hydration::Superseded);
            }
            state.cart = restored;
            state.version += 1;
            (state.cart.clone(), state.version)
        };

        let items = cart.len();
        tracing::info!(key = %key, items, "restored cart");
        let change = Change::Hydrated { items };
        self.inner.observers.notify(&CartEvent {
            version,
            change: &change,
            cart: &cart,
        });
        Ok(Hydration::Restored { items })
    }

    /// Add an item, bumping the quantity if its id is already in the cart.
    ///
    /// An item whose price is NaN, infinite or negative is rejected with
    /// [`CartError::InvalidPrice`]; the cart is not touched or written.
    pub async fn add_to_cart(&self, item: NewLineItem) -> Result<Change, CartError> {
        self.ensure_active()?;
        if !is_valid_price(item.price) {
            return Err(CartError::InvalidPrice {
                id: item.id,
                price: item.price,
            });
        }
        self.mutate(|cart| cart.add(item)).await
    }

    /// Increase the quantity of a line by one.
    pub async fn increment(&self, id: &ProductId) -> Result<Change, CartError> {
        self.mutate(|cart| cart.increment(id)).await
    }

    /// Decrease the quantity of a line by one, removing it at zero.
    pub async fn decrement(&self, id: &ProductId) -> Result<Change, CartError> {
        self.mutate(|cart| cart.decrement(id)).await
    }

    /// Write the current cart again, e.g. after a [`CartError::Persistence`].
    pub async fn flush(&self) -> Result<(), CartError> {
        self.ensure_active()?;
        let mut writer = self.inner.writer.lock().await;
        self.ensure_active()?;

        let (cart, version) = {
            let state = self.read_state();
            (state.cart.clone(), state.version)
        };
        self.persist(&mut writer, &cart, version).await
    }

    /// Current cart contents.
    pub fn snapshot(&self) -> Result<Cart, CartError> {
        self.ensure_active()?;
        Ok(self.read_state().cart.clone())
    }

    /// Monotonic version, bumped by every mutation and by hydration.
    pub fn version(&self) -> Result<u64, CartError> {
        self.ensure_active()?;
        Ok(self.read_state().version)
    }

    /// Whether the last write reached the store.
    pub fn is_synced(&self) -> bool {
        self.inner.synced.load(Ordering::SeqCst)
    }

    /// Whether the owning scope is still mounted.
    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Register `callback` to run after every in-memory update.
    ///
    /// Callbacks run synchronously on the mutating task, before the store
    /// write starts.
    pub fn subscribe<F>(&self, callback: F) -> Result<SubscriptionId, CartError>
    where
        F: Fn(&CartEvent<'_>) + Send + Sync + 'static,
    {
        self.ensure_active()?;
        Ok(self.inner.observers.subscribe(Arc::new(callback)))
    }

    /// Remove an observer. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.observers.unsubscribe(id)
    }

    /// Detach every handle from the cart. Called when the owning scope unmounts.
    pub(crate) fn deactivate(&self) {
        if self.inner.active.swap(false, Ordering::SeqCst) {
            self.inner.observers.clear();
            tracing::debug!(key = %self.inner.config.storage_key, "cart store deactivated");
        }
    }

    async fn mutate<F>(&self, op: F) -> Result<Change, CartError>
    where
        F: FnOnce(&mut Cart) -> Change,
    {
        self.ensure_active()?;
        let mut writer = self.inner.writer.lock().await;
        self.ensure_active()?;

        let (change, cart, version) = {
            let mut state = self.write_state();
            let change = op(&mut state.cart);
            if let Change::Missing(id) = &change {
                if self.inner.config.missing_item == MissingItemPolicy::Reject {
                    return Err(CartError::ItemNotInCart(id.clone()));
                }
            }
            state.version += 1;
            (change, state.cart.clone(), state.version)
        };

        tracing::debug!(?change, version, "cart updated");
        self.inner.observers.notify(&CartEvent {
            version,
            change: &change,
            cart: &cart,
        });

        self.persist(&mut writer, &cart, version).await?;
        Ok(change)
    }

    async fn persist(
        &self,
        pending: &mut Option<PendingWrite>,
        cart: &Cart,
        version: u64,
    ) -> Result<(), CartError> {
        match self.write_snapshot(pending, cart).await {
            Ok(()) => {
                self.inner.synced.store(true, Ordering::SeqCst);
                tracing::debug!(version, items = cart.len(), "cart persisted");
                Ok(())
            }
            Err(e) => {
                self.inner.synced.store(false, Ordering::SeqCst);
                tracing::warn!(version, error = %e, "cart not persisted");
                Err(e.into())
            }
        }
    }

    /// Write the whole cart.
    ///
    /// The write runs as its own task so a timeout does not cancel it halfway.
    /// A write that timed out is kept in `pending` and waited for before the
    /// next one starts, so an older cart can never land after a newer one.
    async fn write_snapshot(
        &self,
        pending: &mut Option<PendingWrite>,
        cart: &Cart,
    ) -> Result<(), PersistenceError> {
        let limit = self.inner.config.persist_timeout();

        if let Some(mut stale) = pending.take() {
            match with_timeout(limit, &mut stale).await {
                Ok(result) => {
                    if let Err(e) = joined(result) {
                        tracing::debug!(error = %e, "timed out write finished with an error");
                    }
                }
                Err(e) => {
                    *pending = Some(stale);
                    return Err(e);
                }
            }
        }

        let raw = codec::encode(cart)?;
        let store = self.inner.store.clone();
        let key = self.inner.config.storage_key.clone();
        let mut write = tokio::spawn(async move { store.set(&key, &raw).await });

        match with_timeout(limit, &mut write).await {
            Ok(result) => joined(result).map_err(PersistenceError::Write),
            Err(e) => {
                *pending = Some(write);
                Err(e)
            }
        }
    }

    fn ensure_active(&self) -> Result<(), CartError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(CartError::Misuse)
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, CartState> {
        self.inner
            .state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, CartState> {
        self.inner
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn joined(result: Result<KvResult<()>, JoinError>) -> KvResult<()> {
    result.unwrap_or_else(|e| Err(KvError::Store(format!("write task failed: {}", e))))
}

async fn with_timeout<F: Future>(
    limit: Option<Duration>,
    fut: F,
) -> Result<F::Output, PersistenceError> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| PersistenceError::Timeout(limit)),
        None => Ok(fut.await),
    }
}
