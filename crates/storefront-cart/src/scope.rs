//! Provider lifecycle around a [`CartStore`].

use std::sync::Arc;

use storefront_kv::KeyValueStore;

use crate::config::CartConfig;
use crate::error::CartError;
use crate::store::{CartStore, Hydration};

/// Lifecycle boundary that builds, hands out, and tears down one cart.
///
/// Handles obtained from [`CartScope::cart`] stop working once the scope is
/// unmounted or dropped: every operation on them then fails with
/// [`CartError::Misuse`]. Unmounting does not flush; the last mutation has
/// already written the full cart.
///
/// # Example
///
/// ```rust,ignore
/// let mut scope = CartScope::new();
/// scope.mount(Arc::new(FileStore::open(".storefront").await?), CartConfig::default()).await?;
///
/// let cart = scope.cart()?;
/// cart.increment(&"p1".into()).await?;
///
/// scope.unmount();
/// assert!(cart.snapshot().is_err());
/// ```
#[derive(Debug, Default)]
pub struct CartScope {
    active: Option<CartStore>,
}

impl CartScope {
    /// Create an unmounted scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart over `store` and hydrate it.
    ///
    /// Any previously mounted cart is unmounted first. The scope stays mounted
    /// with an empty cart when hydration fails, and
    /// [`CartStore::initialize`] can be retried through [`CartScope::cart`].
    pub async fn mount(
        &mut self,
        store: Arc<dyn KeyValueStore>,
        config: CartConfig,
    ) -> Result<Hydration, CartError> {
        config.validate()?;
        self.unmount();

        let cart = CartStore::new(store, config);
        self.active = Some(cart.clone());
        tracing::debug!(key = %cart.config().storage_key, "cart scope mounted");
        cart.initialize().await
    }

    /// The mounted cart.
    pub fn cart(&self) -> Result<CartStore, CartError> {
        self.active.clone().ok_or(CartError::Misuse)
    }

    /// Whether a cart is mounted.
    pub fn is_mounted(&self) -> bool {
        self.active.is_some()
    }

    /// Tear down the mounted cart. Returns `false` if nothing was mounted.
    pub fn unmount(&mut self) -> bool {
        match self.active.take() {
            Some(cart) => {
                cart.deactivate();
                true
            }
            None => false,
        }
    }
}

impl Drop for CartScope {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_kv::MemoryStore;

    #[test]
    fn test_unmounted_scope_is_misuse() {
        let scope = CartScope::new();
        assert!(!scope.is_mounted());
        assert!(matches!(scope.cart(), Err(CartError::Misuse)));
    }

    #[tokio::test]
    async fn test_mount_rejects_invalid_config() {
        let mut scope = CartScope::new();
        let result = scope
            .mount(Arc::new(MemoryStore::new()), CartConfig::new().with_storage_key(""))
            .await;

        assert!(matches!(result, Err(CartError::Config(_))));
        assert!(!scope.is_mounted());
    }

    #[tokio::test]
    async fn test_remount_detaches_previous_cart() {
        let mut scope = CartScope::new();
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());

        scope.mount(store.clone(), CartConfig::default()).await.unwrap();
        let first = scope.cart().unwrap();

        scope.mount(store, CartConfig::default()).await.unwrap();
        assert!(!first.is_active());
        assert!(scope.cart().unwrap().is_active());
    }

    #[tokio::test]
    async fn test_drop_deactivates_handles() {
        let cart = {
            let mut scope = CartScope::new();
            scope
                .mount(Arc::new(MemoryStore::new()), CartConfig::default())
                .await
                .unwrap();
            scope.cart().unwrap()
        };

        assert!(matches!(cart.version(), Err(CartError::Misuse)));
    }
}
