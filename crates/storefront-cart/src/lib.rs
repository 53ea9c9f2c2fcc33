//! Persisted shopping cart state for the storefront shell.
//!
//! The cart is an ordered, id-unique list of line items held in memory and
//! mirrored in full to an on-device Key-Value store after every change.
//!
//! - [`Cart`] - the pure collection and its add/increment/decrement rules
//! - [`CartStore`] - shared handle: single-writer mutations, observers, persistence
//! - [`CartScope`] - mount/unmount lifecycle that hands out `CartStore`s
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use storefront_cart::prelude::*;
//! use storefront_kv::FileStore;
//!
//! let mut scope = CartScope::new();
//! scope.mount(Arc::new(FileStore::open(".storefront").await?), CartConfig::default()).await?;
//!
//! let cart = scope.cart()?;
//! cart.subscribe(|event| println!("cart v{}: {} items", event.version, event.cart.len()))?;
//! cart.add_to_cart(NewLineItem::new("p1", "Shoe", "https://img/p1.png", 10.0)).await?;
//! ```

pub mod cart;
pub mod codec;
pub mod config;
pub mod error;
pub mod ids;
pub mod item;
pub mod observer;
pub mod scope;
pub mod store;

pub use cart::{Cart, Change};
pub use config::{CartConfig, MissingItemPolicy, DEFAULT_STORAGE_KEY};
pub use error::{CartError, DecodeError, PersistenceError};
pub use ids::ProductId;
pub use item::{is_valid_price, LineItem, NewLineItem};
pub use observer::{CartEvent, SubscriptionId};
pub use scope::CartScope;
pub use store::{CartStore, Hydration};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::cart::{Cart, Change};
    pub use crate::config::{CartConfig, MissingItemPolicy};
    pub use crate::error::{CartError, PersistenceError};
    pub use crate::ids::ProductId;
    pub use crate::item::{LineItem, NewLineItem};
    pub use crate::observer::{CartEvent, SubscriptionId};
    pub use crate::scope::CartScope;
    pub use crate::store::{CartStore, Hydration};
}
