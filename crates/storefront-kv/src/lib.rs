//! Asynchronous on-device Key-Value storage for the storefront.
//!
//! Values are opaque strings stored under a name. Two backends are provided:
//!
//! - [`MemoryStore`] - process-local map with failure and latency hooks
//! - [`FileStore`] - one file per key, atomically replaced on every write
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront_kv::{FileStore, KeyValueStore};
//!
//! let store = FileStore::open(".storefront").await?;
//! store.set("products", "[]").await?;
//! let raw: Option<String> = store.get("products").await?;
//! ```

mod error;
mod file;
mod memory;
mod store;

pub use error::{KvError, KvResult};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::KeyValueStore;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{FileStore, KeyValueStore, KvError, MemoryStore};
}
