//! Cart error types.

use std::time::Duration;

use storefront_kv::KvError;
use thiserror::Error;

use crate::ids::ProductId;

/// Errors surfaced by cart operations.
///
/// In-memory quantity arithmetic never fails; only the persistence boundary,
/// scope misuse and an explicit not-found policy produce errors.
#[derive(Error, Debug)]
pub enum CartError {
    /// The handle was used before its scope was mounted or after it was
    /// unmounted.
    #[error("accessor used outside an active Cart Store scope")]
    Misuse,

    /// The in-memory cart was updated but could not be made durable.
    ///
    /// The in-memory cart stays authoritative; [`crate::CartStore::flush`]
    /// retries the write.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// Item not in cart (only under [`crate::MissingItemPolicy::Reject`]).
    #[error("Item not in cart: {0}")]
    ItemNotInCart(ProductId),

    /// The item's price is NaN, infinite or negative and cannot be stored.
    #[error("Invalid price for {id}: {price}")]
    InvalidPrice { id: ProductId, price: f64 },

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Failure talking to the Key-Value store.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Reading the stored snapshot failed.
    #[error("failed to read cart snapshot: {0}")]
    Read(#[source] KvError),

    /// Writing the snapshot failed.
    #[error("failed to write cart snapshot: {0}")]
    Write(#[source] KvError),

    /// The cart could not be encoded.
    #[error("failed to encode cart snapshot: {0}")]
    Encode(#[source] serde_json::Error),

    /// The store did not answer in time.
    #[error("cart storage timed out after {0:?}")]
    Timeout(Duration),
}

/// A stored snapshot that does not describe a valid cart.
///
/// Never escapes hydration: a corrupt snapshot is treated as absent.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Not a JSON array of line items.
    #[error("malformed cart snapshot: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A line item with quantity zero.
    #[error("line item {0} has quantity 0")]
    ZeroQuantity(ProductId),

    /// A line item whose price is not a finite, non-negative number.
    #[error("line item {0} has an invalid price")]
    InvalidPrice(ProductId),

    /// Two line items share an id.
    #[error("duplicate line item {0}")]
    DuplicateId(ProductId),
}
