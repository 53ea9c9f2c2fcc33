//! Stored snapshot format: a JSON array of
//! `{id, title, image_url, price, quantity}` objects.

use crate::cart::Cart;
use crate::error::{DecodeError, PersistenceError};
use crate::item::LineItem;

/// Encode the whole cart.
pub fn encode(cart: &Cart) -> Result<String, PersistenceError> {
    serde_json::to_string(cart).map_err(PersistenceError::Encode)
}

/// Decode a stored snapshot, validating cart invariants.
pub fn decode(raw: &str) -> Result<Cart, DecodeError> {
    let items: Vec<LineItem> = serde_json::from_str(raw)?;
    Cart::from_items(items)
}
