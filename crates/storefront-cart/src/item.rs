//! Line item types.

use serde::{Deserialize, Serialize};

use crate::ids::ProductId;

/// Whether `price` can be stored: finite and not negative.
pub fn is_valid_price(price: f64) -> bool {
    price.is_finite() && price >= 0.0
}

/// A purchasable item as offered to [`crate::Cart::add`], without a quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLineItem {
    /// Product identifier.
    pub id: ProductId,
    /// Display name.
    pub title: String,
    /// Display asset reference.
    pub image_url: String,
    /// Unit price.
    pub price: f64,
}

impl NewLineItem {
    /// Create a new item descriptor.
    pub fn new(
        id: impl Into<ProductId>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }
}

/// A line item in the cart. `quantity` is at least 1 while the item is in a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product identifier.
    pub id: ProductId,
    /// Display name.
    pub title: String,
    /// Display asset reference.
    pub image_url: String,
    /// Unit price.
    pub price: f64,
    /// Quantity.
    pub quantity: u32,
}

impl LineItem {
    /// Unit price times quantity, for display.
    pub fn subtotal(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

impl From<NewLineItem> for LineItem {
    fn from(item: NewLineItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            image_url: item.image_url,
            price: item.price,
            quantity: 1,
        }
    }
}
