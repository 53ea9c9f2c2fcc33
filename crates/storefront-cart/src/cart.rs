//! Cart collection and its mutations.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::DecodeError;
use crate::ids::ProductId;
use crate::item::{is_valid_price, LineItem, NewLineItem};

/// What a single cart operation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// A new line was appended with quantity 1.
    Added(ProductId),
    /// An existing line's quantity went up.
    Incremented { id: ProductId, quantity: u32 },
    /// An existing line's quantity went down and the line stayed.
    Decremented { id: ProductId, quantity: u32 },
    /// The line reached quantity 0 and was dropped.
    Removed(ProductId),
    /// No line with this id; the cart is unchanged.
    Missing(ProductId),
    /// The cart was replaced by a stored snapshot (emitted by
    /// [`crate::CartStore`] only).
    Hydrated { items: usize },
}

impl Change {
    /// Check if the operation targeted an id that is not in the cart.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing(_))
    }
}

/// Ordered, id-unique list of line items.
///
/// New lines are appended; no operation reorders existing lines. Serializes
/// as a bare JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from stored lines, checking quantity, price and id uniqueness.
    pub fn from_items(items: Vec<LineItem>) -> Result<Self, DecodeError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if item.quantity == 0 {
                return Err(DecodeError::ZeroQuantity(item.id.clone()));
            }
            if !is_valid_price(item.price) {
                return Err(DecodeError::InvalidPrice(item.id.clone()));
            }
            if !seen.insert(&item.id) {
                return Err(DecodeError::DuplicateId(item.id.clone()));
            }
        }
        Ok(Self { items })
    }

    /// Add an item: bump the existing line, or append a new one at quantity 1.
    pub fn add(&mut self, item: NewLineItem) -> Change {
        if self.get(&item.id).is_some() {
            return self.increment(&item.id);
        }
        let id = item.id.clone();
        self.items.push(item.into());
        Change::Added(id)
    }

    /// Increase the quantity of a line by one.
    pub fn increment(&mut self, id: &ProductId) -> Change {
        match self.items.iter_mut().find(|i| &i.id == id) {
            Some(line) => {
                line.quantity = line.quantity.saturating_add(1);
                Change::Incremented {
                    id: id.clone(),
                    quantity: line.quantity,
                }
            }
            None => Change::Missing(id.clone()),
        }
    }

    /// Decrease the quantity of a line by one, dropping it at zero.
    pub fn decrement(&mut self, id: &ProductId) -> Change {
        let Some(pos) = self.items.iter().position(|i| &i.id == id) else {
            return Change::Missing(id.clone());
        };

        let line = &mut self.items[pos];
        if line.quantity <= 1 {
            self.items.remove(pos);
            Change::Removed(id.clone())
        } else {
            line.quantity -= 1;
            Change::Decremented {
                id: id.clone(),
                quantity: line.quantity,
            }
        }
    }

    /// Get a line by product id.
    pub fn get(&self, id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|i| &i.id == id)
    }

    /// Lines in cart order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Iterate over lines in cart order.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter()
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all quantities.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Consume the cart, returning its lines.
    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
