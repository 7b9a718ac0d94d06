//! Client-side shopping cart.
//!
//! A [`Cart`] maps an item name to a [`CartLine`]. The name is the only key:
//! there are no variants or SKUs, and a line's unit price is fixed by the
//! first add of that name.
//!
//! [`CartStore`] wraps a cart with an injected [`CartStorage`] and writes the
//! cart back after every mutation. [`CartView`] is the drawer rendered from the
//! current state.
//!
//! # Invariant
//!
//! Every stored line has `qty >= 1`. Decrementing a line to zero removes it,
//! and lines with a zero quantity are dropped when a cart is deserialized.

pub mod store;
pub mod view;

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Price;

pub use store::{CART_STORAGE_KEY, CartStorage, CartStore, MemoryStorage, StorageError};
pub use view::{CartRowView, CartView, RowAction};

/// One product entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Item name, also the line's key in the cart.
    pub name: String,
    /// Unit price in dollars.
    pub price: Price,
    /// Quantity, always at least 1 while the line is stored.
    pub qty: u32,
}

impl CartLine {
    /// Price of all units on this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.times(self.qty)
    }
}

/// Mapping of item name to cart line, serialized as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, CartLine>",
    into = "BTreeMap<String, CartLine>"
)]
pub struct Cart {
    lines: BTreeMap<String, CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lines: BTreeMap::new(),
        }
    }

    /// Add one unit of `name` at `price`.
    ///
    /// The name is trimmed; an empty name is rejected and nothing changes.
    /// When the line already exists its price is kept and only the quantity
    /// goes up.
    ///
    /// Returns `true` if the cart changed.
    pub fn add(&mut self, name: &str, price: Price) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }

        let line = self
            .lines
            .entry(name.to_string())
            .or_insert_with(|| CartLine {
                name: name.to_string(),
                price,
                qty: 0,
            });
        line.qty = line.qty.saturating_add(1);
        true
    }

    /// Increase the quantity of an existing line by one.
    ///
    /// Returns `false` if no line has that name.
    pub fn increment(&mut self, name: &str) -> bool {
        match self.lines.get_mut(name) {
            Some(line) => {
                line.qty = line.qty.saturating_add(1);
                true
            }
            None => false,
        }
    }

    /// Decrease the quantity of an existing line by one, removing it at zero.
    ///
    /// Returns `false` if no line has that name.
    pub fn decrement(&mut self, name: &str) -> bool {
        let Some(line) = self.lines.get_mut(name) else {
            return false;
        };
        line.qty = line.qty.saturating_sub(1);
        if line.qty == 0 {
            self.lines.remove(name);
        }
        true
    }

    /// Remove a line regardless of its quantity.
    pub fn remove(&mut self, name: &str) -> Option<CartLine> {
        self.lines.remove(name)
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Look up a line by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CartLine> {
        self.lines.get(name)
    }

    /// Iterate over lines ordered by name.
    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.values()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.lines.values().map(|line| u64::from(line.qty)).sum()
    }

    /// Sum of unit price times quantity across all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.values().map(CartLine::line_total).sum()
    }
}

impl From<BTreeMap<String, CartLine>> for Cart {
    fn from(mut lines: BTreeMap<String, CartLine>) -> Self {
        lines.retain(|_, line| line.qty > 0);
        Self { lines }
    }
}

impl From<Cart> for BTreeMap<String, CartLine> {
    fn from(cart: Cart) -> Self {
        cart.lines
    }
}
