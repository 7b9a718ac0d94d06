//! Cart drawer rendering.
//!
//! The drawer is rebuilt from scratch on every mutation. There is no diffing:
//! at a handful of lines a full render is cheap and always consistent with
//! the store.

use core::fmt;

use super::Cart;
use crate::types::price::format_whole_dollars;

/// Quantity control on a drawer row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    /// The "−" button.
    Decrease,
    /// The "+" button.
    Increase,
}

impl RowAction {
    /// Accessible label of the control.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Decrease => "Decrease quantity",
            Self::Increase => "Increase quantity",
        }
    }

    /// Glyph shown on the control.
    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Decrease => "−",
            Self::Increase => "+",
        }
    }
}

/// One rendered drawer row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartRowView {
    pub name: String,
    /// Unit price, e.g. `$25 each`.
    pub unit_price: String,
    pub quantity: u32,
    /// Controls attached to this row, each targeting `name`.
    pub actions: [RowAction; 2],
}

/// The rendered cart drawer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub rows: Vec<CartRowView>,
    /// Badge count: total units.
    pub count: u64,
    /// Formatted total, e.g. `$50`.
    pub total: String,
    /// Whether the "empty" indicator is shown.
    pub empty: bool,
}

impl CartView {
    /// Render the drawer for `cart`.
    #[must_use]
    pub fn render(cart: &Cart) -> Self {
        let rows = cart
            .lines()
            .map(|line| CartRowView {
                name: line.name.clone(),
                unit_price: format!("{} each", format_whole_dollars(line.price.amount())),
                quantity: line.qty,
                actions: [RowAction::Decrease, RowAction::Increase],
            })
            .collect::<Vec<_>>();

        Self {
            empty: rows.is_empty(),
            rows,
            count: cart.count(),
            total: format_whole_dollars(cart.total()),
        }
    }
}

impl fmt::Display for CartView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cart ({})", self.count)?;
        if self.empty {
            writeln!(f, "  Your cart is empty.")?;
        }
        for row in &self.rows {
            let [dec, inc] = row.actions;
            writeln!(
                f,
                "  {}  {}  [{}] {} [{}]",
                row.name,
                row.unit_price,
                dec.glyph(),
                row.quantity,
                inc.glyph()
            )?;
        }
        write!(f, "Total: {}", self.total)
    }
}
