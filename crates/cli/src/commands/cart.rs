//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! loops cart add "Crochet Bunny" 25
//! loops cart add-product bunny
//! loops cart inc "Crochet Bunny"
//! loops cart dec "Crochet Bunny"
//! loops cart remove "Crochet Bunny"
//! loops cart show
//! loops cart clear
//! ```
//!
//! Every command prints the cart drawer afterwards.

use std::io::Write;

use alyssa_loops_core::cart::{CartStorage, CartStore, RowAction};
use alyssa_loops_core::catalog::Catalog;

use super::CommandError;

/// Print the cart drawer.
///
/// # Errors
///
/// Returns error if output cannot be written.
pub fn show<S: CartStorage, W: Write>(store: &CartStore<S>, out: &mut W) -> Result<(), CommandError> {
    writeln!(out, "{}", store.view())?;
    Ok(())
}

/// Add one unit of `name` at `price`.
///
/// # Errors
///
/// Returns error if the cart cannot be saved or output cannot be written.
pub fn add<S: CartStorage, W: Write>(
    store: &mut CartStore<S>,
    name: &str,
    price: &str,
    out: &mut W,
) -> Result<(), CommandError> {
    if store.add(name, price)? {
        writeln!(out, "Added {}", name.trim())?;
    } else {
        writeln!(out, "Nothing added: name must be non-empty and price a non-negative number.")?;
    }
    show(store, out)
}

/// Add one unit of catalog product `id`.
///
/// # Errors
///
/// Returns error if the id is unknown, the cart cannot be saved or output
/// cannot be written.
pub fn add_product<S: CartStorage, W: Write>(
    store: &mut CartStore<S>,
    catalog: &Catalog,
    id: &str,
    out: &mut W,
) -> Result<(), CommandError> {
    let product = catalog.add_to_cart(id, store)?;
    writeln!(out, "Added {}", product.name)?;
    show(store, out)
}

/// Apply a quantity control to the line `name`.
///
/// # Errors
///
/// Returns error if the cart cannot be saved or output cannot be written.
pub fn adjust<S: CartStorage, W: Write>(
    store: &mut CartStore<S>,
    name: &str,
    action: RowAction,
    out: &mut W,
) -> Result<(), CommandError> {
    if !store.apply(name, action)? {
        writeln!(out, "No cart line named {name:?}")?;
    }
    show(store, out)
}

/// Remove the line `name`.
///
/// # Errors
///
/// Returns error if the cart cannot be saved or output cannot be written.
pub fn remove<S: CartStorage, W: Write>(
    store: &mut CartStore<S>,
    name: &str,
    out: &mut W,
) -> Result<(), CommandError> {
    match store.remove(name)? {
        Some(line) => writeln!(out, "Removed {}", line.name)?,
        None => writeln!(out, "No cart line named {name:?}")?,
    }
    show(store, out)
}

/// Empty the cart.
///
/// # Errors
///
/// Returns error if the cart cannot be saved or output cannot be written.
pub fn clear<S: CartStorage, W: Write>(
    store: &mut CartStore<S>,
    out: &mut W,
) -> Result<(), CommandError> {
    store.clear()?;
    show(store, out)
}
