//! Persisted cart store.
//!
//! The storefront has no server-side cart: the browser tab owns it and keeps
//! it under a single storage key. [`CartStore`] reproduces that contract with
//! the storage injected, so the same state machine runs against browser-like
//! storage, a file on disk, or [`MemoryStorage`] in tests.

use std::collections::HashMap;

use thiserror::Error;

use super::view::{CartView, RowAction};
use super::{Cart, CartLine};
use crate::types::Price;

/// Storage key holding the JSON-serialized cart.
pub const CART_STORAGE_KEY: &str = "crochet_cart";

/// Errors raised by a [`CartStorage`] backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing medium failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The cart could not be serialized.
    #[error("failed to serialize cart: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Durable key-value storage for the cart, in the shape of `localStorage`.
pub trait CartStorage {
    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory storage. Counts writes so tests can assert persistence.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    writes: usize,
}

impl MemoryStorage {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage pre-populated with one entry.
    #[must_use]
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.to_string(), value.to_string());
        Self { entries, writes: 0 }
    }

    /// Raw value under `key`, if any.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of `set`/`remove` calls performed.
    #[must_use]
    pub const fn writes(&self) -> usize {
        self.writes
    }
}

impl CartStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        self.writes += 1;
        Ok(())
    }
}

/// A cart mirrored to durable storage on every mutation.
#[derive(Debug)]
pub struct CartStore<S> {
    cart: Cart,
    storage: S,
}

impl<S: CartStorage> CartStore<S> {
    /// Load the cart from `storage`.
    ///
    /// A missing entry yields an empty cart. A corrupt entry is logged and
    /// also yields an empty cart; it is overwritten on the next mutation.
    ///
    /// # Errors
    ///
    /// Returns an error only if the storage itself cannot be read.
    pub fn load(storage: S) -> Result<Self, StorageError> {
        let cart = match storage.get(CART_STORAGE_KEY)? {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Stored cart is not valid JSON, starting empty");
                Cart::new()
            }),
            None => Cart::new(),
        };

        Ok(Self { cart, storage })
    }

    /// Current cart state.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The storage backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Add one unit of `name`, coercing `raw_price` to a number.
    ///
    /// Invalid input is rejected silently: an empty name or a price that is
    /// not a finite, non-negative number leaves the cart and storage untouched
    /// and returns `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting the updated cart fails.
    pub fn add(&mut self, name: &str, raw_price: &str) -> Result<bool, StorageError> {
        match Price::parse(raw_price) {
            Ok(price) => self.add_priced(name, price),
            Err(e) => {
                tracing::debug!(name, raw_price, error = %e, "Ignoring add with invalid price");
                Ok(false)
            }
        }
    }

    /// Add one unit of `name` at an already validated price.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting the updated cart fails.
    pub fn add_priced(&mut self, name: &str, price: Price) -> Result<bool, StorageError> {
        let changed = self.cart.add(name, price);
        self.persist_if(changed)
    }

    /// Increase a line's quantity by one.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting the updated cart fails.
    pub fn increment(&mut self, name: &str) -> Result<bool, StorageError> {
        let changed = self.cart.increment(name);
        self.persist_if(changed)
    }

    /// Decrease a line's quantity by one, deleting it at zero.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting the updated cart fails.
    pub fn decrement(&mut self, name: &str) -> Result<bool, StorageError> {
        let changed = self.cart.decrement(name);
        self.persist_if(changed)
    }

    /// Remove a line entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting the updated cart fails.
    pub fn remove(&mut self, name: &str) -> Result<Option<CartLine>, StorageError> {
        let removed = self.cart.remove(name);
        self.persist_if(removed.is_some())?;
        Ok(removed)
    }

    /// Apply a drawer row control to the named line.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting the updated cart fails.
    pub fn apply(&mut self, name: &str, action: RowAction) -> Result<bool, StorageError> {
        match action {
            RowAction::Decrease => self.decrement(name),
            RowAction::Increase => self.increment(name),
        }
    }

    /// Empty the cart and delete its storage entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage entry cannot be removed.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.cart.clear();
        self.storage.remove(CART_STORAGE_KEY)
    }

    /// Total number of units.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.cart.count()
    }

    /// Sum of price times quantity.
    #[must_use]
    pub fn total(&self) -> rust_decimal::Decimal {
        self.cart.total()
    }

    /// Render the drawer for the current state.
    #[must_use]
    pub fn view(&self) -> CartView {
        CartView::render(&self.cart)
    }

    fn persist_if(&mut self, changed: bool) -> Result<bool, StorageError> {
        if changed {
            let raw = serde_json::to_string(&self.cart)?;
            self.storage.set(CART_STORAGE_KEY, &raw)?;
        }
        Ok(changed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn empty_store() -> CartStore<MemoryStorage> {
        CartStore::load(MemoryStorage::new()).unwrap()
    }

    #[test]
    fn test_load_missing_entry_is_empty() {
        let store = empty_store();
        assert!(store.cart().is_empty());
        assert_eq!(store.count(), 0);
        assert_eq!(store.total(), Decimal::ZERO);
    }

    #[test]
    fn test_load_corrupt_entry_is_empty() {
        let storage = MemoryStorage::with_entry(CART_STORAGE_KEY, "{not json");
        let store = CartStore::load(storage).unwrap();
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_load_existing_cart() {
        let storage = MemoryStorage::with_entry(
            CART_STORAGE_KEY,
            r#"{"Bunny":{"name":"Bunny","price":25,"qty":3}}"#,
        );
        let store = CartStore::load(storage).unwrap();
        assert_eq!(store.count(), 3);
        assert_eq!(store.total(), Decimal::from(75));
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let mut store = empty_store();

        assert!(store.add("Bunny", "25").unwrap());
        assert_eq!(store.storage().writes(), 1);
        assert!(store.increment("Bunny").unwrap());
        assert_eq!(store.storage().writes(), 2);
        assert!(store.decrement("Bunny").unwrap());
        assert_eq!(store.storage().writes(), 3);

        let raw = store.storage().raw(CART_STORAGE_KEY).unwrap();
        let reloaded: Cart = serde_json::from_str(raw).unwrap();
        assert_eq!(&reloaded, store.cart());
    }

    #[test]
    fn test_invalid_add_is_silent_and_not_persisted() {
        let mut store = empty_store();

        assert!(!store.add("", "25").unwrap());
        assert!(!store.add("Bunny", "abc").unwrap());
        assert!(!store.add("Bunny", "NaN").unwrap());
        assert!(!store.add("Bunny", "Infinity").unwrap());
        assert!(!store.add("Bunny", "").unwrap());
        assert!(!store.add("Bunny", "1_000").unwrap());

        assert!(store.cart().is_empty());
        assert_eq!(store.storage().writes(), 0);
    }

    #[test]
    fn test_decrement_removes_from_storage() {
        let mut store = empty_store();
        store.add("Bee", "7").unwrap();
        store.apply("Bee", RowAction::Decrease).unwrap();

        let reloaded = CartStore::load(store.storage().clone()).unwrap();
        assert!(reloaded.cart().get("Bee").is_none());
    }

    #[test]
    fn test_noop_mutations_do_not_write() {
        let mut store = empty_store();
        assert!(!store.increment("Ghost").unwrap());
        assert!(!store.decrement("Ghost").unwrap());
        assert!(store.remove("Ghost").unwrap().is_none());
        assert_eq!(store.storage().writes(), 0);
    }

    #[test]
    fn test_clear_deletes_entry() {
        let mut store = empty_store();
        store.add("Bunny", "25").unwrap();
        store.clear().unwrap();

        assert!(store.cart().is_empty());
        assert!(store.storage().raw(CART_STORAGE_KEY).is_none());
    }

    #[test]
    fn test_round_trip_through_storage() {
        let mut store = empty_store();
        store.add("Bunny", "25").unwrap();
        store.add("Bunny", "30").unwrap();
        store.add("Sunflower Coaster", " 6.5 ").unwrap();

        let reloaded = CartStore::load(store.storage().clone()).unwrap();
        assert_eq!(reloaded.count(), 3);
        assert_eq!(reloaded.total(), Decimal::new(565, 1));
        assert_eq!(
            reloaded.cart().get("Bunny").unwrap().price,
            Price::parse("25").unwrap()
        );
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        #[derive(Debug, Clone)]
        enum Op {
            Add(String, String),
            Increment(String),
            Decrement(String),
            Remove(String),
        }

        fn name() -> impl Strategy<Value = String> {
            prop_oneof![
                Just("Bunny".to_string()),
                Just("Bee".to_string()),
                Just(" Bee ".to_string()),
                Just("Whale".to_string()),
                Just(String::new()),
                Just("   ".to_string()),
            ]
        }

        fn raw_price() -> impl Strategy<Value = String> {
            prop_oneof![
                // Quarter-dollar steps are exact as JSON floats
                4 => (0u32..400).prop_map(|quarters| {
                    format!("{}.{:02}", quarters / 4, (quarters % 4) * 25)
                }),
                1 => prop_oneof![
                    Just(String::new()),
                    Just("abc".to_string()),
                    Just("NaN".to_string()),
                    Just("-Infinity".to_string()),
                    Just("-5".to_string()),
                    Just("1_000".to_string()),
                ],
            ]
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                3 => (name(), raw_price()).prop_map(|(n, p)| Op::Add(n, p)),
                2 => name().prop_map(Op::Increment),
                2 => name().prop_map(Op::Decrement),
                1 => name().prop_map(Op::Remove),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(200))]

            #[test]
            fn test_invariants_hold_for_any_sequence(ops in prop::collection::vec(op(), 0..40)) {
                let mut store = empty_store();

                for op in &ops {
                    match op {
                        Op::Add(name, raw) => {
                            store.add(name, raw).unwrap();
                        }
                        Op::Increment(name) => {
                            store.increment(name).unwrap();
                        }
                        Op::Decrement(name) => {
                            store.decrement(name).unwrap();
                        }
                        Op::Remove(name) => {
                            store.remove(name).unwrap();
                        }
                    }

                    let cart = store.cart();
                    prop_assert!(cart.lines().all(|line| line.qty >= 1));
                    prop_assert!(cart.lines().all(|line| !line.name.trim().is_empty()));

                    let total: Decimal = cart.lines().map(|line| line.price.times(line.qty)).sum();
                    let count: u64 = cart.lines().map(|line| u64::from(line.qty)).sum();
                    prop_assert_eq!(store.total(), total);
                    prop_assert_eq!(store.count(), count);

                    let reloaded = CartStore::load(store.storage().clone()).unwrap();
                    prop_assert_eq!(reloaded.cart(), store.cart());
                }
            }
        }
    }
}
