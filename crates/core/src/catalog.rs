//! Registry of products that can be added to the cart.
//!
//! Every "add to cart" control is registered up front as a
//! `{id, name, price}` entry. Activating a control looks the entry up by id
//! and adds it to the cart store.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::{CartStorage, CartStore, StorageError};
use crate::types::Price;

/// Catalog errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Two entries share an id.
    #[error("duplicate product id: {0}")]
    DuplicateId(String),

    /// No entry has the requested id.
    #[error("unknown product id: {0}")]
    UnknownProduct(String),

    /// The cart could not be persisted.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A product that can be added to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Stable identifier of the add-to-cart control.
    pub id: String,
    /// Name used as the cart key.
    pub name: String,
    pub price: Price,
}

/// Ordered set of add-to-cart products.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Create an empty catalog.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            products: Vec::new(),
        }
    }

    /// Build a catalog from a list of products.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateId`] if two products share an id.
    pub fn from_products(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for product in products {
            catalog.register(product)?;
        }
        Ok(catalog)
    }

    /// Parse a catalog from a JSON array of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or ids repeat.
    pub fn from_json(raw: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let products: Vec<Product> = serde_json::from_str(raw)?;
        Ok(Self::from_products(products)?)
    }

    /// Register a product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateId`] if the id is already registered.
    pub fn register(&mut self, product: Product) -> Result<(), CatalogError> {
        if self.get(&product.id).is_some() {
            return Err(CatalogError::DuplicateId(product.id));
        }
        self.products.push(product);
        Ok(())
    }

    /// Look up a product by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Products in registration order.
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether no products are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Add one unit of product `id` to `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is unknown or the cart cannot be persisted.
    pub fn add_to_cart<S: CartStorage>(
        &self,
        id: &str,
        store: &mut CartStore<S>,
    ) -> Result<&Product, CatalogError> {
        let product = self
            .get(id)
            .ok_or_else(|| CatalogError::UnknownProduct(id.to_string()))?;
        store.add_priced(&product.name, product.price)?;
        Ok(product)
    }
}
