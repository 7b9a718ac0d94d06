//! JSON bodies exchanged with the storefront API.
//!
//! Every API answer carries an `ok` flag; failures add a human-readable
//! `error` and never any provider detail.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::types::Price;

/// Generic `{ok, error?}` answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    /// `{ok: true}`
    #[must_use]
    pub const fn success() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    /// `{ok: false, error}`
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
        }
    }
}

/// Body of `POST /api/create-checkout-session`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// The cart as stored by the client. Absent and empty are both rejected.
    #[serde(default)]
    pub cart: Option<BTreeMap<String, CheckoutItem>>,
}

impl CheckoutRequest {
    /// Cart entries, empty when the cart was absent.
    pub fn items(&self) -> impl Iterator<Item = &CheckoutItem> {
        self.cart.iter().flat_map(BTreeMap::values)
    }

    /// Whether there is nothing to check out.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.as_ref().is_none_or(BTreeMap::is_empty)
    }
}

impl From<&Cart> for CheckoutRequest {
    fn from(cart: &Cart) -> Self {
        let items = cart
            .lines()
            .map(|line| {
                (
                    line.name.clone(),
                    CheckoutItem {
                        name: line.name.clone(),
                        price: line.price,
                        qty: Some(line.qty),
                    },
                )
            })
            .collect();
        Self { cart: Some(items) }
    }
}

/// A cart line as received by the server.
///
/// The server is lenient about quantity: missing or zero means one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutItem {
    pub name: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty: Option<u32>,
}

impl CheckoutItem {
    /// Quantity to charge for.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.qty.filter(|qty| *qty > 0).unwrap_or(1)
    }
}

/// Answer of `POST /api/create-checkout-session`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub ok: bool,
    /// Hosted checkout page to redirect to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckoutResponse {
    /// `{ok: true, url}`
    #[must_use]
    pub fn redirect(url: impl Into<String>) -> Self {
        Self {
            ok: true,
            url: Some(url.into()),
            error: None,
        }
    }
}

/// Answer of `GET /health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
}

/// Acknowledgement of a payment webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookAck {
    pub received: bool,
}
