//! Checkout command.
//!
//! Posts the cart to the storefront and prints the hosted checkout URL.
//! The cart is left as is; it is the shopper's until they clear it.

use std::io::Write;

use alyssa_loops_core::api::CheckoutRequest;
use alyssa_loops_core::cart::{CartStorage, CartStore};

use super::CommandError;
use crate::client::StorefrontApi;

/// How a checkout attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Nothing to buy; no request was made.
    EmptyCart,
    /// Continue payment at this URL.
    Redirect(String),
    /// Transport error or a response without a URL.
    Failed,
}

impl CheckoutOutcome {
    /// Text shown to the shopper.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::EmptyCart => "Your cart is empty!".to_string(),
            Self::Redirect(url) => format!("Continue to payment: {url}"),
            Self::Failed => "Couldn’t start Stripe checkout. Is the server running?".to_string(),
        }
    }

    /// Whether the shopper can proceed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Redirect(_))
    }
}

/// Start a checkout for the stored cart.
///
/// # Errors
///
/// Returns error if output cannot be written.
pub async fn run<S: CartStorage, W: Write>(
    store: &CartStore<S>,
    api: &dyn StorefrontApi,
    out: &mut W,
) -> Result<CheckoutOutcome, CommandError> {
    let outcome = if store.cart().is_empty() {
        CheckoutOutcome::EmptyCart
    } else {
        writeln!(out, "Redirecting…")?;
        match api
            .create_checkout_session(&CheckoutRequest::from(store.cart()))
            .await
        {
            Ok(response) => match response.url {
                Some(url) if response.ok => CheckoutOutcome::Redirect(url),
                _ => {
                    tracing::warn!(error = ?response.error, "Checkout response had no URL");
                    CheckoutOutcome::Failed
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Checkout request failed");
                CheckoutOutcome::Failed
            }
        }
    };

    writeln!(out, "{}", outcome.message())?;
    Ok(outcome)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use alyssa_loops_core::cart::MemoryStorage;

    use super::*;
    use crate::commands::testing::FakeApi;

    fn store_with_bunny() -> CartStore<MemoryStorage> {
        let mut store = CartStore::load(MemoryStorage::new()).unwrap();
        store.add("Crochet Bunny", "25").unwrap();
        store.add("Crochet Bunny", "25").unwrap();
        store
    }

    #[tokio::test]
    async fn test_empty_cart_makes_no_request() {
        let store = CartStore::load(MemoryStorage::new()).unwrap();
        let api = FakeApi::default();
        let mut out = Vec::new();

        let outcome = run(&store, &api, &mut out).await.unwrap();
        assert_eq!(outcome, CheckoutOutcome::EmptyCart);
        assert_eq!(api.calls(), 0);
        assert_eq!(String::from_utf8(out).unwrap(), "Your cart is empty!\n");
    }

    #[tokio::test]
    async fn test_redirect_on_success() {
        let store = store_with_bunny();
        let api = FakeApi {
            checkout_url: Some("https://checkout.stripe.com/c/pay/cs_1".to_string()),
            ..Default::default()
        };
        let mut out = Vec::new();

        let outcome = run(&store, &api, &mut out).await.unwrap();
        assert!(outcome.is_success());

        let sent = api.checkouts.lock().unwrap();
        let item = sent[0].items().next().unwrap();
        assert_eq!(item.name, "Crochet Bunny");
        assert_eq!(item.qty, Some(2));

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Redirecting…\n"));
        assert!(text.contains("https://checkout.stripe.com/c/pay/cs_1"));
        // The cart survives a checkout attempt
        assert_eq!(store.count(), 2);
    }

    #[tokio::test]
    async fn test_failure_alerts() {
        let store = store_with_bunny();
        for api in [
            FakeApi {
                fail: true,
                ..Default::default()
            },
            FakeApi::default(),
        ] {
            let outcome = run(&store, &api, &mut Vec::new()).await.unwrap();
            assert_eq!(outcome, CheckoutOutcome::Failed);
            assert_eq!(
                outcome.message(),
                "Couldn’t start Stripe checkout. Is the server running?"
            );
        }
    }
}
