//! Stripe integration.
//!
//! - [`StripeClient`] creates hosted checkout sessions through the REST API
//! - [`webhook`] verifies and decodes webhook deliveries

pub mod webhook;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;

use alyssa_loops_core::api::CheckoutItem;

use crate::config::{StorefrontConfig, StripeConfig};

/// Errors that can occur when talking to Stripe.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Client could not be configured.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A line item price cannot be expressed in minor units.
    #[error("Price out of range for {0}")]
    PriceOutOfRange(String),

    /// The created session has no hosted page URL.
    #[error("Checkout session {0} has no URL")]
    MissingUrl(String),
}

/// One checkout line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub name: String,
    /// Unit price in minor units.
    pub unit_amount: i64,
    pub quantity: u32,
}

impl TryFrom<&CheckoutItem> for LineItem {
    type Error = PaymentError;

    fn try_from(item: &CheckoutItem) -> Result<Self, Self::Error> {
        let unit_amount = item
            .price
            .to_minor_units()
            .ok_or_else(|| PaymentError::PriceOutOfRange(item.name.clone()))?;
        Ok(Self {
            name: item.name.clone(),
            unit_amount,
            quantity: item.quantity(),
        })
    }
}

/// Parameters of a hosted checkout session in payment mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSessionParams {
    pub line_items: Vec<LineItem>,
    pub currency: String,
    pub shipping_countries: Vec<String>,
    pub success_url: String,
    pub cancel_url: String,
    /// Serialized cart, echoed back in the completion webhook.
    pub cart_json: String,
}

impl CheckoutSessionParams {
    /// Build session parameters for `items` using the configured redirects,
    /// currency and shipping countries.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::PriceOutOfRange`] for unrepresentable prices.
    pub fn from_items<'a>(
        config: &StorefrontConfig,
        items: impl IntoIterator<Item = &'a CheckoutItem>,
        cart_json: String,
    ) -> Result<Self, PaymentError> {
        let line_items = items
            .into_iter()
            .map(LineItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            line_items,
            currency: config.stripe.currency.clone(),
            shipping_countries: config.stripe.shipping_countries.clone(),
            success_url: config.success_url(),
            cancel_url: config.cancel_url(),
            cart_json,
        })
    }

    /// Encode as Stripe's bracketed form fields.
    #[must_use]
    pub fn to_form(&self) -> Vec<(String, String)> {
        let mut form = vec![("mode".to_string(), "payment".to_string())];

        for (i, item) in self.line_items.iter().enumerate() {
            let prefix = format!("line_items[{i}]");
            form.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
            form.push((
                format!("{prefix}[price_data][currency]"),
                self.currency.clone(),
            ));
            form.push((
                format!("{prefix}[price_data][product_data][name]"),
                item.name.clone(),
            ));
            form.push((
                format!("{prefix}[price_data][unit_amount]"),
                item.unit_amount.to_string(),
            ));
        }

        for (i, country) in self.shipping_countries.iter().enumerate() {
            form.push((
                format!("shipping_address_collection[allowed_countries][{i}]"),
                country.clone(),
            ));
        }

        form.push((
            "phone_number_collection[enabled]".to_string(),
            "true".to_string(),
        ));
        form.push(("success_url".to_string(), self.success_url.clone()));
        form.push(("cancel_url".to_string(), self.cancel_url.clone()));
        form.push(("metadata[cart_json]".to_string(), self.cart_json.clone()));
        form
    }
}

/// A created checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// Hosted checkout page.
    pub url: Option<String>,
}

/// Something that can open a hosted checkout session.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a checkout session.
    ///
    /// # Errors
    ///
    /// Returns error if the provider rejects the request or is unreachable.
    async fn create_checkout_session(
        &self,
        params: &CheckoutSessionParams,
    ) -> Result<CheckoutSession, PaymentError>;
}

/// Stripe REST API client.
#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    api_base: String,
}

impl StripeClient {
    /// Create a new Stripe API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StripeConfig) -> Result<Self, PaymentError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.secret_key.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| PaymentError::Config(format!("Invalid API key format: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PaymentGateway for StripeClient {
    #[tracing::instrument(skip(self, params), fields(line_items = params.line_items.len()))]
    async fn create_checkout_session(
        &self,
        params: &CheckoutSessionParams,
    ) -> Result<CheckoutSession, PaymentError> {
        let url = format!("{}/v1/checkout/sessions", self.api_base);
        let response = self
            .client
            .post(&url)
            .form(&params.to_form())
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let session: CheckoutSession = response.json().await?;
        tracing::info!(session_id = %session.id, "Checkout session created");
        Ok(session)
    }
}
