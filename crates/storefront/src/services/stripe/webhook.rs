//! Stripe webhook verification and payload decoding.
//!
//! Deliveries are signed with HMAC-SHA256 over `"<timestamp>.<raw body>"`
//! and carry the result in the `Stripe-Signature` header as
//! `t=<unix seconds>,v1=<hex>[,v1=<hex>...]`. Verification must run on the
//! exact bytes received, before any parsing.

use std::collections::BTreeMap;

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the delivery signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Maximum age of a delivery, in seconds.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Event type announcing a paid checkout.
pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

/// Webhook signature verification failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("No Stripe-Signature header value was provided")]
    MissingHeader,
    #[error("Unable to extract timestamp and signatures from header")]
    MalformedHeader,
    #[error("Timestamp outside the tolerance zone")]
    Expired,
    #[error("No signatures found matching the expected signature for payload")]
    Mismatch,
    #[error("Invalid webhook secret")]
    InvalidSecret,
}

/// Verifies webhook deliveries against the signing secret.
pub struct WebhookVerifier {
    secret: SecretString,
    tolerance_secs: i64,
}

impl WebhookVerifier {
    /// Create a verifier with the default tolerance.
    #[must_use]
    pub const fn new(secret: SecretString) -> Self {
        Self {
            secret,
            tolerance_secs: SIGNATURE_TOLERANCE_SECS,
        }
    }

    /// Verify `payload` against a `Stripe-Signature` header value at time `now`.
    ///
    /// # Errors
    ///
    /// Returns a [`SignatureError`] describing why the delivery was rejected.
    pub fn verify(
        &self,
        payload: &[u8],
        header: Option<&str>,
        now: i64,
    ) -> Result<(), SignatureError> {
        let header = header
            .filter(|h| !h.trim().is_empty())
            .ok_or(SignatureError::MissingHeader)?;
        let (timestamp, signatures) = parse_header(header)?;

        let mac = self.mac(payload, timestamp)?;
        let matched = signatures.iter().any(|candidate| {
            hex::decode(candidate).is_ok_and(|bytes| mac.clone().verify_slice(&bytes).is_ok())
        });
        if !matched {
            return Err(SignatureError::Mismatch);
        }

        if (now - timestamp).abs() > self.tolerance_secs {
            return Err(SignatureError::Expired);
        }

        Ok(())
    }

    /// Produce a `Stripe-Signature` header value for `payload` at `timestamp`.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::InvalidSecret`] if the key is unusable.
    pub fn sign(&self, payload: &[u8], timestamp: i64) -> Result<String, SignatureError> {
        let mac = self.mac(payload, timestamp)?;
        let signature = hex::encode(mac.finalize().into_bytes());
        Ok(format!("t={timestamp},v1={signature}"))
    }

    fn mac(&self, payload: &[u8], timestamp: i64) -> Result<HmacSha256, SignatureError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| SignatureError::InvalidSecret)?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(mac)
    }
}

/// Split a header into its timestamp and `v1` signatures.
fn parse_header(header: &str) -> Result<(i64, Vec<&str>), SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse::<i64>().ok(),
            "v1" => signatures.push(value),
            _ => {}
        }
    }

    match timestamp {
        Some(t) if !signatures.is_empty() => Ok((t, signatures)),
        _ => Err(SignatureError::MalformedHeader),
    }
}

// =============================================================================
// Payloads
// =============================================================================

/// Envelope of every webhook delivery.
#[derive(Debug, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: EventData,
}

/// The object an event is about.
#[derive(Debug, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

/// A decoded event the storefront acts on.
#[derive(Debug)]
pub enum PaymentEvent {
    /// A checkout session was paid.
    CheckoutCompleted(Box<CheckoutSessionObject>),
    /// Anything else; acknowledged and ignored.
    Other(String),
}

impl PaymentEvent {
    /// Decode a verified payload.
    ///
    /// # Errors
    ///
    /// Returns error if the payload is not a well-formed event.
    pub fn parse(payload: &[u8]) -> Result<Self, serde_json::Error> {
        let event: Event = serde_json::from_slice(payload)?;
        if event.kind == CHECKOUT_SESSION_COMPLETED {
            let session = serde_json::from_value(event.data.object)?;
            Ok(Self::CheckoutCompleted(Box::new(session)))
        } else {
            Ok(Self::Other(event.kind))
        }
    }
}

/// The fields of a checkout session used for order notifications.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CheckoutSessionObject {
    pub id: String,
    pub customer_email: Option<String>,
    pub customer_details: Option<CustomerDetails>,
    pub shipping_details: Option<ShippingDetails>,
    /// Newer API versions report shipping here instead.
    pub collected_information: Option<CollectedInformation>,
    pub metadata: Option<BTreeMap<String, String>>,
    /// Amount charged, in minor units.
    pub amount_total: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CustomerDetails {
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CollectedInformation {
    pub shipping_details: Option<ShippingDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShippingDetails {
    pub name: Option<String>,
    pub address: Option<Address>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Address {
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

impl CheckoutSessionObject {
    /// Customer email from the collected details, else the prefilled one.
    #[must_use]
    pub fn customer_email(&self) -> Option<&str> {
        self.customer_details
            .as_ref()
            .and_then(|d| non_empty(d.email.as_deref()))
            .or_else(|| non_empty(self.customer_email.as_deref()))
    }

    /// Customer name, `Customer` when unknown.
    #[must_use]
    pub fn customer_name(&self) -> &str {
        self.customer_details
            .as_ref()
            .and_then(|d| non_empty(d.name.as_deref()))
            .unwrap_or("Customer")
    }

    /// Shipping details from either location.
    #[must_use]
    pub fn shipping(&self) -> Option<&ShippingDetails> {
        self.shipping_details.as_ref().or_else(|| {
            self.collected_information
                .as_ref()
                .and_then(|c| c.shipping_details.as_ref())
        })
    }

    /// The `cart_json` metadata entry, if any.
    #[must_use]
    pub fn cart_json(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get("cart_json"))
            .map(String::as_str)
    }
}

impl ShippingDetails {
    /// Multi-line postal address, addressed to `fallback_name` if unnamed.
    #[must_use]
    pub fn format(&self, fallback_name: &str) -> String {
        let name = non_empty(self.name.as_deref()).unwrap_or(fallback_name);
        let address = self.address.clone().unwrap_or_default();
        let part = |value: &Option<String>| value.clone().unwrap_or_default();

        let mut street = part(&address.line1);
        if let Some(line2) = non_empty(address.line2.as_deref()) {
            street.push('\n');
            street.push_str(line2);
        }

        format!(
            "{name}\n{street}\n{}, {} {}\n{}",
            part(&address.city),
            part(&address.state),
            part(&address.postal_code),
            part(&address.country),
        )
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
