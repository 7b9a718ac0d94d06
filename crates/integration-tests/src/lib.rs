//! Integration tests for the Alyssa Loops storefront.
//!
//! Route tests drive the real router with `tower::ServiceExt::oneshot`;
//! email and payment providers are replaced by the recording doubles below.
//! Provider clients themselves are tested against `wiremock` servers.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p alyssa-loops-integration-tests
//! ```

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, Bytes, to_bytes};
use axum::http::{Request, StatusCode, header::CONTENT_TYPE};
use secrecy::SecretString;
use tower::ServiceExt;
use url::Url;

use alyssa_loops_core::Email;
use alyssa_loops_storefront::config::{ResendConfig, StorefrontConfig, StripeConfig};
use alyssa_loops_storefront::services::stripe::webhook::{SIGNATURE_HEADER, WebhookVerifier};
use alyssa_loops_storefront::services::{
    CheckoutSession, CheckoutSessionParams, Mailer, MailerError, OutgoingEmail, PaymentError,
    PaymentGateway,
};
use alyssa_loops_storefront::state::AppState;

/// Webhook signing secret used by [`test_config`].
pub const WEBHOOK_SECRET: &str = "whsec_integration_test_secret";

/// Operator inbox used by [`test_config`].
pub const OPERATOR_EMAIL: &str = "orders@alyssaloops.com";

/// Configuration pointing at the given provider base URLs.
#[must_use]
pub fn test_config_with_bases(stripe_base: &str, resend_base: &str) -> StorefrontConfig {
    StorefrontConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 3000,
        client_url: Url::parse("https://alyssaloops.com").unwrap(),
        allowed_origins: vec!["https://alyssaloops.com".to_string()],
        store_name: "Alyssa Loops".to_string(),
        to_email: Email::parse(OPERATOR_EMAIL).unwrap(),
        from_email: Email::parse("shop@alyssaloops.com").unwrap(),
        resend: ResendConfig {
            api_base: resend_base.to_string(),
            api_key: SecretString::from("re_integration_test_key"),
        },
        stripe: StripeConfig {
            api_base: stripe_base.to_string(),
            secret_key: SecretString::from("sk_test_integration_key"),
            webhook_secret: SecretString::from(WEBHOOK_SECRET),
            currency: "usd".to_string(),
            shipping_countries: vec!["US".to_string()],
        },
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// Configuration with unreachable provider URLs.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    test_config_with_bases("http://127.0.0.1:9", "http://127.0.0.1:9")
}

/// A `Stripe-Signature` header for `payload`, signed now.
#[must_use]
pub fn sign(payload: &[u8]) -> String {
    WebhookVerifier::new(SecretString::from(WEBHOOK_SECRET))
        .sign(payload, chrono::Utc::now().timestamp())
        .unwrap()
}

// =============================================================================
// Provider doubles
// =============================================================================

/// Records every email; optionally fails from the `fail_from`-th send on.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    attempts: Mutex<usize>,
    fail_from: Option<usize>,
}

impl RecordingMailer {
    /// A mailer that fails every send starting with attempt `n` (0-based).
    #[must_use]
    pub fn failing_from(n: usize) -> Self {
        Self {
            fail_from: Some(n),
            ..Self::default()
        }
    }

    /// Emails delivered so far.
    #[must_use]
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailerError> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            *attempts += 1;
            *attempts - 1
        };
        if self.fail_from.is_some_and(|n| attempt >= n) {
            return Err(MailerError::Api {
                status: 503,
                message: "provider unavailable".to_string(),
            });
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

/// Answers checkout requests with a fixed session; records the parameters.
pub struct StubGateway {
    requests: Mutex<Vec<CheckoutSessionParams>>,
    url: Option<String>,
    fail: bool,
}

impl Default for StubGateway {
    fn default() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            url: Some("https://checkout.stripe.com/c/pay/cs_test_1".to_string()),
            fail: false,
        }
    }
}

impl StubGateway {
    /// A gateway whose every call fails with a provider error.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// A gateway whose sessions come back without a hosted page URL.
    #[must_use]
    pub fn without_url() -> Self {
        Self {
            url: None,
            ..Self::default()
        }
    }

    /// Checkout requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<CheckoutSessionParams> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn create_checkout_session(
        &self,
        params: &CheckoutSessionParams,
    ) -> Result<CheckoutSession, PaymentError> {
        self.requests.lock().unwrap().push(params.clone());
        if self.fail {
            return Err(PaymentError::Api {
                status: 400,
                message: "sk_test_integration_key is invalid".to_string(),
            });
        }
        Ok(CheckoutSession {
            id: "cs_test_1".to_string(),
            url: self.url.clone(),
        })
    }
}

// =============================================================================
// Test application
// =============================================================================

/// The storefront router wired to provider doubles.
pub struct TestApp {
    pub router: Router,
    pub mailer: Arc<RecordingMailer>,
    pub gateway: Arc<StubGateway>,
}

/// A response split into status and body.
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl TestResponse {
    /// Body parsed as JSON.
    #[must_use]
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    /// Body as text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8(self.body.to_vec()).unwrap()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new(RecordingMailer::default(), StubGateway::default())
    }
}

impl TestApp {
    /// Build the app around the given doubles.
    #[must_use]
    pub fn new(mailer: RecordingMailer, gateway: StubGateway) -> Self {
        let mailer = Arc::new(mailer);
        let gateway = Arc::new(gateway);
        let state = AppState::with_services(test_config(), mailer.clone(), gateway.clone());
        Self {
            router: alyssa_loops_storefront::app(state),
            mailer,
            gateway,
        }
    }

    /// Send a request through the router.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        TestResponse { status, body }
    }

    /// GET `path`.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.send(Request::get(path).body(Body::empty()).unwrap())
            .await
    }

    /// POST a JSON body to `path`.
    pub async fn post_json(&self, path: &str, body: &serde_json::Value) -> TestResponse {
        self.post_raw(path, body.to_string()).await
    }

    /// POST a raw JSON-typed body to `path`.
    pub async fn post_raw(&self, path: &str, body: impl Into<Body>) -> TestResponse {
        self.send(
            Request::post(path)
                .header(CONTENT_TYPE, "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
    }

    /// POST a webhook delivery with an optional signature header.
    pub async fn post_webhook(&self, payload: &[u8], signature: Option<&str>) -> TestResponse {
        let mut request = Request::post("/webhooks/stripe").header(CONTENT_TYPE, "application/json");
        if let Some(signature) = signature {
            request = request.header(SIGNATURE_HEADER, signature);
        }
        self.send(request.body(Body::from(payload.to_vec())).unwrap())
            .await
    }
}
