//! HTTP client for the storefront API.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use alyssa_loops_core::api::{ApiResponse, CheckoutRequest, CheckoutResponse};
use alyssa_loops_core::contact::ContactRequest;

/// Errors that can occur when calling the storefront API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed or the body was not the expected JSON.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error status.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },
}

/// The storefront endpoints the client uses.
#[async_trait]
pub trait StorefrontApi: Send + Sync {
    /// POST /api/contact
    async fn submit_contact(&self, request: &ContactRequest) -> Result<ApiResponse, ClientError>;

    /// POST /api/create-checkout-session
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutResponse, ClientError>;
}

/// `reqwest`-backed storefront client.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base: String,
}

impl HttpClient {
    /// Create a client for the API at `base`, e.g. `http://localhost:3000`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(base: &str) -> Result<Self, ClientError> {
        Ok(Self {
            client: reqwest::Client::builder().build()?,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base);
        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .json::<ApiResponse>()
                .await
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl StorefrontApi for HttpClient {
    async fn submit_contact(&self, request: &ContactRequest) -> Result<ApiResponse, ClientError> {
        self.post("/api/contact", request).await
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutResponse, ClientError> {
        self.post("/api/create-checkout-session", request).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn test_submit_contact_posts_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/contact"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new(&format!("{}/", server.uri())).unwrap();
        let response = client
            .submit_contact(&ContactRequest::new("Ada", "ada@example.com", "A frog hat"))
            .await
            .unwrap();
        assert!(response.ok);

        let request = &server.received_requests().await.unwrap()[0];
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(body["details"], "A frog hat");
    }

    #[tokio::test]
    async fn test_error_status_carries_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/create-checkout-session"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"ok": false, "error": "Cart empty"})),
            )
            .mount(&server)
            .await;

        let client = HttpClient::new(&server.uri()).unwrap();
        let err = client
            .create_checkout_session(&CheckoutRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Status { status: 400, ref message } if message == "Cart empty"
        ));
    }

    #[tokio::test]
    async fn test_checkout_returns_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/create-checkout-session"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"ok": true, "url": "https://checkout.stripe.com/c/pay/cs_1"}),
            ))
            .mount(&server)
            .await;

        let client = HttpClient::new(&server.uri()).unwrap();
        let response = client
            .create_checkout_session(&CheckoutRequest::default())
            .await
            .unwrap();
        assert_eq!(
            response.url.as_deref(),
            Some("https://checkout.stripe.com/c/pay/cs_1")
        );
    }
}
