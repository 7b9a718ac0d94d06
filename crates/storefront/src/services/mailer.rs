//! Transactional email delivery via the Resend API.
//!
//! Handlers talk to the [`Mailer`] trait so tests can record outgoing mail
//! instead of calling the provider.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ResendConfig;

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum MailerError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Client could not be configured.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// A plain-text email ready to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    /// Sender, e.g. `Alyssa Loops <shop@alyssaloops.com>`.
    pub from: String,
    pub to: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
}

/// Something that can deliver an [`OutgoingEmail`].
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one email.
    ///
    /// # Errors
    ///
    /// Returns error if the provider rejects the message or is unreachable.
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailerError>;
}

/// Resend acknowledgement.
#[derive(Debug, Deserialize)]
struct SendResponse {
    id: Option<String>,
}

/// Resend API client.
#[derive(Clone)]
pub struct ResendMailer {
    client: reqwest::Client,
    endpoint: String,
}

impl ResendMailer {
    /// Create a new Resend client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ResendConfig) -> Result<Self, MailerError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.api_key.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| MailerError::Config(format!("Invalid API key format: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/emails", config.api_base.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    #[tracing::instrument(skip(self, email), fields(subject = %email.subject))]
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailerError> {
        let response = self.client.post(&self.endpoint).json(email).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MailerError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let ack: SendResponse = response.json().await?;
        tracing::info!(email_id = ?ack.id, "Email sent");
        Ok(())
    }
}
