//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::services::stripe::webhook::WebhookVerifier;
use crate::services::{Mailer, MailerError, PaymentError, PaymentGateway, ResendMailer, StripeClient};

/// Error creating provider clients.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("mailer: {0}")]
    Mailer(#[from] MailerError),
    #[error("payments: {0}")]
    Payments(#[from] PaymentError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// configuration and the provider clients.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    mailer: Arc<dyn Mailer>,
    payments: Arc<dyn PaymentGateway>,
    webhooks: WebhookVerifier,
}

impl AppState {
    /// Create application state backed by the real providers.
    ///
    /// # Errors
    ///
    /// Returns an error if a provider client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let mailer = Arc::new(ResendMailer::new(&config.resend)?);
        let payments = Arc::new(StripeClient::new(&config.stripe)?);
        Ok(Self::with_services(config, mailer, payments))
    }

    /// Create application state with the given providers.
    #[must_use]
    pub fn with_services(
        config: StorefrontConfig,
        mailer: Arc<dyn Mailer>,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self {
        let webhooks = WebhookVerifier::new(config.stripe.webhook_secret.clone());
        Self {
            inner: Arc::new(AppStateInner {
                config,
                mailer,
                payments,
                webhooks,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get the email provider.
    #[must_use]
    pub fn mailer(&self) -> &dyn Mailer {
        self.inner.mailer.as_ref()
    }

    /// Get the payment provider.
    #[must_use]
    pub fn payments(&self) -> &dyn PaymentGateway {
        self.inner.payments.as_ref()
    }

    /// Get the webhook signature verifier.
    #[must_use]
    pub fn webhooks(&self) -> &WebhookVerifier {
        &self.inner.webhooks
    }
}
