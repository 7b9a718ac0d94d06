//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `RESEND_API_KEY` - Resend API key for transactional email
//! - `STRIPE_SECRET_KEY` - Stripe secret API key
//! - `STRIPE_WEBHOOK_SECRET` - Stripe webhook signing secret
//! - `TO_EMAIL` - Operator inbox for contact requests and paid orders
//! - `FROM_EMAIL` - Verified sender address
//! - `CLIENT_URL` - Public URL of the static site (checkout redirects)
//!
//! ## Optional
//! - `ALLOWED_ORIGINS` - Comma-separated CORS origins (default: none)
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port, falling back to `PORT` (default: 3000)
//! - `STORE_NAME` - Name used in email senders and subjects (default: Alyssa Loops)
//! - `CHECKOUT_CURRENCY` - Checkout currency (default: usd)
//! - `SHIPPING_COUNTRIES` - Comma-separated shipping countries (default: US)
//! - `STRIPE_API_BASE` - Stripe API base URL (default: <https://api.stripe.com>)
//! - `RESEND_API_BASE` - Resend API base URL (default: <https://api.resend.com>)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use alyssa_loops_core::Email;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public URL of the static site
    pub client_url: Url,
    /// Origins allowed to call the API from a browser
    pub allowed_origins: Vec<String>,
    /// Store name shown in email senders and subjects
    pub store_name: String,
    /// Operator inbox
    pub to_email: Email,
    /// Sender address
    pub from_email: Email,
    /// Resend configuration
    pub resend: ResendConfig,
    /// Stripe configuration
    pub stripe: StripeConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Resend API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct ResendConfig {
    /// API base URL
    pub api_base: String,
    /// API key
    pub api_key: SecretString,
}

impl std::fmt::Debug for ResendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendConfig")
            .field("api_base", &self.api_base)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Stripe API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct StripeConfig {
    /// API base URL
    pub api_base: String,
    /// Secret API key
    pub secret_key: SecretString,
    /// Webhook signing secret
    pub webhook_secret: SecretString,
    /// Checkout currency code, lowercase
    pub currency: String,
    /// Countries allowed for shipping address collection
    pub shipping_countries: Vec<String>,
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("api_base", &self.api_base)
            .field("secret_key", &"[REDACTED]")
            .field("webhook_secret", &"[REDACTED]")
            .field("currency", &self.currency)
            .field("shipping_countries", &self.shipping_countries)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_port()?;
        let client_url = get_url("CLIENT_URL")?;

        Ok(Self {
            host,
            port,
            client_url,
            allowed_origins: split_list(&get_env_or_default("ALLOWED_ORIGINS", "")),
            store_name: get_env_or_default("STORE_NAME", "Alyssa Loops"),
            to_email: get_email("TO_EMAIL")?,
            from_email: get_email("FROM_EMAIL")?,
            resend: ResendConfig::from_env()?,
            stripe: StripeConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Page the payment provider redirects to after a successful payment.
    ///
    /// `{CHECKOUT_SESSION_ID}` is substituted by the provider.
    #[must_use]
    pub fn success_url(&self) -> String {
        format!(
            "{}/success.html?session_id={{CHECKOUT_SESSION_ID}}",
            self.client_base()
        )
    }

    /// Page the payment provider redirects to when checkout is abandoned.
    #[must_use]
    pub fn cancel_url(&self) -> String {
        format!("{}/cancel.html", self.client_base())
    }

    /// Sender with the store name as display name.
    #[must_use]
    pub fn sender(&self) -> String {
        self.from_email.with_display_name(&self.store_name)
    }

    fn client_base(&self) -> &str {
        self.client_url.as_str().trim_end_matches('/')
    }
}

impl ResendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_base: get_env_or_default("RESEND_API_BASE", "https://api.resend.com"),
            api_key: get_validated_secret("RESEND_API_KEY")?,
        })
    }
}

impl StripeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let shipping_countries = split_list(&get_env_or_default("SHIPPING_COUNTRIES", "US"))
            .into_iter()
            .map(|country| country.to_ascii_uppercase())
            .collect::<Vec<_>>();
        if shipping_countries.is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "SHIPPING_COUNTRIES".to_string(),
                "at least one country is required".to_string(),
            ));
        }

        Ok(Self {
            api_base: get_env_or_default("STRIPE_API_BASE", "https://api.stripe.com"),
            secret_key: get_validated_secret("STRIPE_SECRET_KEY")?,
            webhook_secret: get_validated_secret("STRIPE_WEBHOOK_SECRET")?,
            currency: get_env_or_default("CHECKOUT_CURRENCY", "usd").to_ascii_lowercase(),
            shipping_countries,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Listen port from `STOREFRONT_PORT`, falling back to the platform's `PORT`.
fn get_port() -> Result<u16, ConfigError> {
    let (key, raw) = match get_optional_env("STOREFRONT_PORT") {
        Some(value) => ("STOREFRONT_PORT", value),
        None => ("PORT", get_env_or_default("PORT", "3000")),
    };
    raw.parse::<u16>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Get a required absolute URL.
fn get_url(key: &str) -> Result<Url, ConfigError> {
    let value = get_required_env(key)?;
    Url::parse(&value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Get a required email address.
fn get_email(key: &str) -> Result<Email, ConfigError> {
    let value = get_required_env(key)?;
    Email::parse(&value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Split a comma-separated list, dropping blanks.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Provider keys are long random strings
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Copy the key from the provider dashboard."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> StorefrontConfig {
        StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            client_url: Url::parse("https://alyssaloops.com/").unwrap(),
            allowed_origins: vec!["https://alyssaloops.com".to_string()],
            store_name: "Alyssa Loops".to_string(),
            to_email: Email::parse("orders@alyssaloops.com").unwrap(),
            from_email: Email::parse("shop@alyssaloops.com").unwrap(),
            resend: ResendConfig {
                api_base: "https://api.resend.com".to_string(),
                api_key: SecretString::from("re_super_secret_resend_key"),
            },
            stripe: StripeConfig {
                api_base: "https://api.stripe.com".to_string(),
                secret_key: SecretString::from("sk_test_super_secret_stripe_key"),
                webhook_secret: SecretString::from("whsec_super_secret_signing_key"),
                currency: "usd".to_string(),
                shipping_countries: vec!["US".to_string()],
            },
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-stripe-key-here", "STRIPE_SECRET_KEY");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));

        let result = validate_secret_strength("changeme123", "RESEND_API_KEY");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("sk_test_51Hq8Zk2eZvKYlo2C9xR7mWp", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list(" https://a.com, ,https://b.com "),
            ["https://a.com", "https://b.com"]
        );
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_socket_addr() {
        let addr = config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_redirect_urls_trim_trailing_slash() {
        let config = config();
        assert_eq!(
            config.success_url(),
            "https://alyssaloops.com/success.html?session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(config.cancel_url(), "https://alyssaloops.com/cancel.html");
    }

    #[test]
    fn test_sender_uses_store_name() {
        assert_eq!(config().sender(), "Alyssa Loops <shop@alyssaloops.com>");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug_output = format!("{:?}", config());

        assert!(debug_output.contains("https://api.stripe.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret"));
    }
}
