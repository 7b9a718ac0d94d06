//! Provider integrations for the storefront.
//!
//! # Services
//!
//! - `mailer` - Transactional email (Resend)
//! - `notifications` - Contact and order email content
//! - `stripe` - Checkout sessions and webhook verification

pub mod mailer;
pub mod notifications;
pub mod stripe;

pub use mailer::{Mailer, MailerError, OutgoingEmail, ResendMailer};
pub use stripe::{CheckoutSession, CheckoutSessionParams, PaymentError, PaymentGateway, StripeClient};
