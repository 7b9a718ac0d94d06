//! Operator and customer notification emails.
//!
//! Bodies are plain-text Askama templates under `templates/email/`.

use std::collections::BTreeMap;

use askama::Template;

use alyssa_loops_core::api::CheckoutItem;
use alyssa_loops_core::contact::ContactRequest;
use alyssa_loops_core::types::price::format_minor_units;

use super::mailer::{Mailer, MailerError, OutgoingEmail};
use super::stripe::webhook::CheckoutSessionObject;
use crate::config::StorefrontConfig;

#[derive(Template)]
#[template(path = "email/contact_request.txt")]
struct ContactRequestText<'a> {
    name: &'a str,
    email: &'a str,
    details: &'a str,
    store_name: &'a str,
}

#[derive(Template)]
#[template(path = "email/order_paid.txt")]
struct OrderPaidText<'a> {
    order: &'a OrderSummary,
    store_name: &'a str,
}

#[derive(Template)]
#[template(path = "email/order_confirmed.txt")]
struct OrderConfirmedText<'a> {
    order: &'a OrderSummary,
    store_name: &'a str,
}

/// Everything the order emails say about a paid checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummary {
    pub session_id: String,
    pub customer_name: String,
    pub customer_email: Option<String>,
    /// Formatted address, or a note that none was given.
    pub shipping: String,
    /// One `<qty>× <name> — $<price>` line per item; empty when unknown.
    pub items: String,
    /// `$X.XX`, or `(unknown)`.
    pub total: String,
}

impl OrderSummary {
    /// Summarize a completed checkout session.
    ///
    /// Unreadable cart metadata yields an empty item list.
    #[must_use]
    pub fn from_session(session: &CheckoutSessionObject) -> Self {
        let customer_name = session.customer_name().to_string();
        let shipping = session.shipping().map_or_else(
            || "No shipping address provided.".to_string(),
            |s| s.format(&customer_name),
        );

        let items = parse_cart(&session.id, session.cart_json())
            .values()
            .map(|item| format!("{}× {} — ${}", item.quantity(), item.name, item.price))
            .collect::<Vec<_>>()
            .join("\n");

        let total = session
            .amount_total
            .map_or_else(|| "(unknown)".to_string(), format_minor_units);

        Self {
            session_id: session.id.clone(),
            customer_email: session.customer_email().map(String::from),
            customer_name,
            shipping,
            items,
            total,
        }
    }

    /// Customer email for display.
    #[must_use]
    pub fn customer_email_or_unknown(&self) -> &str {
        self.customer_email.as_deref().unwrap_or("unknown")
    }
}

/// Recover the cart serialized into the session metadata at checkout.
fn parse_cart(session_id: &str, raw: Option<&str>) -> BTreeMap<String, CheckoutItem> {
    let Some(raw) = raw else {
        return BTreeMap::new();
    };
    serde_json::from_str(raw).unwrap_or_else(|e| {
        tracing::warn!(session_id, error = %e, "Unreadable cart metadata, sending order without items");
        BTreeMap::new()
    })
}

/// Email to the operator for a custom order request.
///
/// # Errors
///
/// Returns error if the template fails to render.
pub fn contact_request_email(
    config: &StorefrontConfig,
    request: &ContactRequest,
) -> Result<OutgoingEmail, MailerError> {
    let text = ContactRequestText {
        name: &request.name,
        email: &request.email,
        details: &request.details,
        store_name: &config.store_name,
    }
    .render()?;

    Ok(OutgoingEmail {
        from: config.sender(),
        to: vec![config.to_email.to_string()],
        reply_to: Some(request.email.clone()),
        subject: format!("Custom Order Request — {}", request.name),
        text,
    })
}

/// Email to the operator for a paid order.
///
/// # Errors
///
/// Returns error if the template fails to render.
pub fn merchant_order_email(
    config: &StorefrontConfig,
    order: &OrderSummary,
) -> Result<OutgoingEmail, MailerError> {
    let text = OrderPaidText {
        order,
        store_name: &config.store_name,
    }
    .render()?;

    Ok(OutgoingEmail {
        from: config.sender(),
        to: vec![config.to_email.to_string()],
        reply_to: None,
        subject: format!("PAID Order — {} ({})", config.store_name, order.total),
        text,
    })
}

/// Confirmation to the customer, if their address is known.
///
/// # Errors
///
/// Returns error if the template fails to render.
pub fn customer_order_email(
    config: &StorefrontConfig,
    order: &OrderSummary,
) -> Result<Option<OutgoingEmail>, MailerError> {
    let Some(to) = order.customer_email.clone() else {
        return Ok(None);
    };

    let text = OrderConfirmedText {
        order,
        store_name: &config.store_name,
    }
    .render()?;

    Ok(Some(OutgoingEmail {
        from: config.sender(),
        to: vec![to],
        reply_to: None,
        subject: format!("Order Confirmed — {} ✿", config.store_name),
        text,
    }))
}

/// Send the operator notification, then the customer confirmation.
///
/// Stops at the first failure. Returns the number of emails sent.
///
/// # Errors
///
/// Returns error if rendering or delivery fails.
pub async fn notify_order_paid(
    mailer: &dyn Mailer,
    config: &StorefrontConfig,
    order: &OrderSummary,
) -> Result<usize, MailerError> {
    mailer.send(&merchant_order_email(config, order)?).await?;

    let Some(confirmation) = customer_order_email(config, order)? else {
        tracing::info!(session_id = %order.session_id, "No customer email, skipping confirmation");
        return Ok(1);
    };
    mailer.send(&confirmation).await?;
    Ok(2)
}
