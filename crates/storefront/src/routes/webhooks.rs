//! Payment provider webhooks.
//!
//! Once a delivery's signature checks out it is always acknowledged, even if
//! sending the order emails fails. Those failures are logged and reported
//! to Sentry; the provider is not asked to retry.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use alyssa_loops_core::api::WebhookAck;

use crate::services::notifications::{self, OrderSummary};
use crate::services::stripe::webhook::{PaymentEvent, SIGNATURE_HEADER};
use crate::state::AppState;

/// Receive a Stripe event.
///
/// POST /webhooks/stripe
#[instrument(skip_all)]
pub async fn stripe(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    if let Err(e) = state
        .webhooks()
        .verify(&body, signature, chrono::Utc::now().timestamp())
    {
        tracing::warn!(error = %e, "Webhook signature rejected");
        return rejected(&e);
    }

    let event = match PaymentEvent::parse(&body) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, "Unreadable webhook payload");
            return rejected(&e);
        }
    };

    match event {
        PaymentEvent::CheckoutCompleted(session) => {
            let order = OrderSummary::from_session(&session);
            match notifications::notify_order_paid(state.mailer(), state.config(), &order).await
            {
                Ok(sent) => {
                    tracing::info!(session_id = %order.session_id, sent, "Order notifications sent");
                }
                Err(e) => {
                    let event_id = sentry::capture_error(&e);
                    tracing::error!(
                        session_id = %order.session_id,
                        error = %e,
                        sentry_event_id = %event_id,
                        "Order notification failed"
                    );
                }
            }
        }
        PaymentEvent::Other(kind) => {
            tracing::debug!(kind, "Ignoring webhook event");
        }
    }

    Json(WebhookAck { received: true }).into_response()
}

fn rejected(reason: &impl std::fmt::Display) -> Response {
    (StatusCode::BAD_REQUEST, format!("Webhook Error: {reason}")).into_response()
}
