//! Hosted checkout session creation.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use tracing::instrument;

use alyssa_loops_core::api::{CheckoutRequest, CheckoutResponse};

use crate::error::{AppError, Result};
use crate::services::{CheckoutSessionParams, PaymentError};
use crate::state::AppState;

/// Create a checkout session for the posted cart.
///
/// POST /api/create-checkout-session
///
/// The cart is stored in the session metadata so the completion webhook
/// can list the items.
#[instrument(skip_all)]
pub async fn create_session(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<Json<CheckoutResponse>> {
    let Json(request) = payload?;

    if request.is_empty() {
        return Err(AppError::BadRequest("Cart empty".to_string()));
    }

    let cart_json =
        serde_json::to_string(&request.cart).map_err(|e| AppError::Internal(e.to_string()))?;
    let params = CheckoutSessionParams::from_items(state.config(), request.items(), cart_json)?;

    let session = state.payments().create_checkout_session(&params).await?;
    let url = session.url.ok_or(PaymentError::MissingUrl(session.id))?;

    Ok(Json(CheckoutResponse::redirect(url)))
}
