//! Custom order request relay.
//!
//! Forwards the contact form to the operator inbox with the requester as
//! reply-to.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use tracing::instrument;

use alyssa_loops_core::Email;
use alyssa_loops_core::api::ApiResponse;
use alyssa_loops_core::contact::ContactRequest;

use crate::error::{AppError, Result};
use crate::services::notifications;
use crate::state::AppState;

/// Submit a custom order request.
///
/// POST /api/contact
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ContactRequest>, JsonRejection>,
) -> Result<Json<ApiResponse>> {
    let Json(request) = payload?;

    let request = request.validate().map_err(|e| {
        tracing::debug!(error = %e, "Incomplete contact request");
        AppError::BadRequest("Missing fields".to_string())
    })?;

    if Email::parse(&request.email).is_err() {
        return Err(AppError::BadRequest("Invalid email".to_string()));
    }

    let email = notifications::contact_request_email(state.config(), &request)?;
    state.mailer().send(&email).await?;

    tracing::info!("Custom order request relayed");
    Ok(Json(ApiResponse::success()))
}
