//! Liveness check.

use axum::Json;

use alyssa_loops_core::api::HealthResponse;

/// GET /health
///
/// Returns `{ok: true}` if the server is running. Does not check providers.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}
