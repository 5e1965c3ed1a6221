//! Health check handlers.

use axum::extract::State;
use axum::http::StatusCode;

use crate::error::Result;
use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies the cart storage area can be read. Returns 503 Service
/// Unavailable if it cannot.
pub async fn readiness(State(state): State<AppState>) -> Result<StatusCode> {
    state
        .storage()
        .get_item(&state.config().storage.cart_key)?;
    Ok(StatusCode::OK)
}
