//! Toast route handlers.

use axum::{Json, extract::State};

use crate::notify::Notification;
use crate::state::AppState;

/// Drain pending toasts, oldest first.
pub async fn drain(State(state): State<AppState>) -> Json<Vec<Notification>> {
    Json(state.toasts().drain())
}
