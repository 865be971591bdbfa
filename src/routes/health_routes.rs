//! Health check endpoint.

use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// `OK` once the persisted session has been restored.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    if state.auth.is_loading() {
        (StatusCode::SERVICE_UNAVAILABLE, "Starting")
    } else {
        (StatusCode::OK, "OK")
    }
}
