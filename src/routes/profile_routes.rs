//! The super admin's profile editor.

use axum::extract::State;
use axum::{routing::get, Json, Router};

use crate::guard::{Guarded, SuperOnly};
use crate::metrics::MetricsRecorder;
use crate::models::Session;
use crate::profile::ProfileUpdate;
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;

pub fn routes() -> Router<AppState> {
    Router::new().route("/profile", get(profile).put(update_profile))
}

async fn profile(guarded: Guarded<SuperOnly>) -> Json<Session> {
    Json(guarded.session.redacted())
}

async fn update_profile(
    _guarded: Guarded<SuperOnly>,
    State(state): State<AppState>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<Session>, HTTPError> {
    let result = state.profiles.update_profile(&state.auth, update).await;
    state
        .metrics
        .record_profile_update(if result.is_ok() { "success" } else { "failure" });
    Ok(Json(result?))
}
