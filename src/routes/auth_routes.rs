//! Login, logout and session endpoints.

use std::time::Instant;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::{
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::metrics::MetricsRecorder;
use crate::models::{Role, Session};
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;
use crate::views::{LoginView, SessionView};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/login/manager", get(manager_login_page))
        .route("/login/super", get(super_login_page))
        .route("/logout", post(logout))
        .route("/session", get(session))
}

#[derive(Deserialize)]
struct LoginPageParams {
    role: Option<String>,
}

#[derive(Deserialize)]
struct LoginRequest {
    #[serde(default)]
    role: Option<String>,
    email: String,
    password: String,
}

#[derive(Serialize)]
struct LoginResponse {
    session: Session,
    /// Dashboard the client should navigate to.
    redirect: &'static str,
}

/// The login form for `role`, or the operator's own dashboard when someone
/// is already signed in.
fn login_view(state: &AppState, role: Role) -> Response {
    match state.auth.state().role() {
        Some(current) => Redirect::to(current.dashboard_path()).into_response(),
        None => Json(LoginView::for_role(role)).into_response(),
    }
}

async fn login_page(
    State(state): State<AppState>,
    Query(params): Query<LoginPageParams>,
) -> Response {
    login_view(&state, Role::from_param(params.role.as_deref()))
}

async fn manager_login_page(State(state): State<AppState>) -> Response {
    login_view(&state, Role::Manager)
}

async fn super_login_page(State(state): State<AppState>) -> Response {
    login_view(&state, Role::Super)
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, HTTPError> {
    let role = Role::from_param(request.role.as_deref());
    let started = Instant::now();

    let result = state
        .auth
        .login(role, request.email.trim(), &request.password)
        .await;

    state
        .metrics
        .record_login_duration(role.as_str(), started.elapsed().as_secs_f64());
    let outcome = match &result {
        Ok(_) => "success",
        Err(crate::auth::AuthError::InvalidCredentials) => "invalid",
        Err(crate::auth::AuthError::ServiceUnavailable(_)) => "unavailable",
    };
    state.metrics.record_login_attempt(role.as_str(), outcome);

    let session = result?;
    Ok(Json(LoginResponse {
        session: session.redacted(),
        redirect: role.dashboard_path(),
    }))
}

async fn logout(State(state): State<AppState>) -> StatusCode {
    state.auth.logout();
    info!("Logout requested");
    StatusCode::NO_CONTENT
}

async fn session(State(state): State<AppState>) -> Json<SessionView> {
    Json(SessionView::from_state(&state.auth.state()))
}
