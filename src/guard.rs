//! Route protection.
//!
//! `evaluate` is a pure function of the auth state and the role a page
//! requires. `Guarded<R>` applies it to every request for a protected route,
//! so the decision is re-made against the latest auth state each time.

use std::marker::PhantomData;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Redirect, Response};
use tracing::debug;

use crate::auth::AuthState;
use crate::models::{Role, Session};
use crate::state::AppState;
use crate::views::LoginView;

/// What a protected page should do for the current auth state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// The session is still being restored; render nothing.
    Suspend,
    /// Nobody is signed in; show the login form for this role.
    Login(Role),
    /// Show the protected content.
    Render,
    /// Signed in with another role; go to that role's dashboard.
    Redirect(Role),
}

pub fn evaluate(state: &AuthState, required: Option<Role>) -> GuardOutcome {
    if state.loading {
        return GuardOutcome::Suspend;
    }
    let session = match &state.session {
        Some(session) => session,
        None => return GuardOutcome::Login(required.unwrap_or(Role::Manager)),
    };
    match required {
        Some(role) if role != session.role => GuardOutcome::Redirect(session.role),
        _ => GuardOutcome::Render,
    }
}

/// The role a protected route requires, if any.
pub trait RoleRequirement: Send + Sync + 'static {
    const REQUIRED: Option<Role>;
}

/// Any signed-in operator.
pub struct AnyRole;
/// Salon managers only.
pub struct ManagerOnly;
/// Super admins only.
pub struct SuperOnly;

impl RoleRequirement for AnyRole {
    const REQUIRED: Option<Role> = None;
}

impl RoleRequirement for ManagerOnly {
    const REQUIRED: Option<Role> = Some(Role::Manager);
}

impl RoleRequirement for SuperOnly {
    const REQUIRED: Option<Role> = Some(Role::Super);
}

/// Extractor that only succeeds when the guard says `Render`, yielding the
/// session the decision was made on.
pub struct Guarded<R: RoleRequirement> {
    pub session: Session,
    _requirement: PhantomData<R>,
}

/// The non-render outcomes, as HTTP responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardRejection {
    Suspended,
    Login(Role),
    Redirect(Role),
}

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        match self {
            GuardRejection::Suspended => StatusCode::NO_CONTENT.into_response(),
            GuardRejection::Login(role) => {
                (StatusCode::UNAUTHORIZED, Json(LoginView::for_role(role))).into_response()
            }
            GuardRejection::Redirect(role) => Redirect::to(role.dashboard_path()).into_response(),
        }
    }
}

impl<R: RoleRequirement> FromRequestParts<AppState> for Guarded<R> {
    type Rejection = GuardRejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let snapshot = state.auth.state();
        let outcome = evaluate(&snapshot, R::REQUIRED);
        debug!("Guard on {} -> {:?}", parts.uri.path(), outcome);

        match (outcome, snapshot.session) {
            (GuardOutcome::Render, Some(session)) => Ok(Guarded {
                session,
                _requirement: PhantomData,
            }),
            (GuardOutcome::Suspend, _) => Err(GuardRejection::Suspended),
            (GuardOutcome::Redirect(role), _) => Err(GuardRejection::Redirect(role)),
            (GuardOutcome::Login(role), _) => Err(GuardRejection::Login(role)),
            // Render always comes with a session.
            (GuardOutcome::Render, None) => {
                Err(GuardRejection::Login(R::REQUIRED.unwrap_or(Role::Manager)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Document;
    use serde_json::json;

    fn signed_in(role: Role) -> AuthState {
        AuthState {
            session: Some(Session::from_document(
                Document::from_json("u1", json!({})),
                role,
            )),
            loading: false,
        }
    }

    fn signed_out() -> AuthState {
        AuthState {
            session: None,
            loading: false,
        }
    }

    #[test]
    fn test_loading_always_suspends() {
        let mut state = signed_in(Role::Super);
        state.loading = true;
        for required in [None, Some(Role::Manager), Some(Role::Super)] {
            assert_eq!(evaluate(&state, required), GuardOutcome::Suspend);
        }
        let loading_signed_out = AuthState {
            session: None,
            loading: true,
        };
        assert_eq!(evaluate(&loading_signed_out, None), GuardOutcome::Suspend);
    }

    #[test]
    fn test_signed_out_gets_login_for_required_role() {
        assert_eq!(
            evaluate(&signed_out(), Some(Role::Super)),
            GuardOutcome::Login(Role::Super)
        );
        assert_eq!(
            evaluate(&signed_out(), Some(Role::Manager)),
            GuardOutcome::Login(Role::Manager)
        );
        assert_eq!(evaluate(&signed_out(), None), GuardOutcome::Login(Role::Manager));
    }

    #[test]
    fn test_matching_or_unset_role_renders() {
        assert_eq!(
            evaluate(&signed_in(Role::Manager), Some(Role::Manager)),
            GuardOutcome::Render
        );
        assert_eq!(evaluate(&signed_in(Role::Super), None), GuardOutcome::Render);
    }

    #[test]
    fn test_mismatch_redirects_to_actual_role() {
        assert_eq!(
            evaluate(&signed_in(Role::Manager), Some(Role::Super)),
            GuardOutcome::Redirect(Role::Manager)
        );
        assert_eq!(
            evaluate(&signed_in(Role::Super), Some(Role::Manager)),
            GuardOutcome::Redirect(Role::Super)
        );
    }

    #[test]
    fn test_rejection_responses() {
        let response = GuardRejection::Suspended.into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = GuardRejection::Login(Role::Super).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = GuardRejection::Redirect(Role::Manager).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            "/dashboard/manager"
        );
    }
}
