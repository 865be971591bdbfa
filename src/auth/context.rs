//! The console's single authenticated session.
//!
//! `AuthContext` is built once at startup and shared with every handler. Its
//! state is published through a watch channel: each change replaces the whole
//! snapshot, so readers never observe a half-applied update, and anything
//! gated on the session (the route guard) can re-evaluate on every change.

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::error::{AuthError, UpdateError};
use super::service::AuthService;
use crate::models::{Role, Session};
use crate::session_store::SessionStore;

/// Snapshot of the auth context.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub session: Option<Session>,
    /// True until the persisted session has been restored at startup.
    pub loading: bool,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.session.as_ref().map(|s| s.role)
    }
}

pub struct AuthContext {
    service: AuthService,
    sessions: Arc<dyn SessionStore>,
    state: watch::Sender<AuthState>,
}

impl AuthContext {
    /// Creates the context in its loading state. Call `restore` before serving.
    pub fn new(service: AuthService, sessions: Arc<dyn SessionStore>) -> Self {
        let (state, _) = watch::channel(AuthState {
            session: None,
            loading: true,
        });
        AuthContext {
            service,
            sessions,
            state,
        }
    }

    /// Restores the persisted session, then leaves the loading state.
    /// A missing or unreadable session simply leaves the operator signed out.
    pub fn restore(&self) {
        let session = self.sessions.load();
        match &session {
            Some(s) => info!("Restored {} session '{}'", s.role, s.id),
            None => debug!("No persisted session to restore"),
        }
        self.state.send_replace(AuthState {
            session,
            loading: false,
        });
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn session(&self) -> Option<Session> {
        self.state.borrow().session.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Authenticates and, on success, makes the result the current session.
    /// On failure the current state is left untouched.
    pub async fn login(&self, role: Role, email: &str, password: &str) -> Result<Session, AuthError> {
        let session = self.service.authenticate(role, email, password).await?;

        // Persist while holding the state lock so the stored and in-memory
        // sessions always name the same operator.
        self.state.send_modify(|state| {
            if let Err(e) = self.sessions.save(&session) {
                warn!("Could not persist session '{}': {}", session.id, e);
            }
            state.session = Some(session.clone());
        });
        info!("{} '{}' signed in", role, session.id);
        Ok(session)
    }

    pub fn logout(&self) {
        let mut previous = None;
        self.state.send_modify(|state| {
            if let Err(e) = self.sessions.clear() {
                warn!("Could not clear persisted session: {}", e);
            }
            previous = state.session.take();
            state.loading = false;
        });
        if let Some(session) = previous {
            info!("{} '{}' signed out", session.role, session.id);
        }
    }

    /// Merges `fields` into the current session and re-persists it, provided
    /// the session is still the one with id `expected_id`.
    ///
    /// The in-memory and persisted copies keep every field, secrets included;
    /// the returned copy is redacted for echoing back to the operator.
    pub fn update_session(
        &self,
        expected_id: &str,
        fields: &Map<String, Value>,
    ) -> Result<Session, UpdateError> {
        let mut outcome = Err(UpdateError::UpdateFailed("No active session".to_string()));

        self.state.send_if_modified(|state| {
            let current = match state.session.as_mut() {
                Some(current) => current,
                None => return false,
            };
            if current.id != expected_id {
                outcome = Err(UpdateError::UpdateFailed(format!(
                    "Session changed from '{}' to '{}' during the update",
                    expected_id, current.id
                )));
                return false;
            }

            let mut updated = current.clone();
            updated.merge(fields);
            if let Err(e) = self.sessions.save(&updated) {
                warn!("Could not persist updated session '{}': {}", updated.id, e);
            }
            outcome = Ok(updated.redacted());
            *current = updated;
            true
        });

        if let Err(e) = &outcome {
            warn!("Session update for '{}' rejected: {}", expected_id, e);
        }
        outcome
    }
}
