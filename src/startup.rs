//! Application startup and server initialization.
//!
//! Connects the remote store, object storage and session file, restores the
//! persisted session, then serves the routes.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::auth::{AuthContext, AuthService};
use crate::config::ConfigV1;
use crate::metrics::Metrics;
use crate::profile::ProfileService;
use crate::roster::RosterService;
use crate::routes;
use crate::session_store::create_session_store;
use crate::state::AppState;
use crate::storage::create_object_storage;
use crate::store::create_store;

/// Builds the shared state. The auth context comes back already restored.
pub async fn build_state(config: Arc<ConfigV1>) -> Result<AppState, Box<dyn std::error::Error>> {
    let store = create_store(&config.remote).await?;
    let storage = create_object_storage(&config.storage);
    let sessions = create_session_store(&config.session);

    let auth = Arc::new(AuthContext::new(
        AuthService::new(store.clone(), config.collections.clone()),
        sessions,
    ));
    auth.restore();

    let roster = Arc::new(RosterService::new(
        store.clone(),
        config.collections.clone(),
    ));
    let profiles = Arc::new(ProfileService::new(
        store,
        storage,
        config.collections.clone(),
    ));

    Ok(AppState {
        config,
        auth,
        roster,
        profiles,
        metrics: Metrics::new(),
    })
}

/// Initializes and runs the console server on `bind_address`.
///
/// # Errors
///
/// Returns an error if the remote store cannot be reached, the address cannot
/// be bound, or the server stops with an I/O error.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), Box<dyn std::error::Error>> {
    let state = build_state(config.clone()).await?;
    let app = routes::create_router(state);

    let listener = TcpListener::bind(&config.bind_address).await?;
    info!("Serving salon console on {}", config.bind_address);

    axum::serve(listener, app).await?;
    Ok(())
}
