//! HTTP route definitions and handlers.
//!
//! Routes are grouped by page: login and session, dashboards, the clients
//! roster, the super-admin profile, and service endpoints.

mod auth_routes;
mod client_routes;
mod dashboard_routes;
mod health_routes;
mod metrics_routes;
mod profile_routes;

use crate::state::AppState;
use axum::Router;

/// Creates the application router with all routes and the shared state.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(auth_routes::routes())
        .merge(dashboard_routes::routes())
        .merge(client_routes::routes())
        .merge(profile_routes::routes())
        .merge(health_routes::routes())
        .merge(metrics_routes::routes())
        .with_state(state)
}
