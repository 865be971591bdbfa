//! Role dashboards, the landing pages after login.

use axum::response::Redirect;
use axum::{routing::get, Json, Router};

use crate::guard::{AnyRole, Guarded, ManagerOnly, SuperOnly};
use crate::state::AppState;
use crate::views::DashboardView;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(own_dashboard))
        .route("/dashboard/manager", get(manager_dashboard))
        .route("/dashboard/super", get(super_dashboard))
}

/// Sends any signed-in operator to the dashboard of their role.
async fn own_dashboard(guarded: Guarded<AnyRole>) -> Redirect {
    Redirect::to(guarded.session.role.dashboard_path())
}

async fn manager_dashboard(guarded: Guarded<ManagerOnly>) -> Json<DashboardView> {
    Json(DashboardView::for_session(&guarded.session))
}

async fn super_dashboard(guarded: Guarded<SuperOnly>) -> Json<DashboardView> {
    Json(DashboardView::for_session(&guarded.session))
}
