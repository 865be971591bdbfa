//! Shared application state.
//!
//! Every handler gets a clone; the services behind it are shared.

use std::sync::Arc;

use crate::auth::AuthContext;
use crate::config::ConfigV1;
use crate::metrics::Metrics;
use crate::profile::ProfileService;
use crate::roster::RosterService;

#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// The operator's session.
    pub auth: Arc<AuthContext>,
    pub roster: Arc<RosterService>,
    pub profiles: Arc<ProfileService>,
    pub metrics: Metrics,
}
