//! View models rendered by the HTTP handlers.

use serde::Serialize;

use crate::auth::AuthState;
use crate::models::{Role, Session};

/// The login form for one role.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoginView {
    pub role: Role,
    pub title: &'static str,
    /// Where the form is submitted.
    pub action: &'static str,
    pub fields: [&'static str; 2],
    /// Login entry point of the other role.
    pub alternate: &'static str,
}

impl LoginView {
    pub fn for_role(role: Role) -> Self {
        let (title, alternate) = match role {
            Role::Manager => ("Salon Manager Login", Role::Super.login_path()),
            Role::Super => ("Super Admin Login", Role::Manager.login_path()),
        };
        LoginView {
            role,
            title,
            action: "/login",
            fields: ["email", "password"],
            alternate,
        }
    }
}

/// What the console knows about the current operator.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub loading: bool,
    pub is_authenticated: bool,
    pub session: Option<Session>,
}

impl SessionView {
    pub fn from_state(state: &AuthState) -> Self {
        SessionView {
            loading: state.loading,
            is_authenticated: state.is_authenticated(),
            session: state.session.as_ref().map(Session::redacted),
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct Link {
    pub label: &'static str,
    pub href: &'static str,
}

/// Landing page after login.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub role: Role,
    pub greeting: String,
    pub salon_id: Option<String>,
    pub image_url: Option<String>,
    pub links: Vec<Link>,
}

impl DashboardView {
    pub fn for_session(session: &Session) -> Self {
        let who = session.name().or(session.email()).unwrap_or("there");
        let links = match session.role {
            Role::Manager => vec![
                Link {
                    label: "Clients",
                    href: "/clients",
                },
                Link {
                    label: "Live clients",
                    href: "/clients/live",
                },
            ],
            Role::Super => vec![Link {
                label: "Profile",
                href: "/profile",
            }],
        };
        DashboardView {
            role: session.role,
            greeting: format!("Welcome, {}", who),
            salon_id: session.salon_id().map(str::to_string),
            image_url: session.image_url().map(str::to_string),
            links,
        }
    }
}
