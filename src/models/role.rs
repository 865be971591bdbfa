use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The two access levels of the console.
///
/// The role decides which account collection a login is checked against and
/// which dashboard a signed-in operator lands on.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Manager,
    Super,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Manager => "manager",
            Role::Super => "super",
        }
    }

    /// Landing page for an operator signed in with this role.
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Role::Manager => "/dashboard/manager",
            Role::Super => "/dashboard/super",
        }
    }

    pub fn login_path(&self) -> &'static str {
        match self {
            Role::Manager => "/login/manager",
            Role::Super => "/login/super",
        }
    }

    /// Resolves the `role` query parameter of the login entry point.
    /// Only `super` selects the super-admin login; anything else is a manager login.
    pub fn from_param(param: Option<&str>) -> Role {
        match param.map(str::trim) {
            Some(p) if p.eq_ignore_ascii_case("super") => Role::Super,
            _ => Role::Manager,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Super).unwrap(), "\"super\"");
        let role: Role = serde_json::from_str("\"manager\"").unwrap();
        assert_eq!(role, Role::Manager);
    }

    #[test]
    fn test_role_from_param_defaults_to_manager() {
        assert_eq!(Role::from_param(Some("super")), Role::Super);
        assert_eq!(Role::from_param(Some("SUPER")), Role::Super);
        assert_eq!(Role::from_param(Some("admin")), Role::Manager);
        assert_eq!(Role::from_param(None), Role::Manager);
    }

    #[test]
    fn test_role_rejects_unknown_value() {
        assert!(serde_json::from_str::<Role>("\"owner\"").is_err());
    }
}
