use thiserror::Error;

/// Why a login did not produce a session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No account in the role's collection matches the email and password.
    #[error("Invalid email or password")]
    InvalidCredentials,
    /// The account lookup itself failed.
    #[error("Authentication service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Profile edits, avatar uploads and session updates all fail with this.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UpdateError {
    #[error("Profile update failed: {0}")]
    UpdateFailed(String),
}
