pub mod context;
pub mod error;
pub mod service;

// Re-export so we can do "use crate::auth::*;"
pub use context::{AuthContext, AuthState};
pub use error::{AuthError, UpdateError};
pub use service::AuthService;
