use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

use crate::auth::{AuthError, UpdateError};
use crate::store::StoreError;

/// A general purpose HTTP error rendered as `{"error": message}`.
#[derive(Debug)]
pub struct HTTPError {
    status: StatusCode,
    message: String,
}

impl HTTPError {
    /// Creates a new HTTP error with the given status code and message.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        HTTPError {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for HTTPError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<AuthError> for HTTPError {
    fn from(error: AuthError) -> Self {
        let status = match error {
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        HTTPError::new(status, error.to_string())
    }
}

impl From<UpdateError> for HTTPError {
    fn from(error: UpdateError) -> Self {
        HTTPError::new(StatusCode::UNPROCESSABLE_ENTITY, error.to_string())
    }
}

impl From<StoreError> for HTTPError {
    fn from(error: StoreError) -> Self {
        tracing::error!("Store error: {}", error);
        HTTPError::new(StatusCode::SERVICE_UNAVAILABLE, error.to_string())
    }
}
