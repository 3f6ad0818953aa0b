//! Server error types
//!
//! Four failure kinds callers can branch on, plus Internal for everything
//! that should never reach a client verbatim. Authentication messages stay
//! generic so responses cannot be used to enumerate accounts.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0}")]
    Authentication(String),

    #[error("{0}")]
    Authorization(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn authentication(msg: impl Into<String>) -> Self {
        ServerError::Authentication(msg.into())
    }

    pub fn authorization(msg: impl Into<String>) -> Self {
        ServerError::Authorization(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ServerError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ServerError::NotFound(msg.into())
    }

    /// Stable kind label, independent of message text
    pub fn kind(&self) -> &'static str {
        match self {
            ServerError::Authentication(_) => "authentication",
            ServerError::Authorization(_) => "authorization",
            ServerError::Validation(_) => "validation",
            ServerError::NotFound(_) => "not_found",
            ServerError::Internal(_) => "internal",
        }
    }
}

impl From<rusqlite::Error> for ServerError {
    fn from(e: rusqlite::Error) -> Self {
        ServerError::Internal(e.to_string())
    }
}

impl From<redis::RedisError> for ServerError {
    fn from(e: redis::RedisError) -> Self {
        ServerError::Internal(e.to_string())
    }
}

impl From<bcrypt::BcryptError> for ServerError {
    fn from(e: bcrypt::BcryptError) -> Self {
        ServerError::Internal(e.to_string())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::Authentication(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ServerError::Authorization(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            ServerError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ServerError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = json!({ "error": message, "kind": self.kind() });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_is_stable_across_messages() {
        assert_eq!(
            ServerError::authentication("invalid credentials").kind(),
            ServerError::authentication("account inactive").kind()
        );
        assert_ne!(
            ServerError::authentication("x").kind(),
            ServerError::authorization("x").kind()
        );
    }
}
