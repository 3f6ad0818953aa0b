//! Error types for stockade-core

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Unknown account status: {0}")]
    UnknownAccountStatus(String),

    #[error("Unknown order status: {0}")]
    UnknownOrderStatus(String),
}
