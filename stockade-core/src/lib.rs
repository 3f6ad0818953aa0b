//! Stockade Core Library
//!
//! Shared primitives for the stockade shop platform:
//! - Closed role and status enumerations with total parse functions
//! - Signed, time-bounded access tokens (HS256, single shared secret)

pub mod enums;
pub mod error;
pub mod token;

pub use enums::{AccountStatus, OrderStatus, Role};
pub use error::Error;
pub use token::{AccessClaims, TokenSigner};

/// Result type for stockade-core operations
pub type Result<T> = std::result::Result<T, Error>;
