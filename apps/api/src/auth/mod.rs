// Authentication primitives
// JWT session tokens and bcrypt password hashing

pub mod jwt;
pub mod password;

use thiserror::Error;

/// Failures of the token and hashing primitives
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token has expired")]
    Expired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Failed to issue token: {0}")]
    Token(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),
}
