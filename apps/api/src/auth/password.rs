// Password hashing utilities
// Uses bcrypt for secure password hashing

use bcrypt::{hash, verify};

use super::AuthError;

pub use bcrypt::DEFAULT_COST;

/// Hashes a password using bcrypt
///
/// # Arguments
/// * `password` - The plaintext password to hash
/// * `cost` - bcrypt work factor (4..=31)
///
/// # Returns
/// * `Ok(String)` - The bcrypt hash
/// * `Err(AuthError)` - If hashing fails
///
/// # Example
/// ```
/// use storefront_api::auth::password::{hash_password, DEFAULT_COST};
///
/// let hash = hash_password("my_password", DEFAULT_COST).expect("valid hash");
/// ```
pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    hash(password, cost).map_err(|e| AuthError::Hash(e.to_string()))
}

/// Verifies a password against a bcrypt hash
///
/// # Returns
/// * `Ok(bool)` - True if password matches, false otherwise
/// * `Err(AuthError)` - If the stored hash is malformed
///
/// # Example
/// ```
/// use storefront_api::auth::password::{hash_password, verify_password};
///
/// let hash = hash_password("my_password", 4).unwrap();
/// let valid = verify_password("my_password", &hash).unwrap();
/// assert!(valid);
/// ```
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    verify(password, hash).map_err(|e| AuthError::Hash(e.to_string()))
}
