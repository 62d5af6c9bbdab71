use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::errors::{DomainError, DomainResult};

/// Minimum username length accepted at signup
pub const MIN_USERNAME_LEN: usize = 3;
/// Minimum password length accepted at signup and password change
pub const MIN_PASSWORD_LEN: usize = 6;

/// Username value object
///
/// # Invariants
/// - Surrounding whitespace is trimmed
/// - At least 3 characters long
/// - Is immutable after construction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Creates a new Username value object
    ///
    /// # Example
    /// ```
    /// use storefront_api::domain::user::value_objects::Username;
    ///
    /// let name = Username::new("  alice ").expect("valid username");
    /// assert_eq!(name.as_str(), "alice");
    /// ```
    pub fn new(username: impl Into<String>) -> DomainResult<Self> {
        let username = username.into().trim().to_string();
        if Self::is_valid(&username) {
            Ok(Username(username))
        } else {
            Err(DomainError::invalid(format!(
                "Username must be at least {MIN_USERNAME_LEN} characters long"
            )))
        }
    }

    fn is_valid(username: &str) -> bool {
        username.chars().count() >= MIN_USERNAME_LEN
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Username {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Checks the password length rule shared by signup and password change
pub fn check_password(password: &str) -> DomainResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::invalid(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    Ok(())
}

/// Account role; admins can reach the back-office routes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Customer,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Customer => write!(f, "customer"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_username() {
        assert!(Username::new("bob").is_ok());
    }

    #[test]
    fn username_is_trimmed() {
        let name = Username::new("  carol  ").unwrap();
        assert_eq!(name.as_str(), "carol");
    }

    #[test]
    fn short_username_rejected() {
        let err = Username::new("ab").unwrap_err();
        assert_eq!(err.to_string(), "Username must be at least 3 characters long");
    }

    #[test]
    fn whitespace_does_not_count() {
        assert!(Username::new("  a  ").is_err());
    }

    #[test]
    fn username_deserializes_through_validation() {
        let ok: Result<Username, _> = serde_json::from_str("\"dave\"");
        assert!(ok.is_ok());
        let bad: Result<Username, _> = serde_json::from_str("\"d\"");
        assert!(bad.is_err());
    }

    #[test]
    fn password_rule() {
        assert!(check_password("secret").is_ok());
        assert!(check_password("short").is_err());
    }

    #[test]
    fn role_display() {
        assert_eq!(Role::Customer.to_string(), "customer");
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!(Role::default(), Role::Customer);
    }
}
