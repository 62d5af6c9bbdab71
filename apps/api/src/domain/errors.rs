use thiserror::Error;

/// Business rule violations raised by domain entities
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Input failed validation (one or more messages, joined for display)
    #[error("{}", .0.join(", "))]
    Validation(Vec<String>),

    /// The entity is in a state that does not allow the operation
    #[error("{0}")]
    InvalidState(String),

    /// A referenced child record does not exist on the entity
    #[error("{0}")]
    NotFound(String),
}

impl DomainError {
    /// Single-message validation error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Validation(vec![message.into()])
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

/// Collects validation messages and turns them into a single error
#[derive(Debug, Default)]
pub struct Violations(Vec<String>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` when `failed` is true
    pub fn check(&mut self, failed: bool, message: impl Into<String>) -> &mut Self {
        if failed {
            self.0.push(message.into());
        }
        self
    }

    pub fn into_result(self) -> DomainResult<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self.0))
        }
    }
}
