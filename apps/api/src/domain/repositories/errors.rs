use thiserror::Error;

/// Persistence failures shared by every repository
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The addressed record does not exist; the message is user facing
    #[error("{0}")]
    NotFound(String),

    /// A uniqueness or stock constraint rejected the write; user facing
    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt stored document: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RepositoryError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }
}

pub type RepoResult<T> = Result<T, RepositoryError>;
