use async_trait::async_trait;
use uuid::Uuid;

use super::errors::RepoResult;
use crate::domain::pagination::{PageRequest, Paginated};
use crate::domain::user::User;

/// Repository trait for the User aggregate (profile and address book included)
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; a taken username is a `Conflict`
    async fn create(&self, user: &User) -> RepoResult<()>;

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;

    /// Persist every mutable field of `user`
    async fn update(&self, user: &User) -> RepoResult<()>;

    async fn delete(&self, id: Uuid) -> RepoResult<()>;

    /// Stamp the last successful login
    async fn record_login(&self, id: Uuid) -> RepoResult<()>;

    /// Newest first, optionally matching username or names (case-insensitive)
    async fn list(&self, search: Option<&str>, page: PageRequest) -> RepoResult<Paginated<User>>;
}
