use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{contains_ci, paginate, MemoryStore};
use crate::domain::pagination::{PageRequest, Paginated};
use crate::domain::repositories::{RepoResult, RepositoryError, UserRepository};
use crate::domain::user::User;

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: &User) -> RepoResult<()> {
        let mut t = self.tables.write().await;
        if t
            .users
            .values()
            .any(|u| u.username.as_str().eq_ignore_ascii_case(user.username.as_str()))
        {
            return Err(RepositoryError::conflict("Username already exists"));
        }
        t.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t
            .users
            .values()
            .find(|u| u.username.as_str().eq_ignore_ascii_case(username.trim()))
            .cloned())
    }

    async fn update(&self, user: &User) -> RepoResult<()> {
        let mut t = self.tables.write().await;
        let slot = t
            .users
            .get_mut(&user.id)
            .ok_or_else(|| RepositoryError::not_found("User not found"))?;
        *slot = user.clone();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> RepoResult<()> {
        let mut t = self.tables.write().await;
        t.users
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("User not found"))?;
        t.carts.remove(&id);
        Ok(())
    }

    async fn record_login(&self, id: Uuid) -> RepoResult<()> {
        let mut t = self.tables.write().await;
        if let Some(user) = t.users.get_mut(&id) {
            user.last_login = Some(Utc::now());
        }
        Ok(())
    }

    async fn list(&self, search: Option<&str>, page: PageRequest) -> RepoResult<Paginated<User>> {
        let t = self.tables.read().await;
        let mut users: Vec<User> = t
            .users
            .values()
            .filter(|u| match search {
                Some(s) => {
                    contains_ci(u.username.as_str(), s)
                        || u.profile.first_name.as_deref().is_some_and(|n| contains_ci(n, s))
                        || u.profile.last_name.as_deref().is_some_and(|n| contains_ci(n, s))
                }
                None => true,
            })
            .cloned()
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(users, page))
    }
}
