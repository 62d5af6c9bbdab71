use async_trait::async_trait;
use uuid::Uuid;

use super::errors::RepoResult;
use crate::domain::cart::Cart;

/// Repository trait for shopping carts, one per user
#[async_trait]
pub trait CartRepository: Send + Sync {
    async fn find_by_user(&self, user_id: Uuid) -> RepoResult<Option<Cart>>;

    /// Insert or replace the user's cart
    async fn save(&self, cart: &Cart) -> RepoResult<()>;
}
