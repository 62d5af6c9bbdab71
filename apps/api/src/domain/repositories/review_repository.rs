use async_trait::async_trait;
use uuid::Uuid;

use super::errors::RepoResult;
use crate::domain::pagination::{PageRequest, Paginated};
use crate::domain::review::{RatingSummary, Review, ReviewSort};

/// Repository trait for reviews
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Insert a review; a second review for the same user, product and order
    /// is a `Conflict`
    async fn create(&self, review: &Review) -> RepoResult<()>;

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Review>>;

    async fn exists(&self, user_id: Uuid, product_id: Uuid, order_id: Uuid) -> RepoResult<bool>;

    async fn update(&self, review: &Review) -> RepoResult<()>;

    /// Approved reviews of a product
    async fn list_approved(
        &self,
        product_id: Uuid,
        sort: ReviewSort,
        page: PageRequest,
    ) -> RepoResult<Paginated<Review>>;

    /// Newest first
    async fn list_for_user(&self, user_id: Uuid, page: PageRequest) -> RepoResult<Paginated<Review>>;

    /// Awaiting moderation, oldest first
    async fn list_pending(&self, page: PageRequest) -> RepoResult<Paginated<Review>>;

    /// Summary over the approved reviews of a product
    async fn rating_summary(&self, product_id: Uuid) -> RepoResult<RatingSummary>;
}
