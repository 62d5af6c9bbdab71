use async_trait::async_trait;
use uuid::Uuid;

use super::{paginate, MemoryStore};
use crate::domain::pagination::{PageRequest, Paginated};
use crate::domain::repositories::{RepoResult, RepositoryError, ReviewRepository};
use crate::domain::review::{RatingSummary, Review, ReviewSort};

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn create(&self, review: &Review) -> RepoResult<()> {
        let mut t = self.tables.write().await;
        let duplicate = t.reviews.values().any(|r| {
            r.user_id == review.user_id
                && r.product_id == review.product_id
                && r.order_id == review.order_id
        });
        if duplicate {
            return Err(RepositoryError::conflict(
                "You have already reviewed this product for this order",
            ));
        }
        t.reviews.insert(review.id, review.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Review>> {
        Ok(self.tables.read().await.reviews.get(&id).cloned())
    }

    async fn exists(&self, user_id: Uuid, product_id: Uuid, order_id: Uuid) -> RepoResult<bool> {
        let t = self.tables.read().await;
        Ok(t.reviews.values().any(|r| {
            r.user_id == user_id && r.product_id == product_id && r.order_id == order_id
        }))
    }

    async fn update(&self, review: &Review) -> RepoResult<()> {
        let mut t = self.tables.write().await;
        let slot = t
            .reviews
            .get_mut(&review.id)
            .ok_or_else(|| RepositoryError::not_found("Review not found"))?;
        *slot = review.clone();
        Ok(())
    }

    async fn list_approved(
        &self,
        product_id: Uuid,
        sort: ReviewSort,
        page: PageRequest,
    ) -> RepoResult<Paginated<Review>> {
        let t = self.tables.read().await;
        let mut reviews: Vec<Review> = t
            .reviews
            .values()
            .filter(|r| r.product_id == product_id && r.is_approved)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| sort.compare(a, b));
        Ok(paginate(reviews, page))
    }

    async fn list_for_user(&self, user_id: Uuid, page: PageRequest) -> RepoResult<Paginated<Review>> {
        let t = self.tables.read().await;
        let mut reviews: Vec<Review> = t
            .reviews
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| ReviewSort::Newest.compare(a, b));
        Ok(paginate(reviews, page))
    }

    async fn list_pending(&self, page: PageRequest) -> RepoResult<Paginated<Review>> {
        let t = self.tables.read().await;
        let mut reviews: Vec<Review> = t
            .reviews
            .values()
            .filter(|r| r.is_pending())
            .cloned()
            .collect();
        reviews.sort_by(|a, b| ReviewSort::Oldest.compare(a, b));
        Ok(paginate(reviews, page))
    }

    async fn rating_summary(&self, product_id: Uuid) -> RepoResult<RatingSummary> {
        let t = self.tables.read().await;
        let ratings: Vec<i16> = t
            .reviews
            .values()
            .filter(|r| r.product_id == product_id && r.is_approved)
            .map(|r| r.rating)
            .collect();
        Ok(RatingSummary::from_ratings(&ratings))
    }
}
