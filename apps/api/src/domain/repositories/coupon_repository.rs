use async_trait::async_trait;
use uuid::Uuid;

use super::errors::RepoResult;
use crate::domain::coupon::Coupon;

/// Repository trait for coupons
#[async_trait]
pub trait CouponRepository: Send + Sync {
    /// Insert a coupon; a taken code is a `Conflict`
    async fn create(&self, coupon: &Coupon) -> RepoResult<()>;

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Coupon>>;

    /// Lookup by normalized (upper-case) code
    async fn find_by_code(&self, code: &str) -> RepoResult<Option<Coupon>>;

    async fn update(&self, coupon: &Coupon) -> RepoResult<()>;

    /// Newest first, optionally filtered by the active flag
    async fn list(&self, active: Option<bool>) -> RepoResult<Vec<Coupon>>;
}
