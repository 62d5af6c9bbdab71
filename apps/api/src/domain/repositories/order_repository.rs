use async_trait::async_trait;
use uuid::Uuid;

use super::errors::RepoResult;
use crate::domain::order::{Order, OrderStatus};
use crate::domain::pagination::{PageRequest, Paginated};

/// Side effects committed together with a new order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placement {
    /// Coupon to redeem; a coupon that is exhausted meanwhile fails the placement
    pub coupon_code: Option<String>,
    /// Empty the customer's cart
    pub clear_cart: bool,
}

/// Admin order listing filter
#[derive(Debug, Clone, Default)]
pub struct OrderQuery {
    pub user_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
    /// Matches the order number or the customer's username
    pub search: Option<String>,
}

/// Repository trait for the Order aggregate
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a new order atomically: reserve its stock, assign the order
    /// number and apply `placement`. Insufficient stock is a `Conflict` and
    /// leaves nothing written.
    async fn place(&self, order: Order, placement: Placement) -> RepoResult<Order>;

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Order>>;

    async fn find_by_payment_intent(&self, intent_id: &str) -> RepoResult<Option<Order>>;

    async fn update(&self, order: &Order) -> RepoResult<()>;

    /// Persist a cancelled order and put its stock back in one step
    async fn cancel(&self, order: &Order) -> RepoResult<()>;

    /// Newest first
    async fn list(&self, query: &OrderQuery, page: PageRequest) -> RepoResult<Paginated<Order>>;
}
