use async_trait::async_trait;
use uuid::Uuid;

use super::errors::RepoResult;
use crate::domain::inventory::{InventoryItem, StockLine};
use crate::domain::pagination::{PageRequest, Paginated};

/// Repository trait for per-variant stock
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// Insert rows for variants that have none yet; existing rows are kept
    async fn ensure(&self, items: &[InventoryItem]) -> RepoResult<()>;

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<InventoryItem>>;

    async fn find_by_variant(&self, product_id: Uuid, sku: &str) -> RepoResult<Option<InventoryItem>>;

    async fn update(&self, item: &InventoryItem) -> RepoResult<()>;

    /// Ascending quantity
    async fn list(&self, low_stock_only: bool, page: PageRequest) -> RepoResult<Paginated<InventoryItem>>;

    /// Put stock back, e.g. for a cancelled order. Unknown variants are skipped.
    async fn release(&self, lines: &[StockLine]) -> RepoResult<()>;
}
