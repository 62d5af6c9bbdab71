use async_trait::async_trait;
use uuid::Uuid;

use super::errors::RepoResult;
use crate::domain::pagination::{PageRequest, Paginated};
use crate::domain::product::{Brand, Category, Product, ProductFilter, Rating};

/// Repository trait for products
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, product: &Product) -> RepoResult<()>;

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Product>>;

    async fn update(&self, product: &Product) -> RepoResult<()>;

    async fn list(&self, filter: &ProductFilter, page: PageRequest) -> RepoResult<Paginated<Product>>;

    /// Overwrite the cached review summary
    async fn set_rating(&self, id: Uuid, rating: Rating) -> RepoResult<()>;
}

/// Repository trait for categories and brands
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn create_category(&self, category: &Category) -> RepoResult<()>;

    async fn find_category(&self, id: Uuid) -> RepoResult<Option<Category>>;

    async fn update_category(&self, category: &Category) -> RepoResult<()>;

    /// Ordered by name
    async fn list_categories(&self, active_only: bool) -> RepoResult<Vec<Category>>;

    async fn create_brand(&self, brand: &Brand) -> RepoResult<()>;

    /// Ordered by name
    async fn list_brands(&self, active_only: bool) -> RepoResult<Vec<Brand>>;
}
