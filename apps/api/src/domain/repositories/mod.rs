// Repository traits (ports)
// Implemented by the PostgreSQL and in-memory adapters in infrastructure

pub mod analytics_repository;
pub mod cart_repository;
pub mod coupon_repository;
pub mod errors;
pub mod inventory_repository;
pub mod order_repository;
pub mod product_repository;
pub mod review_repository;
pub mod user_repository;

pub use analytics_repository::{AnalyticsRepository, StoreCounts};
pub use cart_repository::CartRepository;
pub use coupon_repository::CouponRepository;
pub use errors::{RepoResult, RepositoryError};
pub use inventory_repository::InventoryRepository;
pub use order_repository::{OrderQuery, OrderRepository, Placement};
pub use product_repository::{CatalogRepository, ProductRepository};
pub use review_repository::ReviewRepository;
pub use user_repository::UserRepository;
