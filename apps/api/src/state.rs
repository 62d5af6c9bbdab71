//! Shared application state handed to every handler.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AuthSettings;
use crate::domain::payments::PaymentGateway;
use crate::domain::repositories::{
    AnalyticsRepository, CartRepository, CatalogRepository, CouponRepository, InventoryRepository,
    OrderRepository, ProductRepository, ReviewRepository, UserRepository,
};
use crate::infrastructure::memory::MemoryStore;
use crate::infrastructure::repositories::{
    PostgresAnalyticsRepository, PostgresCartRepository, PostgresCouponRepository,
    PostgresInventoryRepository, PostgresOrderRepository, PostgresProductRepository,
    PostgresReviewRepository, PostgresUserRepository,
};

/// Repositories, payment gateway and auth settings behind cheap clones
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub catalog: Arc<dyn CatalogRepository>,
    pub inventory: Arc<dyn InventoryRepository>,
    pub carts: Arc<dyn CartRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub coupons: Arc<dyn CouponRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub analytics: Arc<dyn AnalyticsRepository>,
    pub payments: Arc<dyn PaymentGateway>,
    pub auth: AuthSettings,
}

impl AppState {
    /// State backed by `PostgreSQL` repositories sharing one pool
    pub fn postgres(pool: PgPool, payments: Arc<dyn PaymentGateway>, auth: AuthSettings) -> Self {
        let products = Arc::new(PostgresProductRepository::new(pool.clone()));
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            products: products.clone(),
            catalog: products,
            inventory: Arc::new(PostgresInventoryRepository::new(pool.clone())),
            carts: Arc::new(PostgresCartRepository::new(pool.clone())),
            orders: Arc::new(PostgresOrderRepository::new(pool.clone())),
            coupons: Arc::new(PostgresCouponRepository::new(pool.clone())),
            reviews: Arc::new(PostgresReviewRepository::new(pool.clone())),
            analytics: Arc::new(PostgresAnalyticsRepository::new(pool)),
            payments,
            auth,
        }
    }

    /// State backed by a single in-memory store
    pub fn in_memory(store: MemoryStore, payments: Arc<dyn PaymentGateway>, auth: AuthSettings) -> Self {
        Self {
            users: Arc::new(store.clone()),
            products: Arc::new(store.clone()),
            catalog: Arc::new(store.clone()),
            inventory: Arc::new(store.clone()),
            carts: Arc::new(store.clone()),
            orders: Arc::new(store.clone()),
            coupons: Arc::new(store.clone()),
            reviews: Arc::new(store.clone()),
            analytics: Arc::new(store),
            payments,
            auth,
        }
    }
}
