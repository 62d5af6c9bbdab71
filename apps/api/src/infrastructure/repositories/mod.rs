// Repository implementations (data access layer)
// Adapters that implement domain repository interfaces

pub mod postgres_analytics_repository;
pub mod postgres_cart_repository;
pub mod postgres_coupon_repository;
pub mod postgres_inventory_repository;
pub mod postgres_order_repository;
pub mod postgres_product_repository;
pub mod postgres_review_repository;
pub mod postgres_user_repository;

pub use postgres_analytics_repository::PostgresAnalyticsRepository;
pub use postgres_cart_repository::PostgresCartRepository;
pub use postgres_coupon_repository::PostgresCouponRepository;
pub use postgres_inventory_repository::PostgresInventoryRepository;
pub use postgres_order_repository::PostgresOrderRepository;
pub use postgres_product_repository::PostgresProductRepository;
pub use postgres_review_repository::PostgresReviewRepository;
pub use postgres_user_repository::PostgresUserRepository;

use crate::domain::repositories::RepositoryError;

/// Maps a unique-constraint violation to a user facing `Conflict`
pub(crate) fn unique_violation(err: sqlx::Error, message: &str) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => RepositoryError::conflict(message),
        _ => RepositoryError::Database(err),
    }
}

/// `%needle%` with LIKE wildcards in `needle` escaped
pub(crate) fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" tee "), "%tee%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
