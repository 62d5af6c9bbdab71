// Domain layer module exports
// Following Hexagonal Architecture and DDD principles
// Domain is independent of infrastructure concerns

pub mod analytics;
pub mod cart;
pub mod checkout;
pub mod coupon;
pub mod errors;
pub mod inventory;
pub mod money;
pub mod order;
pub mod pagination;
pub mod payments;
pub mod product;
pub mod repositories;
pub mod review;
pub mod user;
