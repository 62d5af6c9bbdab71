//! In-memory adapters for every repository trait
//!
//! All tables live behind a single `RwLock`, so multi-table writes such as
//! order placement are atomic. Used by `STORE_BACKEND=memory` and the HTTP
//! test suite.

mod analytics;
mod catalog;
mod orders;
mod reviews;
mod users;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::cart::Cart;
use crate::domain::coupon::Coupon;
use crate::domain::inventory::InventoryItem;
use crate::domain::order::Order;
use crate::domain::pagination::{PageRequest, Paginated};
use crate::domain::product::{Brand, Category, Product};
use crate::domain::review::Review;
use crate::domain::user::User;

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    products: HashMap<Uuid, Product>,
    categories: HashMap<Uuid, Category>,
    brands: HashMap<Uuid, Brand>,
    inventory: HashMap<Uuid, InventoryItem>,
    /// Keyed by user id
    carts: HashMap<Uuid, Cart>,
    orders: HashMap<Uuid, Order>,
    coupons: HashMap<Uuid, Coupon>,
    reviews: HashMap<Uuid, Review>,
}

/// Shared in-memory store; clones share the same tables
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Paginates an already filtered and sorted list
fn paginate<T: Clone>(items: Vec<T>, page: PageRequest) -> Paginated<T> {
    let total = items.len() as i64;
    Paginated::new(page.slice(&items), total, page)
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
