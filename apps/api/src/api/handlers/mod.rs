// HTTP handlers, one module per resource

pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod coupons;
pub mod health;
pub mod orders;
pub mod payment;
pub mod products;
pub mod reviews;
pub mod users;

use serde::Deserialize;

use crate::domain::pagination::PageRequest;

/// `page` / `limit` query parameters shared by list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    pub fn request(&self) -> PageRequest {
        self.with_default(PageRequest::DEFAULT_LIMIT)
    }

    pub fn with_default(&self, default_limit: i64) -> PageRequest {
        PageRequest::new(self.page, self.limit, default_limit)
    }
}
