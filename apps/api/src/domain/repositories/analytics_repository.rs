use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::errors::RepoResult;
use crate::domain::analytics::{CustomerAnalytics, DashboardWindows, OrderStats, SalesReport, SalesWindow};

/// Store-wide counters shown on the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreCounts {
    pub total_users: i64,
    pub total_products: i64,
    pub pending_reviews: i64,
    pub low_stock_items: i64,
}

/// Read-only aggregate queries for the admin back office
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    async fn counts(&self) -> RepoResult<StoreCounts>;

    /// Revenue counts only delivered orders
    async fn order_stats(&self, windows: DashboardWindows) -> RepoResult<OrderStats>;

    async fn sales(&self, window: &SalesWindow, now: DateTime<Utc>) -> RepoResult<SalesReport>;

    async fn customers(&self, now: DateTime<Utc>) -> RepoResult<CustomerAnalytics>;
}
