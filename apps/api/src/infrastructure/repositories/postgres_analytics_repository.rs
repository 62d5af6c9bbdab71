use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::domain::analytics::{
    average, new_customer_window, Comparison, CountBucket, CustomerAnalytics, DashboardWindows,
    Granularity, OrderStats, Retention, RevenueSummary, SalesBucket, SalesReport, SalesWindow,
    StatusStat, TopCustomer, TopProduct, TOP_CUSTOMERS, TOP_PRODUCTS,
};
use crate::domain::order::OrderStatus;
use crate::domain::product::ProductImage;
use crate::domain::repositories::{AnalyticsRepository, RepoResult, StoreCounts};

/// PostgreSQL implementation of AnalyticsRepository
pub struct PostgresAnalyticsRepository {
    pool: PgPool,
}

impl PostgresAnalyticsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct CountsRow {
    total_users: i64,
    total_products: i64,
    pending_reviews: i64,
    low_stock_items: i64,
}

#[derive(FromRow)]
struct RevenueRow {
    total: Decimal,
    today: Decimal,
    week: Decimal,
    month: Decimal,
    year: Decimal,
}

#[derive(FromRow)]
struct OrderCountRow {
    total_orders: i64,
    today_orders: i64,
}

#[derive(FromRow)]
struct StatusRow {
    status: OrderStatus,
    count: i64,
    revenue: Decimal,
}

#[derive(FromRow)]
struct TopProductRow {
    product_id: Uuid,
    name: Option<String>,
    images: Option<Json<Vec<ProductImage>>>,
    total_sold: i64,
    total_revenue: Decimal,
}

#[derive(FromRow)]
struct BucketRow {
    date: String,
    revenue: Decimal,
    orders: i64,
    unique_customers: i64,
}

#[derive(FromRow)]
struct ComparisonRow {
    revenue: Decimal,
    orders: i64,
}

#[derive(FromRow)]
struct TopCustomerRow {
    user_id: Uuid,
    username: String,
    total_spent: Decimal,
    order_count: i64,
}

#[derive(FromRow)]
struct RetentionRow {
    total_customers: i64,
    repeat_customers: i64,
}

#[async_trait]
impl AnalyticsRepository for PostgresAnalyticsRepository {
    async fn counts(&self) -> RepoResult<StoreCounts> {
        let row: CountsRow = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS total_users,
                (SELECT COUNT(*) FROM products WHERE is_active) AS total_products,
                (SELECT COUNT(*) FROM reviews WHERE moderated_at IS NULL) AS pending_reviews,
                (SELECT COUNT(*) FROM inventory WHERE is_low_stock) AS low_stock_items
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(StoreCounts {
            total_users: row.total_users,
            total_products: row.total_products,
            pending_reviews: row.pending_reviews,
            low_stock_items: row.low_stock_items,
        })
    }

    async fn order_stats(&self, windows: DashboardWindows) -> RepoResult<OrderStats> {
        let revenue: RevenueRow = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(total_amount), 0) AS total,
                COALESCE(SUM(total_amount) FILTER (WHERE created_at >= $1), 0) AS today,
                COALESCE(SUM(total_amount) FILTER (WHERE created_at >= $2), 0) AS week,
                COALESCE(SUM(total_amount) FILTER (WHERE created_at >= $3), 0) AS month,
                COALESCE(SUM(total_amount) FILTER (WHERE created_at >= $4), 0) AS year
            FROM orders
            WHERE status = 'delivered'
            "#,
        )
        .bind(windows.today)
        .bind(windows.week)
        .bind(windows.month)
        .bind(windows.year)
        .fetch_one(&self.pool)
        .await?;

        let counts: OrderCountRow = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) AS total_orders,
                COUNT(*) FILTER (WHERE created_at >= $1) AS today_orders
            FROM orders
            "#,
        )
        .bind(windows.today)
        .fetch_one(&self.pool)
        .await?;

        let statuses: Vec<StatusRow> = sqlx::query_as(
            r#"
            SELECT status, COUNT(*) AS count, COALESCE(SUM(total_amount), 0) AS revenue
            FROM orders
            GROUP BY status
            ORDER BY count DESC, status::TEXT
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let top: Vec<TopProductRow> = sqlx::query_as(
            r#"
            WITH sold AS (
                SELECT
                    (item->>'productId')::UUID AS product_id,
                    SUM((item->>'quantity')::BIGINT)::BIGINT AS total_sold,
                    SUM((item->>'total')::NUMERIC) AS total_revenue
                FROM orders, jsonb_array_elements(items) AS item
                WHERE status NOT IN ('cancelled', 'payment_failed')
                GROUP BY 1
            )
            SELECT s.product_id, p.name, p.images, s.total_sold, s.total_revenue
            FROM sold s
            LEFT JOIN products p ON p.id = s.product_id
            ORDER BY s.total_sold DESC, s.total_revenue DESC
            LIMIT $1
            "#,
        )
        .bind(TOP_PRODUCTS as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(OrderStats {
            total_orders: counts.total_orders,
            today_orders: counts.today_orders,
            revenue: RevenueSummary {
                total: revenue.total,
                today: revenue.today,
                week: revenue.week,
                month: revenue.month,
                year: revenue.year,
            },
            order_status_stats: statuses
                .into_iter()
                .map(|r| StatusStat {
                    status: r.status,
                    count: r.count,
                    revenue: r.revenue,
                })
                .collect(),
            top_products: top
                .into_iter()
                .map(|r| {
                    let images = r.images.map(|j| j.0).unwrap_or_default();
                    let image = images
                        .iter()
                        .find(|i| i.is_primary)
                        .or_else(|| images.first())
                        .map(|i| i.url.clone());
                    TopProduct {
                        product_id: r.product_id,
                        name: r.name.unwrap_or_default(),
                        total_sold: r.total_sold,
                        total_revenue: r.total_revenue,
                        image,
                    }
                })
                .collect(),
        })
    }

    async fn sales(&self, window: &SalesWindow, now: DateTime<Utc>) -> RepoResult<SalesReport> {
        let rows: Vec<BucketRow> = sqlx::query_as(
            r#"
            SELECT
                to_char(created_at AT TIME ZONE 'UTC', $1) AS date,
                SUM(total_amount) AS revenue,
                COUNT(*) AS orders,
                COUNT(DISTINCT user_id) AS unique_customers
            FROM orders
            WHERE status = 'delivered' AND created_at >= $2 AND created_at < $3
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .bind(window.granularity.pg_format())
        .bind(window.range.start)
        .bind(window.range.end)
        .fetch_all(&self.pool)
        .await?;

        let comparison = match window.comparison(now) {
            Some(range) => {
                let row: ComparisonRow = sqlx::query_as(
                    r#"
                    SELECT COALESCE(SUM(total_amount), 0) AS revenue, COUNT(*) AS orders
                    FROM orders
                    WHERE status = 'delivered' AND created_at >= $1 AND created_at < $2
                    "#,
                )
                .bind(range.start)
                .bind(range.end)
                .fetch_one(&self.pool)
                .await?;
                Some(Comparison {
                    revenue: row.revenue,
                    orders: row.orders,
                })
            }
            None => None,
        };

        Ok(SalesReport {
            period: window.period,
            sales_data: rows
                .into_iter()
                .map(|r| SalesBucket {
                    average_order_value: average(r.revenue, r.orders),
                    date: r.date,
                    revenue: r.revenue,
                    orders: r.orders,
                    unique_customers: r.unique_customers,
                })
                .collect(),
            comparison,
        })
    }

    async fn customers(&self, now: DateTime<Utc>) -> RepoResult<CustomerAnalytics> {
        let window = new_customer_window(now);
        let new_customers: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT to_char(created_at AT TIME ZONE 'UTC', $1) AS date, COUNT(*) AS count
            FROM users
            WHERE role = 'customer' AND created_at >= $2 AND created_at < $3
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .bind(Granularity::Month.pg_format())
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?;

        let top: Vec<TopCustomerRow> = sqlx::query_as(
            r#"
            SELECT o.user_id, COALESCE(u.username, '') AS username,
                   SUM(o.total_amount) AS total_spent, COUNT(*) AS order_count
            FROM orders o
            LEFT JOIN users u ON u.id = o.user_id
            WHERE o.status = 'delivered'
            GROUP BY o.user_id, u.username
            ORDER BY total_spent DESC
            LIMIT $1
            "#,
        )
        .bind(TOP_CUSTOMERS as i64)
        .fetch_all(&self.pool)
        .await?;

        let retention: RetentionRow = sqlx::query_as(
            r#"
            SELECT COUNT(*) AS total_customers,
                   COUNT(*) FILTER (WHERE placed > 1) AS repeat_customers
            FROM (SELECT user_id, COUNT(*) AS placed FROM orders GROUP BY user_id) per_user
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(CustomerAnalytics {
            new_customers: new_customers
                .into_iter()
                .map(|(date, count)| CountBucket { date, count })
                .collect(),
            top_customers: top
                .into_iter()
                .map(|r| TopCustomer {
                    user_id: r.user_id,
                    username: r.username,
                    total_spent: r.total_spent,
                    order_count: r.order_count,
                })
                .collect(),
            retention: Retention::new(retention.total_customers, retention.repeat_customers),
        })
    }
}
