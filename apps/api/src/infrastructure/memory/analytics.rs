use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::MemoryStore;
use crate::domain::analytics::{
    bucket_sales, compare, new_customer_window, CountBucket, CustomerAnalytics, DashboardWindows,
    Granularity, OrderStats, Retention, RevenueSummary, SalesReport, SalesWindow, StatusStat,
    TopCustomer, TopProduct, TOP_CUSTOMERS, TOP_PRODUCTS,
};
use crate::domain::order::{Order, OrderStatus};
use crate::domain::repositories::{AnalyticsRepository, RepoResult, StoreCounts};
use crate::domain::user::Role;

fn counts_towards_sales(order: &Order) -> bool {
    !matches!(order.status, OrderStatus::Cancelled | OrderStatus::PaymentFailed)
}

#[async_trait]
impl AnalyticsRepository for MemoryStore {
    async fn counts(&self) -> RepoResult<StoreCounts> {
        let t = self.tables.read().await;
        Ok(StoreCounts {
            total_users: t.users.len() as i64,
            total_products: t.products.values().filter(|p| p.is_active).count() as i64,
            pending_reviews: t.reviews.values().filter(|r| r.is_pending()).count() as i64,
            low_stock_items: t.inventory.values().filter(|i| i.is_low_stock).count() as i64,
        })
    }

    async fn order_stats(&self, windows: DashboardWindows) -> RepoResult<OrderStats> {
        let t = self.tables.read().await;

        let mut revenue = RevenueSummary::default();
        for order in t.orders.values().filter(|o| o.status == OrderStatus::Delivered) {
            let amount = order.total_amount;
            revenue.total += amount;
            if order.created_at >= windows.today {
                revenue.today += amount;
            }
            if order.created_at >= windows.week {
                revenue.week += amount;
            }
            if order.created_at >= windows.month {
                revenue.month += amount;
            }
            if order.created_at >= windows.year {
                revenue.year += amount;
            }
        }

        let mut by_status: HashMap<OrderStatus, (i64, Decimal)> = HashMap::new();
        for order in t.orders.values() {
            let entry = by_status.entry(order.status).or_default();
            entry.0 += 1;
            entry.1 += order.total_amount;
        }
        let mut order_status_stats: Vec<StatusStat> = by_status
            .into_iter()
            .map(|(status, (count, revenue))| StatusStat { status, count, revenue })
            .collect();
        order_status_stats.sort_by(|a, b| b.count.cmp(&a.count).then(a.status.as_str().cmp(b.status.as_str())));

        let mut sold: HashMap<Uuid, (i64, Decimal)> = HashMap::new();
        for item in t
            .orders
            .values()
            .filter(|o| counts_towards_sales(o))
            .flat_map(|o| o.items.iter())
        {
            let entry = sold.entry(item.product_id).or_default();
            entry.0 += i64::from(item.quantity);
            entry.1 += item.total;
        }
        let mut top_products: Vec<TopProduct> = sold
            .into_iter()
            .map(|(product_id, (total_sold, total_revenue))| {
                let product = t.products.get(&product_id);
                TopProduct {
                    product_id,
                    name: product.map(|p| p.name.clone()).unwrap_or_default(),
                    total_sold,
                    total_revenue,
                    image: product.and_then(|p| p.primary_image().map(str::to_string)),
                }
            })
            .collect();
        top_products.sort_by(|a, b| b.total_sold.cmp(&a.total_sold).then(b.total_revenue.cmp(&a.total_revenue)));
        top_products.truncate(TOP_PRODUCTS);

        Ok(OrderStats {
            total_orders: t.orders.len() as i64,
            today_orders: t
                .orders
                .values()
                .filter(|o| o.created_at >= windows.today)
                .count() as i64,
            revenue,
            order_status_stats,
            top_products,
        })
    }

    async fn sales(&self, window: &SalesWindow, now: DateTime<Utc>) -> RepoResult<SalesReport> {
        let t = self.tables.read().await;
        Ok(SalesReport {
            period: window.period,
            sales_data: bucket_sales(t.orders.values(), window),
            comparison: window
                .comparison(now)
                .map(|range| compare(t.orders.values(), &range)),
        })
    }

    async fn customers(&self, now: DateTime<Utc>) -> RepoResult<CustomerAnalytics> {
        let t = self.tables.read().await;

        let window = new_customer_window(now);
        let mut signups: HashMap<String, i64> = HashMap::new();
        for user in t
            .users
            .values()
            .filter(|u| u.role == Role::Customer && window.contains(u.created_at))
        {
            *signups.entry(Granularity::Month.label(user.created_at)).or_default() += 1;
        }
        let mut new_customers: Vec<CountBucket> = signups
            .into_iter()
            .map(|(date, count)| CountBucket { date, count })
            .collect();
        new_customers.sort_by(|a, b| a.date.cmp(&b.date));

        let mut spend: HashMap<Uuid, (Decimal, i64)> = HashMap::new();
        let mut order_counts: HashMap<Uuid, i64> = HashMap::new();
        for order in t.orders.values() {
            *order_counts.entry(order.user_id).or_default() += 1;
            if order.status == OrderStatus::Delivered {
                let entry = spend.entry(order.user_id).or_default();
                entry.0 += order.total_amount;
                entry.1 += 1;
            }
        }
        let mut top_customers: Vec<TopCustomer> = spend
            .into_iter()
            .map(|(user_id, (total_spent, order_count))| TopCustomer {
                user_id,
                username: t
                    .users
                    .get(&user_id)
                    .map(|u| u.username.to_string())
                    .unwrap_or_default(),
                total_spent,
                order_count,
            })
            .collect();
        top_customers.sort_by(|a, b| b.total_spent.cmp(&a.total_spent));
        top_customers.truncate(TOP_CUSTOMERS);

        let repeat = order_counts.values().filter(|n| **n > 1).count() as i64;
        Ok(CustomerAnalytics {
            new_customers,
            top_customers,
            retention: Retention::new(order_counts.len() as i64, repeat),
        })
    }
}
