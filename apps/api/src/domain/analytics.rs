//! Admin reporting types and the time windows they cover
//!
//! The Postgres repository computes these with SQL aggregates; the in-memory
//! store folds over its orders with [`bucket_sales`].

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::money::round_money;
use super::order::{Order, OrderStatus};

/// Period selector of the sales report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SalesPeriod {
    Day,
    Week,
    Month,
    Year,
}

impl SalesPeriod {
    /// Unknown or missing periods fall back to `Month`
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.unwrap_or_default() {
            "day" => Self::Day,
            "week" => Self::Week,
            "year" => Self::Year,
            _ => Self::Month,
        }
    }
}

/// Bucket size of a sales report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Hour,
    Day,
    Month,
}

impl Granularity {
    pub fn label(&self, at: DateTime<Utc>) -> String {
        match self {
            Self::Hour => at.format("%Y-%m-%d %H:00").to_string(),
            Self::Day => at.format("%Y-%m-%d").to_string(),
            Self::Month => at.format("%Y-%m").to_string(),
        }
    }

    /// Equivalent `to_char` pattern for PostgreSQL
    pub fn pg_format(&self) -> &'static str {
        match self {
            Self::Hour => "YYYY-MM-DD HH24:00",
            Self::Day => "YYYY-MM-DD",
            Self::Month => "YYYY-MM",
        }
    }
}

/// Half-open time range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }
}

fn midnight(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(chrono::NaiveTime::MIN))
}

fn month_start(year: i32, month: u32) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, 1).map(midnight)
}

/// Range and bucket size of a sales report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalesWindow {
    pub period: SalesPeriod,
    pub range: TimeWindow,
    pub granularity: Granularity,
}

impl SalesWindow {
    /// Resolves the report window at `now`. `year` only applies to `Year` and
    /// defaults to the current year.
    pub fn resolve(period: SalesPeriod, year: Option<i32>, now: DateTime<Utc>) -> Self {
        let today = midnight(now.date_naive());
        // Rolling windows include orders created at `now`
        let end = now + Duration::seconds(1);
        let (range, granularity) = match period {
            SalesPeriod::Day => (TimeWindow { start: today, end }, Granularity::Hour),
            SalesPeriod::Week => (
                TimeWindow { start: now - Duration::days(7), end },
                Granularity::Day,
            ),
            SalesPeriod::Month => (
                TimeWindow {
                    start: month_start(now.year(), now.month()).unwrap_or(today),
                    end,
                },
                Granularity::Day,
            ),
            SalesPeriod::Year => {
                let year = year.unwrap_or_else(|| now.year());
                let start = month_start(year, 1).unwrap_or(today);
                let end = month_start(year + 1, 1).unwrap_or(end);
                (TimeWindow { start, end }, Granularity::Month)
            }
        };
        Self { period, range, granularity }
    }

    /// Previous calendar month, only reported for the `Month` period
    pub fn comparison(&self, now: DateTime<Utc>) -> Option<TimeWindow> {
        if self.period != SalesPeriod::Month {
            return None;
        }
        let this_month = month_start(now.year(), now.month())?;
        let (year, month) = if now.month() == 1 {
            (now.year() - 1, 12)
        } else {
            (now.year(), now.month() - 1)
        };
        Some(TimeWindow {
            start: month_start(year, month)?,
            end: this_month,
        })
    }
}

/// The last `NEW_CUSTOMER_BUCKETS` calendar months, current month included
pub fn new_customer_window(now: DateTime<Utc>) -> TimeWindow {
    let months_back = NEW_CUSTOMER_BUCKETS as i32 - 1;
    let index = now.year() * 12 + now.month0() as i32 - months_back;
    let start = month_start(index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
        .unwrap_or_else(|| midnight(now.date_naive()));
    TimeWindow {
        start,
        end: now + Duration::seconds(1),
    }
}

/// Reference instants for the dashboard revenue figures
#[derive(Debug, Clone, Copy)]
pub struct DashboardWindows {
    pub today: DateTime<Utc>,
    pub week: DateTime<Utc>,
    pub month: DateTime<Utc>,
    pub year: DateTime<Utc>,
}

impl DashboardWindows {
    pub fn at(now: DateTime<Utc>) -> Self {
        let today = midnight(now.date_naive());
        Self {
            today,
            week: now - Duration::days(7),
            month: month_start(now.year(), now.month()).unwrap_or(today),
            year: month_start(now.year(), 1).unwrap_or(today),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesBucket {
    pub date: String,
    pub revenue: Decimal,
    pub orders: i64,
    pub average_order_value: Decimal,
    pub unique_customers: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Comparison {
    pub revenue: Decimal,
    pub orders: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub period: SalesPeriod,
    pub sales_data: Vec<SalesBucket>,
    pub comparison: Option<Comparison>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueSummary {
    pub total: Decimal,
    pub today: Decimal,
    pub week: Decimal,
    pub month: Decimal,
    pub year: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusStat {
    pub status: OrderStatus,
    pub count: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub product_id: Uuid,
    pub name: String,
    pub total_sold: i64,
    pub total_revenue: Decimal,
    pub image: Option<String>,
}

/// Order-side figures of the admin dashboard
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub total_orders: i64,
    pub today_orders: i64,
    pub revenue: RevenueSummary,
    pub order_status_stats: Vec<StatusStat>,
    pub top_products: Vec<TopProduct>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountBucket {
    pub date: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopCustomer {
    pub user_id: Uuid,
    pub username: String,
    pub total_spent: Decimal,
    pub order_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Retention {
    pub total_customers: i64,
    pub repeat_customers: i64,
    pub retention_rate: Decimal,
}

impl Retention {
    pub fn new(total_customers: i64, repeat_customers: i64) -> Self {
        let retention_rate = if total_customers > 0 {
            round_money(Decimal::from(repeat_customers) * Decimal::from(100) / Decimal::from(total_customers))
        } else {
            Decimal::ZERO
        };
        Self {
            total_customers,
            repeat_customers,
            retention_rate,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAnalytics {
    pub new_customers: Vec<CountBucket>,
    pub top_customers: Vec<TopCustomer>,
    pub retention: Retention,
}

pub const TOP_PRODUCTS: usize = 5;
pub const TOP_CUSTOMERS: usize = 10;
pub const NEW_CUSTOMER_BUCKETS: usize = 12;

pub(crate) fn average(revenue: Decimal, orders: i64) -> Decimal {
    if orders == 0 {
        Decimal::ZERO
    } else {
        round_money(revenue / Decimal::from(orders))
    }
}

/// Groups delivered orders inside `window` into ascending buckets
pub fn bucket_sales<'a>(orders: impl IntoIterator<Item = &'a Order>, window: &SalesWindow) -> Vec<SalesBucket> {
    let mut buckets: BTreeMap<String, (Decimal, i64, HashSet<Uuid>)> = BTreeMap::new();
    for order in orders {
        if order.status != OrderStatus::Delivered || !window.range.contains(order.created_at) {
            continue;
        }
        let entry = buckets
            .entry(window.granularity.label(order.created_at))
            .or_default();
        entry.0 += order.total_amount;
        entry.1 += 1;
        entry.2.insert(order.user_id);
    }
    buckets
        .into_iter()
        .map(|(date, (revenue, orders, customers))| SalesBucket {
            date,
            revenue,
            orders,
            average_order_value: average(revenue, orders),
            unique_customers: customers.len() as i64,
        })
        .collect()
}

/// Revenue and count of delivered orders inside `window`
pub fn compare<'a>(orders: impl IntoIterator<Item = &'a Order>, window: &TimeWindow) -> Comparison {
    orders
        .into_iter()
        .filter(|o| o.status == OrderStatus::Delivered && window.contains(o.created_at))
        .fold(Comparison::default(), |acc, o| Comparison {
            revenue: acc.revenue + o.total_amount,
            orders: acc.orders + 1,
        })
}
