//! Back-office endpoints under `/api/admin`.
//!
//! Every handler requires an [`AdminUser`]. Product, order, review and coupon
//! mutations share their rules with the storefront handlers.

use std::collections::HashMap;

use axum::{extract::State, http::StatusCode, response::Response};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::extract::{AppJson, AppPath, AppQuery};
use crate::api::middleware::AdminUser;
use crate::api::response::Envelope;
use crate::domain::analytics::{DashboardWindows, SalesPeriod, SalesWindow};
use crate::domain::inventory::{InventoryItem, InventoryUpdate};
use crate::domain::order::OrderStatus;
use crate::domain::pagination::PageRequest;
use crate::domain::product::{
    Category, CategoryUpdate, NewCategory, NewProduct, Product, ProductFilter, ProductSort,
    ProductUpdate,
};
use crate::domain::repositories::OrderQuery;
use crate::domain::user::{Profile, Role, User};
use crate::state::AppState;

use super::orders::StatusUpdateRequest;

const RECENT_ORDERS: i64 = 5;
const USER_HISTORY: i64 = 10;
const INVENTORY_PAGE: i64 = 20;

#[derive(Debug, Default, Deserialize)]
pub struct SalesQuery {
    pub period: Option<String>,
    pub year: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminProductQuery {
    pub category: Option<Uuid>,
    pub brand: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminOrderQuery {
    pub status: Option<OrderStatus>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryQuery {
    pub low_stock: Option<bool>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CouponQuery {
    pub active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdateRequest {
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub profile: Option<Profile>,
}

/// Store-wide figures for the dashboard
///
/// GET /api/admin/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Response, ApiError> {
    let now = Utc::now();
    let counts = state.analytics.counts().await?;
    let stats = state.analytics.order_stats(DashboardWindows::at(now)).await?;
    let recent = state
        .orders
        .list(&OrderQuery::default(), PageRequest::first(RECENT_ORDERS))
        .await?;

    Ok(Envelope::data(json!({
        "stats": {
            "totalUsers": counts.total_users,
            "totalProducts": counts.total_products,
            "totalOrders": stats.total_orders,
            "totalRevenue": stats.revenue.total,
            "todayOrders": stats.today_orders,
            "todayRevenue": stats.revenue.today,
            "weeklyRevenue": stats.revenue.week,
            "monthlyRevenue": stats.revenue.month,
            "yearlyRevenue": stats.revenue.year,
            "lowStockProducts": counts.low_stock_items,
            "pendingReviews": counts.pending_reviews,
        },
        "orderStatusStats": stats.order_status_stats,
        "topProducts": stats.top_products,
        "recentOrders": recent.items,
    }))
    .ok())
}

/// Delivered revenue bucketed over a period
///
/// GET /api/admin/analytics/sales
pub async fn sales_analytics(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    AppQuery(query): AppQuery<SalesQuery>,
) -> Result<Response, ApiError> {
    let now = Utc::now();
    let window = SalesWindow::resolve(SalesPeriod::parse(query.period.as_deref()), query.year, now);
    let report = state.analytics.sales(&window, now).await?;
    Ok(Envelope::data(json!(report)).ok())
}

/// New customers, best customers and retention
///
/// GET /api/admin/analytics/customers
pub async fn customer_analytics(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Response, ApiError> {
    let analytics = state.analytics.customers(Utc::now()).await?;
    Ok(Envelope::data(json!(analytics)).ok())
}

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    AppQuery(query): AppQuery<SearchQuery>,
) -> Result<Response, ApiError> {
    let page = PageRequest::new(query.page, query.limit, PageRequest::DEFAULT_LIMIT);
    let search = query.search.as_deref().filter(|s| !s.trim().is_empty());
    let users = state.users.list(search, page).await?;
    Ok(Envelope::page("users", &users).ok())
}

/// A user with their latest orders and reviews
///
/// GET /api/admin/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, ApiError> {
    let user = find_user(&state, id).await?;
    let orders = state
        .orders
        .list(
            &OrderQuery {
                user_id: Some(id),
                ..Default::default()
            },
            PageRequest::first(USER_HISTORY),
        )
        .await?;
    let reviews = state
        .reviews
        .list_for_user(id, PageRequest::first(USER_HISTORY))
        .await?;

    Ok(Envelope::data(json!({
        "user": user,
        "orders": orders.items,
        "reviews": reviews.items,
    }))
    .ok())
}

/// Change a user's role, status or profile
///
/// PATCH /api/admin/users/:id
pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<UserUpdateRequest>,
) -> Result<Response, ApiError> {
    let mut user = find_user(&state, id).await?;
    if let Some(role) = req.role {
        user.role = role;
    }
    if let Some(active) = req.is_active {
        user.is_active = active;
    }
    if let Some(profile) = req.profile {
        user.profile = profile;
    }
    user.touch();
    state.users.update(&user).await?;
    Ok(Envelope::data(json!({ "user": user })).ok())
}

/// DELETE /api/admin/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    if admin.id == id {
        return Err(ApiError::bad_request("You cannot delete your own account"));
    }
    state.users.delete(id).await?;
    tracing::info!(user_id = %id, admin_id = %admin.id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// All products, including inactive ones
///
/// GET /api/admin/products
pub async fn list_products(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    AppQuery(query): AppQuery<AdminProductQuery>,
) -> Result<Response, ApiError> {
    let filter = ProductFilter {
        active: match query.status.as_deref() {
            Some("active") => Some(true),
            Some("inactive") => Some(false),
            _ => None,
        },
        category: query.category,
        brands: ProductFilter::parse_brands(query.brand.as_deref()),
        search: query.search.filter(|s| !s.trim().is_empty()),
        sort: ProductSort::NewestFirst,
        ..Default::default()
    };
    let page = PageRequest::new(query.page, query.limit, PageRequest::DEFAULT_LIMIT);
    let products = state.products.list(&filter, page).await?;
    Ok(Envelope::page("products", &products).ok())
}

/// GET /api/admin/products/:id
pub async fn get_product(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, ApiError> {
    let product = super::products::find_product(&state, id).await?;
    Ok(Envelope::data(json!({ "product": product })).ok())
}

/// POST /api/admin/products
pub async fn create_product(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    AppJson(req): AppJson<NewProduct>,
) -> Result<Response, ApiError> {
    let product = super::products::insert_product(&state, req).await?;
    Ok(Envelope::data(json!({ "product": product })).created())
}

/// PATCH /api/admin/products/:id
pub async fn update_product(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(update): AppJson<ProductUpdate>,
) -> Result<Response, ApiError> {
    let product = super::products::apply_update(&state, id, update).await?;
    Ok(Envelope::data(json!({ "product": product })).ok())
}

/// Soft delete, returning the deactivated product
///
/// DELETE /api/admin/products/:id
pub async fn delete_product(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, ApiError> {
    let product = super::products::deactivate(&state, id).await?;
    Ok(Envelope::data(json!({ "product": product })).ok())
}

/// Orders across all customers
///
/// GET /api/admin/orders
pub async fn list_orders(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    AppQuery(query): AppQuery<AdminOrderQuery>,
) -> Result<Response, ApiError> {
    let filter = OrderQuery {
        user_id: None,
        status: query.status,
        search: query.search.filter(|s| !s.trim().is_empty()),
    };
    let page = PageRequest::new(query.page, query.limit, PageRequest::DEFAULT_LIMIT);
    let orders = state.orders.list(&filter, page).await?;
    Ok(Envelope::page("orders", &orders).ok())
}

/// GET /api/admin/orders/:id
pub async fn get_order(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, ApiError> {
    let order = super::orders::find_order(&state, id).await?;
    let customer = state.users.find_by_id(order.user_id).await?.map(|u| {
        json!({ "id": u.id, "username": u.username, "profile": u.profile })
    });
    Ok(Envelope::data(json!({ "order": order, "customer": customer })).ok())
}

/// PATCH /api/admin/orders/:id/status
pub async fn update_order_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<StatusUpdateRequest>,
) -> Result<Response, ApiError> {
    let order = super::orders::apply_status(&state, id, req).await?;
    tracing::info!(order_id = %order.id, status = %order.status, admin_id = %admin.id, "Order status updated");
    Ok(Envelope::data(json!({ "order": order })).ok())
}

/// Inventory rows, lowest stock first
///
/// GET /api/admin/inventory
pub async fn list_inventory(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    AppQuery(query): AppQuery<InventoryQuery>,
) -> Result<Response, ApiError> {
    let page = PageRequest::new(query.page, query.limit, INVENTORY_PAGE);
    let inventory = state
        .inventory
        .list(query.low_stock.unwrap_or(false), page)
        .await?;

    let mut products = HashMap::new();
    for item in &inventory.items {
        if !products.contains_key(&item.product_id) {
            if let Some(product) = state.products.find_by_id(item.product_id).await? {
                products.insert(item.product_id, product);
            }
        }
    }
    let rows: Vec<_> = inventory
        .items
        .iter()
        .map(|item| inventory_row(item, products.get(&item.product_id)))
        .collect();

    Ok(Envelope::paged("inventory", &rows, inventory.meta()).ok())
}

/// Restock or change the low-stock threshold
///
/// PATCH /api/admin/inventory/:id
pub async fn update_inventory(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(update): AppJson<InventoryUpdate>,
) -> Result<Response, ApiError> {
    let mut item = state
        .inventory
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Inventory item not found"))?;
    item.restock(update)?;
    state.inventory.update(&item).await?;

    tracing::info!(inventory_id = %item.id, quantity = item.quantity, "Inventory updated");
    Ok(Envelope::data(json!({ "inventory": item })).ok())
}

/// All categories by name
///
/// GET /api/admin/categories
pub async fn list_categories(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Response, ApiError> {
    let categories = state.catalog.list_categories(false).await?;
    Ok(Envelope::list("categories", &categories).ok())
}

/// POST /api/admin/categories
pub async fn create_category(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    AppJson(req): AppJson<NewCategory>,
) -> Result<Response, ApiError> {
    if let Some(parent) = req.parent {
        super::products::find_category(&state, parent).await?;
    }
    let category = Category::new(req)?;
    state.catalog.create_category(&category).await?;
    Ok(Envelope::data(json!({ "category": category })).created())
}

/// PATCH /api/admin/categories/:id
pub async fn update_category(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(update): AppJson<CategoryUpdate>,
) -> Result<Response, ApiError> {
    let mut category = super::products::find_category(&state, id).await?;
    category.apply(update)?;
    state.catalog.update_category(&category).await?;
    Ok(Envelope::data(json!({ "category": category })).ok())
}

/// GET /api/admin/coupons
pub async fn list_coupons(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    AppQuery(query): AppQuery<CouponQuery>,
) -> Result<Response, ApiError> {
    let coupons = state.coupons.list(query.active).await?;
    Ok(Envelope::list("coupons", &coupons).ok())
}

async fn find_user(state: &AppState, id: Uuid) -> Result<User, ApiError> {
    state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

fn inventory_row(item: &InventoryItem, product: Option<&Product>) -> Value {
    let mut row = json!(item);
    if let (Some(product), Value::Object(map)) = (product, &mut row) {
        map.insert(
            "product".to_string(),
            json!({
                "id": product.id,
                "name": product.name,
                "image": product.primary_image(),
            }),
        );
    }
    row
}
