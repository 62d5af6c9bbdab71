use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::extract::{AppJson, AppPath, AppQuery};
use crate::api::middleware::AdminUser;
use crate::api::response::Envelope;
use crate::domain::inventory::InventoryItem;
use crate::domain::pagination::PageRequest;
use crate::domain::product::{
    Brand, Category, NewBrand, NewCategory, NewProduct, Product, ProductFilter, ProductSort,
    ProductUpdate,
};
use crate::state::AppState;

/// Public catalog query string
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub category: Option<Uuid>,
    pub brand: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_rating: Option<f64>,
    pub search: Option<String>,
    pub featured: Option<bool>,
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ProductQuery {
    fn filter(&self) -> ProductFilter {
        ProductFilter {
            active: Some(true),
            category: self.category,
            brands: ProductFilter::parse_brands(self.brand.as_deref()),
            min_price: self.min_price,
            max_price: self.max_price,
            min_rating: self.min_rating,
            search: self.search.clone().filter(|s| !s.trim().is_empty()),
            featured: self.featured,
            sort: ProductSort::parse(self.sort.as_deref()),
        }
    }
}

/// List active products
///
/// GET /api/products
pub async fn list_products(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ProductQuery>,
) -> Result<Response, ApiError> {
    let page = PageRequest::new(query.page, query.limit, PageRequest::DEFAULT_LIMIT);
    let products = state.products.list(&query.filter(), page).await?;
    Ok(Envelope::page("products", &products).ok())
}

/// Get a single product
///
/// GET /api/products/:id
pub async fn get_product(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, ApiError> {
    let product = state
        .products
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;
    Ok(Envelope::data(json!({ "product": product })).ok())
}

/// Active categories
///
/// GET /api/products/categories
pub async fn list_categories(State(state): State<AppState>) -> Result<Response, ApiError> {
    let categories = state.catalog.list_categories(true).await?;
    Ok(Envelope::list("categories", &categories).ok())
}

/// Active brands
///
/// GET /api/products/brands
pub async fn list_brands(State(state): State<AppState>) -> Result<Response, ApiError> {
    let brands = state.catalog.list_brands(true).await?;
    Ok(Envelope::list("brands", &brands).ok())
}

/// Create a product (admin)
///
/// POST /api/products
pub async fn create_product(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    AppJson(req): AppJson<NewProduct>,
) -> Result<Response, ApiError> {
    let product = insert_product(&state, req).await?;
    Ok(Envelope::data(json!({ "product": product })).created())
}

/// Partially update a product (admin)
///
/// PATCH /api/products/:id
pub async fn update_product(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(update): AppJson<ProductUpdate>,
) -> Result<Response, ApiError> {
    let product = apply_update(&state, id, update).await?;
    Ok(Envelope::data(json!({ "product": product })).ok())
}

/// Soft delete a product (admin)
///
/// DELETE /api/products/:id
pub async fn delete_product(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    deactivate(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create a category (admin)
///
/// POST /api/products/categories
pub async fn create_category(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    AppJson(req): AppJson<NewCategory>,
) -> Result<Response, ApiError> {
    if let Some(parent) = req.parent {
        find_category(&state, parent).await?;
    }
    let category = Category::new(req)?;
    state.catalog.create_category(&category).await?;
    Ok(Envelope::data(json!({ "category": category })).created())
}

/// Create a brand (admin)
///
/// POST /api/products/brands
pub async fn create_brand(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    AppJson(req): AppJson<NewBrand>,
) -> Result<Response, ApiError> {
    let brand = Brand::new(req)?;
    state.catalog.create_brand(&brand).await?;
    Ok(Envelope::data(json!({ "brand": brand })).created())
}

pub(crate) async fn find_product(state: &AppState, id: Uuid) -> Result<Product, ApiError> {
    state
        .products
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))
}

pub(crate) async fn find_category(state: &AppState, id: Uuid) -> Result<Category, ApiError> {
    state
        .catalog
        .find_category(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category not found"))
}

/// Validates and stores a product, then opens one inventory row per variant
pub(crate) async fn insert_product(state: &AppState, req: NewProduct) -> Result<Product, ApiError> {
    let product = Product::new(req)?;
    find_category(state, product.category_id).await?;

    state.products.create(&product).await?;
    state.inventory.ensure(&inventory_rows(&product)).await?;

    tracing::info!(product_id = %product.id, name = %product.name, "Product created");
    Ok(product)
}

pub(crate) async fn apply_update(
    state: &AppState,
    id: Uuid,
    update: ProductUpdate,
) -> Result<Product, ApiError> {
    let mut product = find_product(state, id).await?;
    if let Some(category) = update.category {
        find_category(state, category).await?;
    }
    let variants_changed = update.variants.is_some();
    product.apply(update)?;

    state.products.update(&product).await?;
    if variants_changed {
        state.inventory.ensure(&inventory_rows(&product)).await?;
    }
    Ok(product)
}

pub(crate) async fn deactivate(state: &AppState, id: Uuid) -> Result<Product, ApiError> {
    let mut product = find_product(state, id).await?;
    product.deactivate();
    state.products.update(&product).await?;
    tracing::info!(product_id = %product.id, "Product deactivated");
    Ok(product)
}

fn inventory_rows(product: &Product) -> Vec<InventoryItem> {
    product
        .variants
        .iter()
        .map(|variant| InventoryItem::new(product.id, variant.into(), variant.stock))
        .collect()
}
