use axum::{extract::State, response::Response};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::extract::{AppJson, AppPath};
use crate::api::middleware::AuthUser;
use crate::api::response::Envelope;
use crate::domain::cart::{Cart, CartItem};
use crate::domain::product::VariantRef;
use crate::state::AppState;

/// Cart payload with derived totals
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView<'a> {
    #[serde(flatten)]
    pub cart: &'a Cart,
    pub total_items: i32,
    pub total_price: Decimal,
}

impl<'a> From<&'a Cart> for CartView<'a> {
    fn from(cart: &'a Cart) -> Self {
        Self {
            cart,
            total_items: cart.total_items(),
            total_price: cart.total_price(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    pub variant: VariantRef,
    #[serde(default = "one")]
    pub quantity: i32,
}

fn one() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i32,
}

/// Current user's cart, created empty on first access
///
/// GET /api/cart
pub async fn get_cart(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Response, ApiError> {
    let cart = match state.carts.find_by_user(user.id).await? {
        Some(cart) => cart,
        None => {
            let cart = Cart::new(user.id);
            state.carts.save(&cart).await?;
            cart
        }
    };
    Ok(cart_response(&cart))
}

/// Add a product variant to the cart
///
/// POST /api/cart/add
pub async fn add_item(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppJson(req): AppJson<AddToCartRequest>,
) -> Result<Response, ApiError> {
    if req.quantity < 1 {
        return Err(ApiError::bad_request("Quantity must be at least 1"));
    }

    let product = super::products::find_product(&state, req.product_id).await?;
    if !product.is_active {
        return Err(ApiError::not_found("Product not found"));
    }

    let stock = state
        .inventory
        .find_by_variant(product.id, &req.variant.sku)
        .await?
        .filter(|item| item.has(req.quantity))
        .ok_or_else(|| ApiError::bad_request("Insufficient stock"))?;

    let mut cart = state
        .carts
        .find_by_user(user.id)
        .await?
        .unwrap_or_else(|| Cart::new(user.id));

    match cart.line_for(product.id, &req.variant.sku).map(|line| (line.id, line.quantity)) {
        Some((line_id, current)) => {
            if !stock.has(current + req.quantity) {
                return Err(ApiError::bad_request(
                    "Insufficient stock for requested quantity",
                ));
            }
            cart.increase(line_id, req.quantity)?;
        }
        None => {
            let variant = product
                .variant(&req.variant.sku)
                .ok_or_else(|| ApiError::not_found("Variant not found"))?;
            cart.push(CartItem {
                id: Uuid::new_v4(),
                product_id: product.id,
                product_name: product.name.clone(),
                image: product.primary_image().map(str::to_string),
                variant: variant.into(),
                quantity: req.quantity,
                price: variant.price,
            });
        }
    }

    state.carts.save(&cart).await?;
    Ok(cart_response(&cart))
}

/// Change a line's quantity; zero removes it
///
/// PATCH /api/cart/items/:itemId
pub async fn update_item(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppPath(item_id): AppPath<Uuid>,
    AppJson(req): AppJson<UpdateQuantityRequest>,
) -> Result<Response, ApiError> {
    let mut cart = find_cart(&state, user.id).await?;
    let line = cart
        .item(item_id)
        .ok_or_else(|| ApiError::not_found("Item not found in cart"))?;

    if req.quantity > 0 {
        let in_stock = state
            .inventory
            .find_by_variant(line.product_id, &line.variant.sku)
            .await?
            .is_some_and(|item| item.has(req.quantity));
        if !in_stock {
            return Err(ApiError::bad_request("Insufficient stock"));
        }
    }

    cart.set_quantity(item_id, req.quantity)?;
    state.carts.save(&cart).await?;
    Ok(cart_response(&cart))
}

/// Remove a line
///
/// DELETE /api/cart/items/:itemId
pub async fn remove_item(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppPath(item_id): AppPath<Uuid>,
) -> Result<Response, ApiError> {
    let mut cart = find_cart(&state, user.id).await?;
    cart.remove(item_id);
    state.carts.save(&cart).await?;
    Ok(cart_response(&cart))
}

/// Empty the cart
///
/// DELETE /api/cart/clear
pub async fn clear_cart(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Response, ApiError> {
    let mut cart = find_cart(&state, user.id).await?;
    cart.clear();
    state.carts.save(&cart).await?;
    Ok(cart_response(&cart))
}

async fn find_cart(state: &AppState, user_id: Uuid) -> Result<Cart, ApiError> {
    state
        .carts
        .find_by_user(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Cart not found"))
}

fn cart_response(cart: &Cart) -> Response {
    Envelope::data(json!({ "cart": CartView::from(cart) })).ok()
}
