use axum::{extract::State, response::Response};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::extract::AppJson;
use crate::api::middleware::AuthUser;
use crate::api::response::Envelope;
use crate::domain::cart::Cart;
use crate::domain::checkout::CheckoutSummary;
use crate::domain::coupon::{normalize_code, Coupon, DiscountType};
use crate::domain::order::{OrderLine, ShippingAddress};
use crate::domain::user::{Address, User};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRequest {
    pub coupon_code: Option<String>,
    pub shipping_address_id: Option<Uuid>,
}

/// Coupon accepted for a checkout
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedCoupon {
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub discount_amount: Decimal,
}

/// Priced cart ready to be paid for
#[derive(Debug, Clone)]
pub struct Checkout {
    pub cart: Cart,
    pub lines: Vec<OrderLine>,
    pub address: Address,
    pub summary: CheckoutSummary,
    pub coupon: Option<AppliedCoupon>,
}

impl Checkout {
    pub fn shipping_address(&self) -> ShippingAddress {
        ShippingAddress::from(&self.address)
    }

    pub fn coupon_code(&self) -> Option<String> {
        self.coupon.as_ref().map(|c| c.code.clone())
    }
}

/// Price the current cart
///
/// POST /api/checkout/calculate
pub async fn calculate(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppJson(req): AppJson<CalculateRequest>,
) -> Result<Response, ApiError> {
    let checkout = prepare(
        &state,
        &user,
        req.coupon_code.as_deref(),
        req.shipping_address_id,
    )
    .await?;

    Ok(Envelope::data(json!({
        "checkoutSummary": checkout.summary,
        "shippingAddress": checkout.address,
        "cartItems": checkout.cart.items,
        "appliedCoupon": checkout.coupon,
    }))
    .ok())
}

/// Loads the cart, resolves the shipping address and prices the order from
/// the current catalog. An unusable coupon is ignored rather than rejected.
pub(crate) async fn prepare(
    state: &AppState,
    user: &User,
    coupon_code: Option<&str>,
    address_id: Option<Uuid>,
) -> Result<Checkout, ApiError> {
    let mut cart = state
        .carts
        .find_by_user(user.id)
        .await?
        .filter(|cart| !cart.is_empty())
        .ok_or_else(|| ApiError::bad_request("Cart is empty"))?;

    let address = match address_id {
        Some(id) => user.address(id),
        None => user.default_address(),
    }
    .cloned()
    .ok_or_else(|| ApiError::bad_request("No shipping address found"))?;

    let requested = cart
        .items
        .iter()
        .map(|item| (item.product_id, item.variant.sku.clone(), item.quantity))
        .collect();
    let lines = price_lines(state, requested).await?;
    for (item, line) in cart.items.iter_mut().zip(&lines) {
        item.price = line.price;
    }

    let subtotal: Decimal = lines.iter().map(OrderLine::total).sum();
    let coupon = match coupon_code.map(normalize_code).filter(|c| !c.is_empty()) {
        Some(code) => state
            .coupons
            .find_by_code(&code)
            .await?
            .and_then(|coupon| applicable(&coupon, subtotal)),
        None => None,
    };
    let discount = coupon
        .as_ref()
        .map_or(Decimal::ZERO, |c| c.discount_amount);

    Ok(Checkout {
        summary: CheckoutSummary::compute(subtotal, &address.state, discount),
        cart,
        lines,
        address,
        coupon,
    })
}

/// The coupon's discount when it is valid now and its minimum is met
pub(crate) fn applicable(coupon: &Coupon, amount: Decimal) -> Option<AppliedCoupon> {
    let discount_amount = coupon.redeem_preview(amount, Utc::now()).ok()?;
    Some(AppliedCoupon {
        code: coupon.code.clone(),
        description: coupon.description.clone(),
        discount_type: coupon.discount_type,
        discount_value: coupon.discount_value,
        discount_amount,
    })
}

/// Re-prices each requested line from the product catalog
pub(crate) async fn price_lines(
    state: &AppState,
    requested: Vec<(Uuid, String, i32)>,
) -> Result<Vec<OrderLine>, ApiError> {
    let mut lines = Vec::with_capacity(requested.len());
    for (product_id, sku, quantity) in requested {
        let product = super::products::find_product(state, product_id).await?;
        let variant = product
            .variant(&sku)
            .ok_or_else(|| ApiError::not_found("Variant not found"))?;
        lines.push(OrderLine {
            product_id,
            product_name: product.name.clone(),
            variant: variant.into(),
            quantity,
            price: variant.price,
        });
    }
    Ok(lines)
}
