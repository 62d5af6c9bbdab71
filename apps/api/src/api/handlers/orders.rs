use axum::{extract::State, response::Response};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::extract::{AppJson, AppPath, AppQuery};
use crate::api::middleware::{AdminUser, AuthUser};
use crate::api::response::Envelope;
use crate::domain::checkout::CheckoutSummary;
use crate::domain::coupon::normalize_code;
use crate::domain::order::{
    Order, OrderDraft, OrderLine, OrderStatus, Payment, PaymentMethod, PaymentStatus,
    ShippingAddress,
};
use crate::domain::pagination::PageRequest;
use crate::domain::product::VariantRef;
use crate::domain::repositories::{OrderQuery, Placement};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: Uuid,
    pub variant: VariantRef,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub method: PaymentMethod,
}

/// New order; client supplied prices and totals are recomputed
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
    pub shipping_address: Option<ShippingAddress>,
    pub coupon_code: Option<String>,
    pub payment: Option<PaymentRequest>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReasonRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub status: OrderStatus,
    pub note: Option<String>,
    pub tracking_number: Option<String>,
    pub shipping_provider: Option<String>,
}

/// Current user's orders, newest first
///
/// GET /api/orders
pub async fn list_orders(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppQuery(query): AppQuery<OrderListQuery>,
) -> Result<Response, ApiError> {
    let page = PageRequest::new(query.page, query.limit, PageRequest::DEFAULT_LIMIT);
    let filter = OrderQuery {
        user_id: Some(user.id),
        status: query.status,
        search: None,
    };
    let orders = state.orders.list(&filter, page).await?;
    Ok(Envelope::page("orders", &orders).ok())
}

/// One of the current user's orders
///
/// GET /api/orders/:id
pub async fn get_order(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, ApiError> {
    let order = own_order(&state, user.id, id).await?;
    Ok(Envelope::data(json!({ "order": order })).ok())
}

/// Place an order directly (cash on delivery and other offline methods)
///
/// POST /api/orders
pub async fn create_order(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppJson(req): AppJson<CreateOrderRequest>,
) -> Result<Response, ApiError> {
    if req.items.is_empty() {
        return Err(ApiError::bad_request("Order must contain at least one item"));
    }
    if let Some(item) = req.items.iter().find(|i| i.quantity < 1) {
        return Err(ApiError::bad_request(format!(
            "Quantity for {} must be at least 1",
            item.variant.sku
        )));
    }
    let shipping_address = req
        .shipping_address
        .ok_or_else(|| ApiError::bad_request("Shipping address is required"))?;
    let method = req
        .payment
        .map(|p| p.method)
        .ok_or_else(|| ApiError::bad_request("Payment method is required"))?;

    let requested = req
        .items
        .into_iter()
        .map(|item| (item.product_id, item.variant.sku, item.quantity))
        .collect();
    let lines = super::checkout::price_lines(&state, requested).await?;

    let subtotal: Decimal = lines.iter().map(OrderLine::total).sum();
    let coupon = match req.coupon_code.as_deref().map(normalize_code) {
        Some(code) if !code.is_empty() => state
            .coupons
            .find_by_code(&code)
            .await?
            .and_then(|c| super::checkout::applicable(&c, subtotal)),
        _ => None,
    };
    let discount = coupon.as_ref().map_or(Decimal::ZERO, |c| c.discount_amount);
    let summary = CheckoutSummary::compute(subtotal, &shipping_address.state, discount);
    let coupon_code = coupon.map(|c| c.code);

    let order = Order::new(OrderDraft {
        user_id: user.id,
        lines,
        shipping_address,
        summary,
        coupon_code: coupon_code.clone(),
        payment: Payment {
            method,
            payment_intent_id: None,
            status: PaymentStatus::Pending,
            amount: summary.total,
            transaction_id: None,
        },
        status: OrderStatus::Pending,
        notes: req.notes,
    })?;

    let order = state
        .orders
        .place(
            order,
            Placement {
                coupon_code,
                clear_cart: false,
            },
        )
        .await?;

    tracing::info!(order_id = %order.id, order_number = %order.order_number, "Order created");
    Ok(Envelope::data(json!({ "order": order })).created())
}

/// Cancel a pending or confirmed order and restock its items
///
/// PATCH /api/orders/:id/cancel
pub async fn cancel_order(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppPath(id): AppPath<Uuid>,
    body: Option<AppJson<ReasonRequest>>,
) -> Result<Response, ApiError> {
    let mut order = own_order(&state, user.id, id).await?;
    let reason = body.and_then(|AppJson(r)| r.reason);
    order.cancel(reason)?;
    state.orders.cancel(&order).await?;

    tracing::info!(order_id = %order.id, "Order cancelled by customer");
    Ok(Envelope::data(json!({ "order": order })).ok())
}

/// Request a return for a recently delivered order
///
/// PATCH /api/orders/:id/return
pub async fn return_order(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppPath(id): AppPath<Uuid>,
    body: Option<AppJson<ReasonRequest>>,
) -> Result<Response, ApiError> {
    let mut order = own_order(&state, user.id, id).await?;
    let reason = body.and_then(|AppJson(r)| r.reason);
    order.request_return(reason, Utc::now())?;
    state.orders.update(&order).await?;
    Ok(Envelope::data(json!({ "order": order })).ok())
}

/// JSON invoice for an order
///
/// GET /api/orders/:id/invoice
pub async fn invoice(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, ApiError> {
    let order = own_order(&state, user.id, id).await?;
    let items: Vec<_> = order
        .items
        .iter()
        .map(|item| {
            json!({
                "product": item.product_name,
                "variant": item.variant,
                "quantity": item.quantity,
                "price": item.price,
                "total": item.total,
            })
        })
        .collect();

    Ok(Envelope::data(json!({
        "invoice": {
            "orderNumber": order.order_number,
            "date": order.created_at,
            "customer": user.username,
            "shippingAddress": order.shipping_address,
            "items": items,
            "subtotal": order.subtotal,
            "shipping": order.shipping,
            "tax": order.tax,
            "discount": order.discount,
            "total": order.total_amount,
        }
    }))
    .ok())
}

/// Set an order's status (admin)
///
/// PATCH /api/orders/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<StatusUpdateRequest>,
) -> Result<Response, ApiError> {
    let order = apply_status(&state, id, req).await?;
    tracing::info!(order_id = %order.id, status = %order.status, admin_id = %admin.id, "Order status updated");
    Ok(Envelope::data(json!({ "order": order })).ok())
}

/// Records a status change; moving into `cancelled` puts the stock back
pub(crate) async fn apply_status(
    state: &AppState,
    id: Uuid,
    req: StatusUpdateRequest,
) -> Result<Order, ApiError> {
    let mut order = find_order(state, id).await?;
    let was_cancelled = order.status == OrderStatus::Cancelled;

    if let Some(tracking) = req.tracking_number.filter(|t| !t.trim().is_empty()) {
        order.tracking_number = Some(tracking);
    }
    if let Some(provider) = req.shipping_provider.filter(|p| !p.trim().is_empty()) {
        order.shipping_provider = Some(provider);
    }
    order.update_status(req.status, req.note.filter(|n| !n.trim().is_empty()));

    if req.status == OrderStatus::Cancelled && !was_cancelled {
        state.orders.cancel(&order).await?;
    } else {
        state.orders.update(&order).await?;
    }
    Ok(order)
}

pub(crate) async fn find_order(state: &AppState, id: Uuid) -> Result<Order, ApiError> {
    state
        .orders
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order not found"))
}

async fn own_order(state: &AppState, user_id: Uuid, id: Uuid) -> Result<Order, ApiError> {
    let order = find_order(state, id).await?;
    if order.user_id != user_id {
        return Err(ApiError::not_found("Order not found"));
    }
    Ok(order)
}
