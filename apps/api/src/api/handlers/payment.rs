use std::collections::HashMap;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::extract::AppJson;
use crate::api::middleware::AuthUser;
use crate::api::response::Envelope;
use crate::domain::money::to_minor_units;
use crate::domain::order::{Order, OrderDraft, OrderStatus, Payment, PaymentMethod, PaymentStatus};
use crate::domain::payments::{CreateIntent, CURRENCY};
use crate::domain::repositories::{Placement, RepositoryError};
use crate::domain::user::User;
use crate::state::AppState;

const META_USER: &str = "userId";
const META_COUPON: &str = "couponCode";
const META_ADDRESS: &str = "shippingAddressId";
const META_TOTAL: &str = "total";

/// Checkout payload echoed back by the storefront when paying
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutData {
    pub total: Option<Decimal>,
    pub shipping_address: Option<Value>,
    pub shipping_address_id: Option<Uuid>,
    pub coupon_code: Option<String>,
}

impl CheckoutData {
    fn address_id(&self) -> Option<Uuid> {
        self.shipping_address_id.or_else(|| {
            self.shipping_address
                .as_ref()
                .and_then(|a| a.get("id"))
                .and_then(Value::as_str)
                .and_then(|id| Uuid::parse_str(id).ok())
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentRequest {
    pub checkout_data: Option<CheckoutData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSuccessRequest {
    #[serde(default)]
    pub payment_intent_id: String,
}

#[derive(Debug, Deserialize)]
pub struct FailureDetail {
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentFailureRequest {
    #[serde(default)]
    pub payment_intent_id: String,
    pub error: Option<FailureDetail>,
}

/// Supported payment methods
///
/// GET /api/payment/methods
pub async fn payment_methods(AuthUser(_user): AuthUser) -> Response {
    Envelope::data(json!({
        "paymentMethods": [
            {
                "id": "card",
                "name": "Credit/Debit Card",
                "description": "Pay with Visa, MasterCard, or Rupay",
                "supportedCards": ["visa", "mastercard", "rupay"]
            },
            {
                "id": "upi",
                "name": "UPI",
                "description": "Pay using any UPI app",
                "supportedApps": ["gpay", "phonepe", "paytm", "bhim"]
            },
            {
                "id": "netbanking",
                "name": "Net Banking",
                "description": "Pay using your bank account"
            }
        ]
    }))
    .ok()
}

/// Create a payment intent for the priced cart
///
/// POST /api/payment/create-intent
pub async fn create_intent(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppJson(req): AppJson<CreateIntentRequest>,
) -> Result<Response, ApiError> {
    let data = req
        .checkout_data
        .filter(|d| d.total.is_some_and(|t| t > Decimal::ZERO) && d.shipping_address.is_some())
        .ok_or_else(|| ApiError::bad_request("Invalid checkout data"))?;

    let checkout = super::checkout::prepare(
        &state,
        &user,
        data.coupon_code.as_deref(),
        data.address_id(),
    )
    .await?;
    let amount = to_minor_units(checkout.summary.total)
        .filter(|a| *a > 0)
        .ok_or_else(|| ApiError::bad_request("Invalid checkout data"))?;

    let mut metadata = HashMap::new();
    metadata.insert(META_USER.to_string(), user.id.to_string());
    metadata.insert(META_ADDRESS.to_string(), checkout.address.id.to_string());
    metadata.insert(META_TOTAL.to_string(), checkout.summary.total.to_string());
    if let Some(code) = checkout.coupon_code() {
        metadata.insert(META_COUPON.to_string(), code);
    }

    let intent = state
        .payments
        .create_intent(CreateIntent {
            amount,
            currency: CURRENCY.to_string(),
            metadata,
        })
        .await?;

    tracing::info!(user_id = %user.id, intent_id = %intent.id, amount, "Payment intent created");
    Ok(Envelope::data(json!({
        "clientSecret": intent.client_secret,
        "paymentIntentId": intent.id,
    }))
    .ok())
}

/// Turn a succeeded intent into a confirmed order
///
/// POST /api/payment/success
pub async fn payment_success(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppJson(req): AppJson<PaymentSuccessRequest>,
) -> Result<Response, ApiError> {
    let intent_id = req.payment_intent_id.trim();
    if intent_id.is_empty() {
        return Err(ApiError::bad_request("Payment intent ID is required"));
    }

    if let Some(order) = state.orders.find_by_payment_intent(intent_id).await? {
        return order_response(&user, order);
    }

    let intent = state.payments.retrieve_intent(intent_id).await?;
    if !intent.succeeded() {
        return Err(ApiError::bad_request("Payment not successful"));
    }
    if intent.metadata.get(META_USER) != Some(&user.id.to_string()) {
        return Err(ApiError::forbidden("This payment does not belong to you"));
    }

    let address_id = intent
        .metadata
        .get(META_ADDRESS)
        .and_then(|id| Uuid::parse_str(id).ok());
    let checkout = super::checkout::prepare(
        &state,
        &user,
        intent.metadata.get(META_COUPON).map(String::as_str),
        address_id,
    )
    .await?;

    let charged = to_minor_units(checkout.summary.total);
    let paid_coupon = intent.metadata.get(META_COUPON).cloned();
    if charged != Some(intent.amount) || paid_coupon != checkout.coupon_code() {
        tracing::warn!(
            user_id = %user.id,
            intent_id = %intent.id,
            paid = intent.amount,
            order_total = %checkout.summary.total,
            "Checkout no longer matches the payment"
        );
        return Err(ApiError::bad_request(
            "Your cart changed after payment was started. Please contact support.",
        ));
    }

    let order = Order::new(OrderDraft {
        user_id: user.id,
        lines: checkout.lines.clone(),
        shipping_address: checkout.shipping_address(),
        summary: checkout.summary,
        coupon_code: checkout.coupon_code(),
        payment: Payment {
            method: PaymentMethod::Card,
            payment_intent_id: Some(intent.id.clone()),
            status: PaymentStatus::Completed,
            amount: Decimal::new(intent.amount, 2),
            transaction_id: Some(intent.id.clone()),
        },
        status: OrderStatus::Confirmed,
        notes: None,
    })?;

    let placement = Placement {
        coupon_code: checkout.coupon_code(),
        clear_cart: true,
    };
    let order = match state.orders.place(order, placement).await {
        Ok(order) => order,
        Err(RepositoryError::Conflict(message)) => {
            // a concurrent confirmation may have won the race for this intent
            match state.orders.find_by_payment_intent(intent_id).await? {
                Some(order) => order,
                None => return Err(ApiError::bad_request(message)),
            }
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!(
        order_id = %order.id,
        order_number = %order.order_number,
        intent_id = %intent.id,
        "Order placed from payment"
    );
    order_response(&user, order)
}

/// Record a failed payment
///
/// POST /api/payment/failure
pub async fn payment_failure(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppJson(req): AppJson<PaymentFailureRequest>,
) -> Result<Response, ApiError> {
    if let Some(mut order) = state
        .orders
        .find_by_payment_intent(req.payment_intent_id.trim())
        .await?
        .filter(|order| order.user_id == user.id)
    {
        order.mark_payment_failed();
        state.orders.update(&order).await?;
        tracing::warn!(order_id = %order.id, "Payment failed for order");
    }

    let message = req
        .error
        .and_then(|e| e.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| "Payment failed".to_string());
    Ok(ApiError::bad_request(message).into_response())
}

fn order_response(user: &User, order: Order) -> Result<Response, ApiError> {
    if order.user_id != user.id {
        return Err(ApiError::forbidden("This payment does not belong to you"));
    }
    Ok(Envelope::data(json!({
        "order": order,
        "message": "Payment successful and order created",
    }))
    .ok())
}
