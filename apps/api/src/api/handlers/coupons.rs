use axum::{extract::State, http::StatusCode, response::Response};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::extract::{AppJson, AppPath};
use crate::api::middleware::AdminUser;
use crate::api::response::Envelope;
use crate::domain::coupon::{normalize_code, Coupon, CouponUpdate, NewCoupon};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCouponRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub total_amount: Decimal,
}

/// Check a coupon against an order amount
///
/// POST /api/coupons/validate
pub async fn validate_coupon(
    State(state): State<AppState>,
    AppJson(req): AppJson<ValidateCouponRequest>,
) -> Result<Response, ApiError> {
    let coupon = state
        .coupons
        .find_by_code(&normalize_code(&req.code))
        .await?
        .filter(|c| c.is_active)
        .ok_or_else(|| ApiError::bad_request("Invalid coupon code"))?;

    let discount_amount = coupon.redeem_preview(req.total_amount, Utc::now())?;

    Ok(Envelope::data(json!({
        "coupon": {
            "code": coupon.code,
            "description": coupon.description,
            "discountType": coupon.discount_type,
            "discountValue": coupon.discount_value,
            "discountAmount": discount_amount,
            "minimumAmount": coupon.minimum_amount,
        }
    }))
    .ok())
}

/// Active coupons (admin)
///
/// GET /api/coupons
pub async fn list_coupons(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Response, ApiError> {
    let coupons = state.coupons.list(Some(true)).await?;
    Ok(Envelope::list("coupons", &coupons).ok())
}

/// Create a coupon (admin)
///
/// POST /api/coupons
pub async fn create_coupon(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    AppJson(req): AppJson<NewCoupon>,
) -> Result<Response, ApiError> {
    let coupon = Coupon::new(req)?;
    state.coupons.create(&coupon).await?;
    tracing::info!(code = %coupon.code, "Coupon created");
    Ok(Envelope::data(json!({ "coupon": coupon })).created())
}

/// Update a coupon (admin)
///
/// PATCH /api/coupons/:id
pub async fn update_coupon(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(update): AppJson<CouponUpdate>,
) -> Result<Response, ApiError> {
    let mut coupon = find_coupon(&state, id).await?;
    coupon.apply(update)?;
    state.coupons.update(&coupon).await?;
    Ok(Envelope::data(json!({ "coupon": coupon })).ok())
}

/// Deactivate a coupon (admin)
///
/// DELETE /api/coupons/:id
pub async fn delete_coupon(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    let mut coupon = find_coupon(&state, id).await?;
    coupon.deactivate();
    state.coupons.update(&coupon).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn find_coupon(state: &AppState, id: Uuid) -> Result<Coupon, ApiError> {
    state
        .coupons
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Coupon not found"))
}
