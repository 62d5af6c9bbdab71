use axum::{extract::State, response::Response};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::extract::{AppJson, AppPath, AppQuery};
use crate::api::middleware::{AdminUser, AuthUser};
use crate::api::response::Envelope;
use crate::domain::order::OrderStatus;
use crate::domain::pagination::PageRequest;
use crate::domain::product::Rating;
use crate::domain::review::{ModerationAction, NewReview, Review, ReviewSort};
use crate::state::AppState;

use super::PageQuery;

#[derive(Debug, Default, Deserialize)]
pub struct ProductReviewsQuery {
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ModerateRequest {
    pub action: ModerationAction,
    pub response: Option<String>,
}

/// Approved reviews of a product with its rating breakdown
///
/// GET /api/reviews/product/:productId
pub async fn product_reviews(
    State(state): State<AppState>,
    AppPath(product_id): AppPath<Uuid>,
    AppQuery(query): AppQuery<ProductReviewsQuery>,
) -> Result<Response, ApiError> {
    let page = PageRequest::new(query.page, query.limit, PageRequest::DEFAULT_LIMIT);
    let sort = ReviewSort::parse(query.sort.as_deref());

    let reviews = state.reviews.list_approved(product_id, sort, page).await?;
    let summary = state.reviews.rating_summary(product_id).await?;

    let mut envelope = Envelope::page("reviews", &reviews);
    envelope.insert("ratingSummary", json!(summary));
    Ok(envelope.ok())
}

/// Reviews written by the current user
///
/// GET /api/reviews/my-reviews
pub async fn my_reviews(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppQuery(query): AppQuery<PageQuery>,
) -> Result<Response, ApiError> {
    let reviews = state.reviews.list_for_user(user.id, query.request()).await?;
    Ok(Envelope::page("reviews", &reviews).ok())
}

/// Review a product from a delivered order
///
/// POST /api/reviews
pub async fn create_review(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppJson(req): AppJson<NewReview>,
) -> Result<Response, ApiError> {
    let order = state
        .orders
        .find_by_id(req.order_id)
        .await?
        .filter(|o| o.user_id == user.id && o.status == OrderStatus::Delivered)
        .ok_or_else(|| ApiError::bad_request("Order not found or not delivered"))?;

    if !order.contains_product(req.product_id) {
        return Err(ApiError::bad_request("Product not found in this order"));
    }
    if state
        .reviews
        .exists(user.id, req.product_id, order.id)
        .await?
    {
        return Err(ApiError::bad_request(
            "You have already reviewed this product for this order",
        ));
    }

    let review = Review::new(req, user.id, user.username.as_str())?;
    state.reviews.create(&review).await?;
    refresh_rating(&state, review.product_id).await?;

    tracing::info!(review_id = %review.id, product_id = %review.product_id, "Review submitted");
    Ok(Envelope::data(json!({ "review": review })).created())
}

/// Toggle the current user's helpful mark
///
/// PATCH /api/reviews/:reviewId/helpful
pub async fn toggle_helpful(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppPath(review_id): AppPath<Uuid>,
) -> Result<Response, ApiError> {
    let mut review = find_review(&state, review_id).await?;
    let action = review.toggle_helpful(user.id);
    state.reviews.update(&review).await?;

    Ok(Envelope::data(json!({
        "helpfulCount": review.helpful_count,
        "action": action,
    }))
    .ok())
}

/// Reviews awaiting moderation, oldest first (admin)
///
/// GET /api/reviews/admin/pending
pub async fn pending_reviews(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    AppQuery(query): AppQuery<PageQuery>,
) -> Result<Response, ApiError> {
    let reviews = state.reviews.list_pending(query.request()).await?;
    Ok(Envelope::page("reviews", &reviews).ok())
}

/// Approve or reject a review (admin)
///
/// PATCH /api/reviews/admin/:reviewId/moderate
pub async fn moderate_review(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppPath(review_id): AppPath<Uuid>,
    AppJson(req): AppJson<ModerateRequest>,
) -> Result<Response, ApiError> {
    let mut review = find_review(&state, review_id).await?;
    review.moderate(req.action, req.response, admin.id);
    state.reviews.update(&review).await?;
    refresh_rating(&state, review.product_id).await?;

    tracing::info!(review_id = %review.id, approved = review.is_approved, admin_id = %admin.id, "Review moderated");
    Ok(Envelope::data(json!({ "review": review })).ok())
}

/// Recomputes the product's stored rating from its approved reviews
pub(crate) async fn refresh_rating(state: &AppState, product_id: Uuid) -> Result<(), ApiError> {
    let summary = state.reviews.rating_summary(product_id).await?;
    state
        .products
        .set_rating(
            product_id,
            Rating {
                average: summary.average,
                count: summary.count,
            },
        )
        .await?;
    Ok(())
}

async fn find_review(state: &AppState, id: Uuid) -> Result<Review, ApiError> {
    state
        .reviews
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Review not found"))
}
