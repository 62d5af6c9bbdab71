use axum::{http::Uri, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::api::errors::ApiError;

/// Health check endpoint
///
/// GET /api/health
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "message": "Server is running",
        "timestamp": Utc::now(),
    }))
}

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("Route {} not found", uri.path()))
}
