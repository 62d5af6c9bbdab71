use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::auth::AuthError;
use crate::domain::errors::DomainError;
use crate::domain::payments::PaymentError;
use crate::domain::repositories::RepositoryError;

const INTERNAL_MESSAGE: &str = "Something went wrong!";
const PAYMENT_REJECTED_MESSAGE: &str = "Payment could not be processed";

/// API error type with HTTP status code and message
///
/// 4xx errors render as `{"status":"fail","message":...}`, 5xx errors as
/// `{"status":"error","message":...}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    /// Creates a new API error
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Creates a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Creates a 401 Unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// Creates a 403 Forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    /// Creates a 404 Not Found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Creates a 500 Internal Server Error
    ///
    /// `detail` is logged; clients only see a generic message.
    pub fn internal_server_error(detail: impl std::fmt::Display) -> Self {
        tracing::error!(error = %detail, "Internal server error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.status.is_server_error() {
            "error"
        } else {
            "fail"
        };
        let body = Json(json!({
            "status": status,
            "message": self.message
        }));

        (self.status, body).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound(message) => Self::not_found(message),
            other => Self::bad_request(other.to_string()),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(message) => Self::not_found(message),
            RepositoryError::Conflict(message) => Self::bad_request(message),
            other => Self::internal_server_error(other),
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::NotFound => Self::not_found("Payment intent not found"),
            PaymentError::Invalid(detail) => {
                tracing::warn!(error = %detail, "Payment request rejected by provider");
                Self::bad_request(PAYMENT_REJECTED_MESSAGE)
            }
            PaymentError::Provider(detail) => {
                tracing::error!(error = %detail, "Payment provider error");
                Self::new(StatusCode::BAD_GATEWAY, "Payment provider error")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Expired | AuthError::InvalidToken => {
                Self::unauthorized("Invalid token. Please log in again.")
            }
            other => Self::internal_server_error(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(format!("Invalid query string: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(format!("Invalid path parameter: {}", rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn client_errors_render_as_fail() {
        let (status, json) = body(ApiError::bad_request("Cart is empty")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["status"], "fail");
        assert_eq!(json["message"], "Cart is empty");
    }

    #[tokio::test]
    async fn server_errors_hide_details() {
        let (status, json) = body(ApiError::internal_server_error("connection reset")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], INTERNAL_MESSAGE);
    }

    #[test]
    fn repository_errors_map_to_status() {
        let err: ApiError = RepositoryError::conflict("Username already exists").into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        let err: ApiError = RepositoryError::not_found("Order not found").into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        let err: ApiError = RepositoryError::Database(sqlx::Error::RowNotFound).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn domain_errors_map_to_status() {
        let err: ApiError = DomainError::not_found("Address not found").into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        let err: ApiError = DomainError::Validation(vec!["a".into(), "b".into()]).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "a, b");
    }

    #[test]
    fn payment_provider_messages_stay_server_side() {
        let err: ApiError =
            PaymentError::Invalid("No such customer: 'cus_123'; api_key sk_test_abc".into()).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, PAYMENT_REJECTED_MESSAGE);

        let err: ApiError = PaymentError::Provider("timeout".into()).into();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert_eq!(err.message, "Payment provider error");
    }
}
