use std::collections::HashMap;

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
    },
};

use crate::api::errors::ApiError;
use crate::auth::jwt::verify_token;
use crate::domain::user::User;
use crate::state::AppState;

/// Name of the session cookie set at login
pub const TOKEN_COOKIE: &str = "token";
/// Cookie value written by logout
pub const LOGGED_OUT: &str = "loggedout";

const NOT_LOGGED_IN: &str = "You are not logged in! Please log in to get access.";

/// Authenticated user extractor for protected routes
///
/// The token is read from the `Authorization: Bearer` header, then the
/// `token` cookie, then the `token` query parameter.
///
/// Usage:
/// ```rust,ignore
/// async fn protected_handler(
///     AuthUser(user): AuthUser,
/// ) -> Result<String, ApiError> {
///     Ok(format!("Hello {}", user.username))
/// }
/// ```
pub struct AuthUser(pub User);

/// Authenticated user with the admin role
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = session_token(parts)
            .filter(|token| token != LOGGED_OUT)
            .ok_or_else(|| ApiError::unauthorized(NOT_LOGGED_IN))?;

        let claims = verify_token(&token, &state.auth.jwt_secret)?;

        let user = state
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| {
                ApiError::unauthorized("The user belonging to this token no longer exists.")
            })?;

        if !user.is_active {
            return Err(ApiError::unauthorized(
                "Your account has been deactivated. Please contact support.",
            ));
        }

        Ok(AuthUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(ApiError::forbidden(
                "You do not have permission to perform this action",
            ));
        }
        Ok(AdminUser(user))
    }
}

fn session_token(parts: &Parts) -> Option<String> {
    bearer_token(parts)
        .or_else(|| cookie_token(parts))
        .or_else(|| query_token(parts))
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

fn cookie_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == TOKEN_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|token| !token.is_empty())
}

fn query_token(parts: &Parts) -> Option<String> {
    Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(mut params)| params.remove(TOKEN_COOKIE))
        .filter(|token| !token.is_empty())
}
