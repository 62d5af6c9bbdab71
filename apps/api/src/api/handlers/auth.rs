use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::errors::ApiError;
use crate::api::extract::AppJson;
use crate::api::middleware::auth::{LOGGED_OUT, TOKEN_COOKIE};
use crate::api::response;
use crate::auth::jwt::create_token;
use crate::auth::password::{hash_password, verify_password};
use crate::config::AuthSettings;
use crate::domain::errors::Violations;
use crate::domain::user::value_objects::{MIN_PASSWORD_LEN, MIN_USERNAME_LEN};
use crate::domain::user::{Profile, User, Username};
use crate::state::AppState;

/// Request body for signup
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub profile: Profile,
}

/// Request body for login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Register a new customer
///
/// POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    AppJson(req): AppJson<SignupRequest>,
) -> Result<Response, ApiError> {
    let mut v = Violations::new();
    v.check(
        req.username.trim().chars().count() < MIN_USERNAME_LEN,
        format!("Username must be at least {MIN_USERNAME_LEN} characters long"),
    )
    .check(
        req.password.chars().count() < MIN_PASSWORD_LEN,
        format!("Password must be at least {MIN_PASSWORD_LEN} characters long"),
    );
    v.into_result()?;

    let username = Username::new(req.username)?;
    if state.users.find_by_username(username.as_str()).await?.is_some() {
        return Err(ApiError::bad_request("Username already exists"));
    }

    let password_hash = hash(req.password, state.auth.bcrypt_cost).await?;
    let user = User::new(username, password_hash, req.profile);
    state.users.create(&user).await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User signed up");
    session_response(&state.auth, &user, StatusCode::CREATED)
}

/// Log in with username and password
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Response, ApiError> {
    if req.username.trim().is_empty() {
        return Err(ApiError::bad_request("Username is required"));
    }
    if req.password.is_empty() {
        return Err(ApiError::bad_request("Password is required"));
    }

    let user = state
        .users
        .find_by_username(req.username.trim())
        .await?
        .ok_or_else(|| ApiError::unauthorized("Incorrect username or password"))?;

    if !verify_password(&req.password, &user.password_hash)? {
        tracing::warn!(username = %user.username, "Failed login attempt");
        return Err(ApiError::unauthorized("Incorrect username or password"));
    }
    if !user.is_active {
        return Err(ApiError::unauthorized(
            "Your account has been deactivated. Please contact support.",
        ));
    }

    state.users.record_login(user.id).await?;
    tracing::info!(user_id = %user.id, "User logged in");
    session_response(&state.auth, &user, StatusCode::OK)
}

/// Clear the session cookie
///
/// POST /api/auth/logout
pub async fn logout(State(state): State<AppState>) -> Result<Response, ApiError> {
    let mut response = response::message("Logged out successfully");
    let cookie = session_cookie(LOGGED_OUT, 10, state.auth.cookie_secure)?;
    response.headers_mut().insert(SET_COOKIE, cookie);
    Ok(response)
}

/// Hashes off the async runtime; bcrypt is CPU bound
pub(crate) async fn hash(password: String, cost: u32) -> Result<String, ApiError> {
    let hashed = tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .map_err(ApiError::internal_server_error)??;
    Ok(hashed)
}

fn session_response(auth: &AuthSettings, user: &User, status: StatusCode) -> Result<Response, ApiError> {
    let token = create_token(user.id, &auth.jwt_secret, auth.token_ttl)?;
    let cookie = session_cookie(&token, auth.token_ttl.num_seconds(), auth.cookie_secure)?;

    let body = Json(json!({
        "status": "success",
        "token": token,
        "data": { "user": user },
    }));
    let mut response = (status, body).into_response();
    response.headers_mut().insert(SET_COOKIE, cookie);
    Ok(response)
}

fn session_cookie(value: &str, max_age: i64, secure: bool) -> Result<HeaderValue, ApiError> {
    let mut cookie = format!("{TOKEN_COOKIE}={value}; Path=/; Max-Age={max_age}; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).map_err(ApiError::internal_server_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_attributes() {
        let cookie = session_cookie("abc", 604_800, false).unwrap();
        assert_eq!(
            cookie.to_str().unwrap(),
            "token=abc; Path=/; Max-Age=604800; HttpOnly; SameSite=Lax"
        );
        let secure = session_cookie("abc", 10, true).unwrap();
        assert!(secure.to_str().unwrap().ends_with("; Secure"));
    }
}
