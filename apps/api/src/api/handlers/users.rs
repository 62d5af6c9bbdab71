use axum::{extract::State, http::StatusCode, response::Response};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::extract::{AppJson, AppPath};
use crate::api::middleware::AuthUser;
use crate::api::response::{self, Envelope};
use crate::auth::password::verify_password;
use crate::domain::user::value_objects::check_password;
use crate::domain::user::{AddressUpdate, NewAddress, Profile};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

/// Current user
///
/// GET /api/users/profile
pub async fn get_profile(AuthUser(user): AuthUser) -> Response {
    Envelope::data(json!({ "user": user })).ok()
}

/// Replace the current user's profile
///
/// PATCH /api/users/profile
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(mut user): AuthUser,
    AppJson(profile): AppJson<Profile>,
) -> Result<Response, ApiError> {
    user.profile = profile;
    user.touch();
    state.users.update(&user).await?;
    Ok(Envelope::data(json!({ "user": user })).ok())
}

/// Change password after verifying the current one
///
/// PATCH /api/users/change-password
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(mut user): AuthUser,
    AppJson(req): AppJson<ChangePasswordRequest>,
) -> Result<Response, ApiError> {
    if !verify_password(&req.current_password, &user.password_hash)? {
        return Err(ApiError::unauthorized("Your current password is wrong"));
    }
    check_password(&req.new_password)?;

    user.password_hash = super::auth::hash(req.new_password, state.auth.bcrypt_cost).await?;
    user.touch();
    state.users.update(&user).await?;

    tracing::info!(user_id = %user.id, "Password changed");
    Ok(response::message("Password updated successfully"))
}

/// Address book
///
/// GET /api/users/addresses
pub async fn list_addresses(AuthUser(user): AuthUser) -> Response {
    Envelope::list("addresses", &user.addresses).ok()
}

/// Add an address
///
/// POST /api/users/addresses
pub async fn add_address(
    State(state): State<AppState>,
    AuthUser(mut user): AuthUser,
    AppJson(address): AppJson<NewAddress>,
) -> Result<Response, ApiError> {
    user.add_address(address);
    state.users.update(&user).await?;
    Ok(Envelope::list("addresses", &user.addresses).created())
}

/// Partially update an address
///
/// PATCH /api/users/addresses/:addressId
pub async fn update_address(
    State(state): State<AppState>,
    AuthUser(mut user): AuthUser,
    AppPath(address_id): AppPath<Uuid>,
    AppJson(update): AppJson<AddressUpdate>,
) -> Result<Response, ApiError> {
    user.update_address(address_id, update)?;
    state.users.update(&user).await?;
    Ok(Envelope::list("addresses", &user.addresses).ok())
}

/// Remove an address
///
/// DELETE /api/users/addresses/:addressId
pub async fn delete_address(
    State(state): State<AppState>,
    AuthUser(mut user): AuthUser,
    AppPath(address_id): AppPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    user.remove_address(address_id);
    state.users.update(&user).await?;
    Ok(StatusCode::NO_CONTENT)
}
