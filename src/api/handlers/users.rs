use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::auth::AuthUser;
use crate::api::response::ApiResponse;
use crate::db::user_repo;
use crate::errors::AppError;
use crate::models::User;
use crate::security::passwords::{self, MIN_PASSWORD_LEN};
use crate::AppState;

use super::parse_body;

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn password_matches(password: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || passwords::verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::Internal(e.into()))
}

/// POST /api/users/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiResponse<LoginResponse>, AppError> {
    let req = parse_body(payload)?;
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest("email and password are required".into()));
    }

    let invalid = || AppError::Unauthorized("Invalid credentials".into());

    let user = user_repo::get_user_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(invalid)?;

    if !password_matches(req.password, user.password_hash.clone()).await? {
        tracing::warn!(email = %user.email, "Failed login attempt");
        return Err(invalid());
    }

    user_repo::touch_last_login(&state.db, user.id).await?;

    let token = state
        .tokens
        .issue(&user)
        .map_err(|e| AppError::Internal(e.into()))?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(ApiResponse::ok(LoginResponse { token, user }))
}

/// POST /api/users/logout — tokens are stateless, so this only acknowledges.
pub async fn logout(Extension(AuthUser(user)): Extension<AuthUser>) -> ApiResponse<()> {
    tracing::info!(user_id = %user.id, "User logged out");
    ApiResponse::message("Logged out successfully")
}

/// POST /api/users/change-password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<ApiResponse<()>, AppError> {
    let req = parse_body(payload)?;

    if req.new_password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "newPassword must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    if !password_matches(req.current_password, user.password_hash.clone()).await? {
        return Err(AppError::Unauthorized("Current password is incorrect".into()));
    }

    let new_password = req.new_password;
    let hash = tokio::task::spawn_blocking(move || passwords::hash_password(&new_password))
        .await
        .map_err(|e| AppError::Internal(e.into()))?
        .map_err(|e| AppError::Internal(e.into()))?;

    user_repo::update_password(&state.db, user.id, &hash).await?;

    tracing::info!(user_id = %user.id, "Password changed");

    Ok(ApiResponse::message("Password updated successfully"))
}
