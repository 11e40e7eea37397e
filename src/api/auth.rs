use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::db::user_repo;
use crate::errors::AppError;
use crate::models::User;
use crate::AppState;

/// The authenticated principal, attached to request extensions.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// Bearer-token authentication middleware.
///
/// Every request must carry `Authorization: Bearer <token>` holding a
/// token issued by this service for a user that still exists.
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let auth_header = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok());

    let token = match auth_header {
        Some(value) if value.starts_with("Bearer ") => value[7..].trim().to_string(),
        _ => {
            return AppError::Unauthorized("Missing or invalid Authorization header".into())
                .into_response()
        }
    };

    let claims = match state.tokens.verify(&token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(error = %e, "Token rejected");
            return AppError::Unauthorized("Invalid or expired token".into()).into_response();
        }
    };

    let user = match user_repo::get_user_by_id(&state.db, claims.sub).await {
        Ok(Some(user)) => user,
        Ok(None) => return AppError::Unauthorized("User not found".into()).into_response(),
        Err(e) => return AppError::Internal(e).into_response(),
    };

    req.extensions_mut().insert(AuthUser(user));
    next.run(req).await
}
