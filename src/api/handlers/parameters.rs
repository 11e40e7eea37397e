use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::{Extension, Json};
use uuid::Uuid;

use crate::api::auth::AuthUser;
use crate::api::response::ApiResponse;
use crate::db::parameters_repo::{self, UpdateOutcome};
use crate::errors::AppError;
use crate::models::parameters::ParametersInput;
use crate::models::TradingParameters;
use crate::AppState;

use super::parse_body;

fn validated(payload: Result<Json<ParametersInput>, JsonRejection>) -> Result<ParametersInput, AppError> {
    let input = parse_body(payload)?;
    input.validate().map_err(AppError::BadRequest)?;
    Ok(input)
}

/// POST /api/trading-parameters — new version becomes the active one
pub async fn create(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    payload: Result<Json<ParametersInput>, JsonRejection>,
) -> Result<ApiResponse<TradingParameters>, AppError> {
    let input = validated(payload)?;
    let params = parameters_repo::create_active(&state.db, &input, Some(user.id)).await?;

    tracing::info!(parameters_id = %params.id, user_id = %user.id, "Trading parameters created");

    Ok(ApiResponse::created(params).with_message("Trading parameters created successfully"))
}

/// GET /api/trading-parameters — the active set
pub async fn active(State(state): State<AppState>) -> Result<ApiResponse<TradingParameters>, AppError> {
    let params = parameters_repo::get_active(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("No active trading parameters found".into()))?;

    Ok(ApiResponse::ok(params))
}

/// PUT /api/trading-parameters/:id — only while no transaction used it
pub async fn update(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    payload: Result<Json<ParametersInput>, JsonRejection>,
) -> Result<ApiResponse<TradingParameters>, AppError> {
    let input = validated(payload)?;

    let params = match parameters_repo::update(&state.db, id, &input, Some(user.id)).await? {
        UpdateOutcome::Updated(params) => params,
        UpdateOutcome::NotFound => {
            return Err(AppError::NotFound("Trading parameters not found".into()))
        }
        UpdateOutcome::Referenced => {
            return Err(AppError::Conflict(
                "Trading parameters are referenced by transactions; create a new version instead"
                    .into(),
            ))
        }
    };

    tracing::info!(parameters_id = %params.id, user_id = %user.id, "Trading parameters updated");

    Ok(ApiResponse::ok(params).with_message("Trading parameters updated successfully"))
}

/// POST /api/trading-parameters/:id/activate
pub async fn activate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<TradingParameters>, AppError> {
    let params = parameters_repo::activate(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Trading parameters not found".into()))?;

    tracing::info!(parameters_id = %params.id, "Trading parameters activated");

    Ok(ApiResponse::ok(params))
}
