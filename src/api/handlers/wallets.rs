use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::response::ApiResponse;
use crate::db::{transaction_repo, wallet_repo};
use crate::errors::AppError;
use crate::models::{PageRequest, Pagination, Wallet};
use crate::AppState;

use super::{parse_body, parse_int};

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWalletRequest {
    pub public_key: String,
    pub private_key: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Serialize)]
pub struct WalletPage {
    pub wallets: Vec<Wallet>,
    pub pagination: Pagination,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/wallets — private key is encrypted before it is stored
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateWalletRequest>, JsonRejection>,
) -> Result<ApiResponse<Wallet>, AppError> {
    let req = parse_body(payload)?;
    let public_key = req.public_key.trim();

    if public_key.is_empty() || req.private_key.is_empty() {
        return Err(AppError::BadRequest(
            "publicKey and privateKey are required".into(),
        ));
    }

    if wallet_repo::get_wallet_by_public_key(&state.db, public_key)
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest("Wallet already exists".into()));
    }

    let encrypted = state
        .vault
        .encrypt(&req.private_key)
        .map_err(|e| AppError::Internal(e.into()))?;
    let wallet = wallet_repo::insert_wallet(&state.db, public_key, &encrypted).await?;

    tracing::info!(wallet_id = %wallet.id, public_key = %wallet.public_key, "Wallet created");

    Ok(ApiResponse::created(wallet).with_message("Wallet created successfully"))
}

/// GET /api/wallets — newest first
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<ApiResponse<WalletPage>, AppError> {
    let page = PageRequest::new(
        parse_int("page", query.page.as_deref())?,
        parse_int("limit", query.limit.as_deref())?,
    )
    .map_err(AppError::BadRequest)?;

    let (wallets, total) = tokio::try_join!(
        wallet_repo::list_wallets(&state.db, page.limit, page.offset()),
        wallet_repo::count_wallets(&state.db),
    )?;

    Ok(ApiResponse::ok(WalletPage {
        wallets,
        pagination: Pagination::new(page, total),
    }))
}

/// GET /api/wallets/:id
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Wallet>, AppError> {
    let wallet = wallet_repo::get_wallet_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Wallet not found".into()))?;

    Ok(ApiResponse::ok(wallet))
}

/// DELETE /api/wallets/:id — refused while any transaction references it
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<()>, AppError> {
    if wallet_repo::get_wallet_by_id(&state.db, id).await?.is_none() {
        return Err(AppError::NotFound("Wallet not found".into()));
    }

    if transaction_repo::count_for_wallet(&state.db, id).await? > 0 {
        return Err(AppError::Conflict(
            "Wallet has transactions and cannot be deleted".into(),
        ));
    }

    if !wallet_repo::delete_wallet(&state.db, id).await? {
        return Err(AppError::NotFound("Wallet not found".into()));
    }

    tracing::info!(wallet_id = %id, "Wallet deleted");

    Ok(ApiResponse::message("Wallet deleted successfully"))
}
