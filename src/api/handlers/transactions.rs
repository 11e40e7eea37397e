use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::response::ApiResponse;
use crate::errors::AppError;
use crate::ledger::{BuyRequest, TransactionPage};
use crate::models::{
    Currency, PageRequest, Sort, SortField, SortOrder, Transaction, TransactionFilter,
    TransactionStatus, TransactionType,
};
use crate::AppState;

use super::{parse_body, parse_date, parse_int};

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyBody {
    pub wallet_id: Uuid,
    pub token_address: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub token_name: Option<String>,
    pub token_symbol: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellBody {
    pub transaction_id: Uuid,
}

/// Raw listing query. Everything arrives as text and is validated here so
/// bad input is a 400 with a useful message.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub tx_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub wallet_id: Option<String>,
    pub token_address: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl ListQuery {
    pub fn into_parts(self) -> Result<(TransactionFilter, Sort, PageRequest), AppError> {
        let page = PageRequest::new(
            parse_int("page", self.page.as_deref())?,
            parse_int("limit", self.limit.as_deref())?,
        )
        .map_err(AppError::BadRequest)?;

        let status = self
            .status
            .as_deref()
            .map(|s| {
                TransactionStatus::from_api_str(s)
                    .ok_or_else(|| AppError::BadRequest(format!("invalid status: {s}")))
            })
            .transpose()?;
        let tx_type = self
            .tx_type
            .as_deref()
            .map(|s| {
                TransactionType::from_api_str(s)
                    .ok_or_else(|| AppError::BadRequest(format!("invalid type: {s}")))
            })
            .transpose()?;
        let wallet_id = self
            .wallet_id
            .as_deref()
            .map(|s| {
                Uuid::parse_str(s)
                    .map_err(|_| AppError::BadRequest("walletId must be a UUID".into()))
            })
            .transpose()?;

        let filter = TransactionFilter {
            status,
            tx_type,
            start_date: parse_date("startDate", self.start_date.as_deref())?,
            end_date: parse_date("endDate", self.end_date.as_deref())?,
            wallet_id,
            token_address: self.token_address.filter(|s| !s.trim().is_empty()),
        };

        let mut sort = Sort::default();
        if let Some(field) = self.sort_by.as_deref() {
            sort.field = SortField::from_api_str(field)
                .ok_or_else(|| AppError::BadRequest(format!("cannot sort by {field}")))?;
        }
        if let Some(order) = self.sort_order.as_deref() {
            sort.order = SortOrder::from_api_str(order)
                .ok_or_else(|| AppError::BadRequest("sortOrder must be asc or desc".into()))?;
        }

        Ok((filter, sort, page))
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/transactions/buy
pub async fn buy(
    State(state): State<AppState>,
    payload: Result<Json<BuyBody>, JsonRejection>,
) -> Result<ApiResponse<Transaction>, AppError> {
    let body = parse_body(payload)?;

    if body.token_address.trim().is_empty() {
        return Err(AppError::BadRequest("tokenAddress is required".into()));
    }
    if body.amount <= Decimal::ZERO {
        return Err(AppError::BadRequest("amount must be greater than 0".into()));
    }

    let tx = state
        .ledger
        .create_buy(BuyRequest {
            wallet_id: body.wallet_id,
            token_address: body.token_address.trim().to_string(),
            amount: body.amount,
            currency: body.currency,
            token_name: body.token_name,
            token_symbol: body.token_symbol,
        })
        .await?;

    Ok(ApiResponse::created(tx).with_message("Buy transaction created successfully"))
}

/// POST /api/transactions/sell
pub async fn sell(
    State(state): State<AppState>,
    payload: Result<Json<SellBody>, JsonRejection>,
) -> Result<ApiResponse<Transaction>, AppError> {
    let body = parse_body(payload)?;
    let tx = state.ledger.create_sell(body.transaction_id).await?;

    Ok(ApiResponse::created(tx).with_message("Sell transaction created successfully"))
}

/// GET /api/transactions
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<ApiResponse<TransactionPage>, AppError> {
    let (filter, sort, page) = query.into_parts()?;
    let result = state.ledger.list_transactions(&filter, sort, page).await?;

    Ok(ApiResponse::ok(result))
}

/// GET /api/transactions/:id
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Transaction>, AppError> {
    let tx = state.ledger.get_transaction(id).await?;
    Ok(ApiResponse::ok(tx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_uses_defaults() {
        let (filter, sort, page) = ListQuery::default().into_parts().unwrap();

        assert!(filter.status.is_none());
        assert_eq!(sort.field, SortField::EntryTime);
        assert_eq!(sort.order, SortOrder::Desc);
        assert_eq!(page, PageRequest { page: 1, limit: 10 });
    }

    #[test]
    fn query_values_are_parsed() {
        let query = ListQuery {
            page: Some("2".into()),
            limit: Some("25".into()),
            status: Some("completed".into()),
            tx_type: Some("SELL".into()),
            sort_by: Some("profitLoss".into()),
            sort_order: Some("asc".into()),
            token_address: Some("Mint".into()),
            ..Default::default()
        };

        let (filter, sort, page) = query.into_parts().unwrap();

        assert_eq!(filter.status, Some(TransactionStatus::Completed));
        assert_eq!(filter.tx_type, Some(TransactionType::Sell));
        assert_eq!(filter.token_address.as_deref(), Some("Mint"));
        assert_eq!(sort.field, SortField::ProfitLoss);
        assert_eq!(sort.order, SortOrder::Asc);
        assert_eq!(page.offset(), 25);
    }

    #[test]
    fn unknown_sort_field_is_rejected() {
        let query = ListQuery {
            sort_by: Some("id; DROP TABLE transactions".into()),
            ..Default::default()
        };
        assert!(matches!(query.into_parts(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn limit_out_of_range_is_rejected() {
        let query = ListQuery {
            limit: Some("101".into()),
            ..Default::default()
        };
        assert!(query.into_parts().is_err());
    }
}
