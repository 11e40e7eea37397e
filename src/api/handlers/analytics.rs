use axum::extract::{Query, State};
use serde::Deserialize;

use crate::api::response::ApiResponse;
use crate::errors::AppError;
use crate::ledger::{DateRange, OverviewMetrics, PerformanceMetrics};
use crate::AppState;

use super::parse_date;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl RangeQuery {
    fn into_range(self) -> Result<DateRange, AppError> {
        Ok(DateRange {
            start: parse_date("startDate", self.start_date.as_deref())?,
            end: parse_date("endDate", self.end_date.as_deref())?,
        })
    }
}

/// GET /api/transactions/analytics/overview
pub async fn overview(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<ApiResponse<OverviewMetrics>, AppError> {
    let metrics = state.ledger.overview(query.into_range()?).await?;
    Ok(ApiResponse::ok(metrics))
}

/// GET /api/transactions/analytics/performance
pub async fn performance(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<ApiResponse<PerformanceMetrics>, AppError> {
    let metrics = state.ledger.performance(query.into_range()?).await?;
    Ok(ApiResponse::ok(metrics))
}
