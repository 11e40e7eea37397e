use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use super::error::LedgerError;

/// Inclusive `entry_time` bounds. Either side may be open.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    fn push_bounds(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        if let Some(start) = self.start {
            qb.push(" AND entry_time >= ").push_bind(start);
        }
        if let Some(end) = self.end {
            qb.push(" AND entry_time <= ").push_bind(end);
        }
    }
}

#[derive(Debug, FromRow)]
struct OverviewRow {
    total: i64,
    buys: i64,
    sells: i64,
    total_profit: Decimal,
    profit_samples: i64,
    total_fees: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewMetrics {
    pub total_transactions: i64,
    pub total_buy_transactions: i64,
    pub total_sell_transactions: i64,
    pub total_profit: Decimal,
    pub average_profit: Decimal,
    pub total_fees: Decimal,
}

impl OverviewMetrics {
    fn from_row(row: OverviewRow) -> Self {
        Self {
            total_transactions: row.total,
            total_buy_transactions: row.buys,
            total_sell_transactions: row.sells,
            total_profit: row.total_profit,
            average_profit: mean(row.total_profit, row.profit_samples),
            total_fees: row.total_fees,
        }
    }
}

#[derive(Debug, FromRow)]
struct PerformanceRow {
    closed: i64,
    wins: i64,
    losses: i64,
    total_profit: Decimal,
    best: Option<Decimal>,
    worst: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub closed_trades: i64,
    pub win_count: i64,
    pub loss_count: i64,
    /// Fraction of closed trades with a positive result, 0..=1.
    pub win_rate: Decimal,
    pub total_profit: Decimal,
    pub average_profit: Decimal,
    pub best_trade: Decimal,
    pub worst_trade: Decimal,
}

impl PerformanceMetrics {
    fn from_row(row: PerformanceRow) -> Self {
        Self {
            closed_trades: row.closed,
            win_count: row.wins,
            loss_count: row.losses,
            win_rate: mean(Decimal::from(row.wins), row.closed),
            total_profit: row.total_profit,
            average_profit: mean(row.total_profit, row.closed),
            best_trade: row.best.unwrap_or(Decimal::ZERO),
            worst_trade: row.worst.unwrap_or(Decimal::ZERO),
        }
    }
}

fn mean(sum: Decimal, samples: i64) -> Decimal {
    if samples > 0 {
        sum / Decimal::from(samples)
    } else {
        Decimal::ZERO
    }
}

/// Totals over COMPLETED transactions in the window.
pub async fn overview(pool: &PgPool, range: DateRange) -> Result<OverviewMetrics, LedgerError> {
    let mut qb = QueryBuilder::<Postgres>::new(
        r#"
        SELECT
            COUNT(*) AS total,
            COUNT(*) FILTER (WHERE tx_type = 'BUY') AS buys,
            COUNT(*) FILTER (WHERE tx_type = 'SELL') AS sells,
            COALESCE(SUM(profit_loss), 0) AS total_profit,
            COUNT(profit_loss) AS profit_samples,
            COALESCE(SUM(COALESCE(buying_fees, 0) + COALESCE(selling_fees, 0)), 0) AS total_fees
        FROM transactions
        WHERE status = 'COMPLETED'
        "#,
    );
    range.push_bounds(&mut qb);

    let row = qb.build_query_as::<OverviewRow>().fetch_one(pool).await?;

    Ok(OverviewMetrics::from_row(row))
}

/// Win/loss statistics over completed SELLs in the window.
pub async fn performance(
    pool: &PgPool,
    range: DateRange,
) -> Result<PerformanceMetrics, LedgerError> {
    let mut qb = QueryBuilder::<Postgres>::new(
        r#"
        SELECT
            COUNT(*) AS closed,
            COUNT(*) FILTER (WHERE profit_loss > 0) AS wins,
            COUNT(*) FILTER (WHERE profit_loss <= 0) AS losses,
            COALESCE(SUM(profit_loss), 0) AS total_profit,
            MAX(profit_loss) AS best,
            MIN(profit_loss) AS worst
        FROM transactions
        WHERE status = 'COMPLETED' AND tx_type = 'SELL' AND profit_loss IS NOT NULL
        "#,
    );
    range.push_bounds(&mut qb);

    let row = qb.build_query_as::<PerformanceRow>().fetch_one(pool).await?;

    Ok(PerformanceMetrics::from_row(row))
}
