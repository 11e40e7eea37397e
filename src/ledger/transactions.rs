use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{parameters_repo, transaction_repo, wallet_repo};
use crate::execution::{BuyFill, ExecutionError, OrderExecutor, SellFill};
use crate::models::{
    Currency, NewTransaction, PageRequest, Pagination, Sort, TradingParameters, Transaction,
    TransactionFilter, TransactionStatus, TransactionType,
};

use super::analytics::{self, DateRange, OverviewMetrics, PerformanceMetrics};
use super::error::LedgerError;

/// Knobs the ledger needs besides storage and the executor.
#[derive(Debug, Clone)]
pub struct LedgerSettings {
    pub execution_timeout: Duration,
    pub explorer_base_url: String,
}

/// A request to open a position.
#[derive(Debug, Clone)]
pub struct BuyRequest {
    pub wallet_id: Uuid,
    pub token_address: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub token_name: Option<String>,
    pub token_symbol: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TransactionPage {
    pub transactions: Vec<Transaction>,
    pub pagination: Pagination,
}

/// Owns BUY/SELL records and the link between them.
#[derive(Clone)]
pub struct Ledger {
    pool: PgPool,
    executor: Arc<dyn OrderExecutor>,
    settings: LedgerSettings,
}

impl Ledger {
    pub fn new(pool: PgPool, executor: Arc<dyn OrderExecutor>, settings: LedgerSettings) -> Self {
        Self {
            pool,
            executor,
            settings,
        }
    }

    /// Execute a buy under the active parameters and record it.
    /// Nothing is written if execution fails.
    pub async fn create_buy(&self, req: BuyRequest) -> Result<Transaction, LedgerError> {
        let wallet = wallet_repo::get_wallet_by_id(&self.pool, req.wallet_id)
            .await?
            .ok_or_else(|| LedgerError::NotFound("Wallet not found".into()))?;

        let params = parameters_repo::get_active(&self.pool)
            .await?
            .ok_or(LedgerError::NoActiveConfig)?;

        let mut entry = buy_shell(&req, &params, Utc::now());

        let fill = run_with_timeout(
            self.settings.execution_timeout,
            TransactionType::Buy,
            self.executor.execute_buy(
                &wallet,
                &req.token_address,
                req.amount,
                req.currency,
                &params,
            ),
        )
        .await?;

        settle_buy(&mut entry, fill, &self.settings.explorer_base_url);
        let tx = transaction_repo::insert_transaction(&self.pool, &entry).await?;

        counter!("ledger_buys_total").increment(1);
        tracing::info!(
            id = %tx.id,
            wallet = %wallet.public_key,
            token_address = %tx.token_address,
            amount = %tx.purchase_price,
            executor = self.executor.name(),
            "Buy transaction recorded"
        );

        Ok(tx)
    }

    /// Close an open BUY with a SELL. The BUY is marked closed in the same
    /// database transaction that inserts the SELL, so a BUY is closed at most once.
    pub async fn create_sell(&self, buy_id: Uuid) -> Result<Transaction, LedgerError> {
        let buy = transaction_repo::get_transaction_by_id(&self.pool, buy_id)
            .await?
            .ok_or_else(|| LedgerError::NotFound("Buy transaction not found".into()))?;

        if !buy.is_buy() {
            return Err(LedgerError::InvalidReference);
        }
        if !buy.is_open() {
            return Err(LedgerError::AlreadyClosed(buy.id));
        }

        let params = parameters_repo::get_active(&self.pool)
            .await?
            .ok_or(LedgerError::NoActiveConfig)?;

        let fill = run_with_timeout(
            self.settings.execution_timeout,
            TransactionType::Sell,
            self.executor.execute_sell(&buy, &params),
        )
        .await?;

        let now = Utc::now();
        let entry = sell_entry(&buy, &params, &fill, &self.settings.explorer_base_url, now);

        let mut db_tx = self.pool.begin().await?;
        if !transaction_repo::close_buy(&mut *db_tx, buy.id, now).await? {
            db_tx.rollback().await?;
            tracing::warn!(
                buy_id = %buy.id,
                signature = %fill.signature,
                "Buy closed concurrently; settled sell not recorded"
            );
            return Err(LedgerError::AlreadyClosed(buy.id));
        }
        let tx = transaction_repo::insert_transaction(&mut *db_tx, &entry).await?;
        db_tx.commit().await?;

        counter!("ledger_sells_total").increment(1);
        tracing::info!(
            id = %tx.id,
            buy_id = %buy.id,
            sale_price = %fill.price,
            gross_profit = %fill.gross_profit,
            profit_loss = ?tx.profit_loss,
            "Sell transaction recorded"
        );

        Ok(tx)
    }

    pub async fn get_transaction(&self, id: Uuid) -> Result<Transaction, LedgerError> {
        transaction_repo::get_transaction_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| LedgerError::NotFound("Transaction not found".into()))
    }

    /// One page of matching transactions. An empty match is an empty page.
    pub async fn list_transactions(
        &self,
        filter: &TransactionFilter,
        sort: Sort,
        page: PageRequest,
    ) -> Result<TransactionPage, LedgerError> {
        let (transactions, total) = tokio::try_join!(
            transaction_repo::list_transactions(&self.pool, filter, sort, page),
            transaction_repo::count_transactions(&self.pool, filter),
        )?;

        Ok(TransactionPage {
            transactions,
            pagination: Pagination::new(page, total),
        })
    }

    pub async fn overview(&self, range: DateRange) -> Result<OverviewMetrics, LedgerError> {
        analytics::overview(&self.pool, range).await
    }

    pub async fn performance(&self, range: DateRange) -> Result<PerformanceMetrics, LedgerError> {
        analytics::performance(&self.pool, range).await
    }
}

/// Await an executor call, bounded by `timeout`.
pub async fn run_with_timeout<T, F>(
    timeout: Duration,
    side: TransactionType,
    call: F,
) -> Result<T, LedgerError>
where
    F: Future<Output = Result<T, ExecutionError>>,
{
    let started = Instant::now();
    let outcome = tokio::time::timeout(timeout, call).await;
    histogram!("ledger_execution_latency_seconds", "side" => side.to_string())
        .record(started.elapsed().as_secs_f64());

    match outcome {
        Ok(Ok(fill)) => Ok(fill),
        Ok(Err(e)) => {
            counter!("ledger_execution_failures_total", "side" => side.to_string()).increment(1);
            tracing::error!(side = %side, error = %e, "Order execution failed");
            Err(LedgerError::ExecutionFailed(e))
        }
        Err(_) => {
            counter!("ledger_execution_failures_total", "side" => side.to_string()).increment(1);
            tracing::error!(side = %side, timeout = ?timeout, "Order execution timed out");
            Err(LedgerError::ExecutionTimeout(timeout))
        }
    }
}

pub fn explorer_url(base: &str, signature: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), signature)
}

/// `sale - purchase - (buying_fees + selling_fees)`, missing fees counting as zero.
pub fn profit_loss(
    sale_price: Decimal,
    purchase_price: Decimal,
    buying_fees: Option<Decimal>,
    selling_fees: Option<Decimal>,
) -> Decimal {
    sale_price
        - purchase_price
        - (buying_fees.unwrap_or(Decimal::ZERO) + selling_fees.unwrap_or(Decimal::ZERO))
}

/// PENDING BUY shell: price, tip and parameter snapshot, no settlement yet.
pub fn buy_shell(req: &BuyRequest, params: &TradingParameters, now: DateTime<Utc>) -> NewTransaction {
    NewTransaction {
        wallet_id: req.wallet_id,
        parameters_id: Some(params.id),
        token_address: req.token_address.clone(),
        token_name: req.token_name.clone(),
        token_symbol: req.token_symbol.clone(),
        transaction_signature: String::new(),
        block_explorer_url: String::new(),
        status: TransactionStatus::Pending,
        tx_type: TransactionType::Buy,
        entry_time: now,
        exit_time: None,
        purchase_price: req.amount,
        sale_price: None,
        liquidity: Decimal::ZERO,
        tip_amount: Some(params.buy_parameters.tip_amount),
        tip_currency: Some(params.buy_parameters.tip_currency),
        buying_fees: None,
        selling_fees: None,
        profit_loss: None,
        closes_transaction_id: None,
    }
}

/// Apply a buy fill to its shell and mark it COMPLETED.
pub fn settle_buy(entry: &mut NewTransaction, fill: BuyFill, explorer_base: &str) {
    entry.block_explorer_url = explorer_url(explorer_base, &fill.signature);
    entry.transaction_signature = fill.signature;
    entry.buying_fees = Some(fill.fees);
    entry.liquidity = fill.liquidity;
    entry.status = TransactionStatus::Completed;
}

/// COMPLETED SELL closing `buy`. Wallet, token and cost basis come from the
/// BUY; profit/loss nets both legs' fees.
pub fn sell_entry(
    buy: &Transaction,
    params: &TradingParameters,
    fill: &SellFill,
    explorer_base: &str,
    now: DateTime<Utc>,
) -> NewTransaction {
    NewTransaction {
        wallet_id: buy.wallet_id,
        parameters_id: Some(params.id),
        token_address: buy.token_address.clone(),
        token_name: buy.token_name.clone(),
        token_symbol: buy.token_symbol.clone(),
        transaction_signature: fill.signature.clone(),
        block_explorer_url: explorer_url(explorer_base, &fill.signature),
        status: TransactionStatus::Completed,
        tx_type: TransactionType::Sell,
        entry_time: now,
        exit_time: Some(now),
        purchase_price: buy.purchase_price,
        sale_price: Some(fill.price),
        liquidity: fill.liquidity,
        tip_amount: None,
        tip_currency: None,
        buying_fees: None,
        selling_fees: Some(fill.fees),
        profit_loss: Some(profit_loss(
            fill.price,
            buy.purchase_price,
            buy.buying_fees,
            Some(fill.fees),
        )),
        closes_transaction_id: Some(buy.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{open_buy, params};

    const EXPLORER: &str = "https://explorer.solana.com/tx";

    fn buy_request(amount: Decimal) -> BuyRequest {
        BuyRequest {
            wallet_id: Uuid::new_v4(),
            token_address: "TokenMint111".into(),
            amount,
            currency: Currency::Sol,
            token_name: None,
            token_symbol: Some("TST".into()),
        }
    }

    #[test]
    fn test_profit_loss_nets_both_fees() {
        let pnl = profit_loss(
            Decimal::from(11),
            Decimal::from(10),
            Some(Decimal::new(1, 1)),
            Some(Decimal::new(11, 2)),
        );
        assert_eq!(pnl, Decimal::new(79, 2)); // 0.79
    }

    #[test]
    fn test_profit_loss_missing_fees_are_zero() {
        let pnl = profit_loss(Decimal::from(8), Decimal::from(10), None, None);
        assert_eq!(pnl, Decimal::from(-2));
    }

    #[test]
    fn test_buy_shell_is_pending_with_tip() {
        let p = params();
        let shell = buy_shell(&buy_request(Decimal::from(10)), &p, Utc::now());

        assert_eq!(shell.status, TransactionStatus::Pending);
        assert_eq!(shell.tx_type, TransactionType::Buy);
        assert_eq!(shell.purchase_price, Decimal::from(10));
        assert_eq!(shell.tip_amount, Some(p.buy_parameters.tip_amount));
        assert_eq!(shell.tip_currency, Some(Currency::Sol));
        assert_eq!(shell.parameters_id, Some(p.id));
        assert!(shell.profit_loss.is_none());
    }

    #[test]
    fn test_settled_buy_is_completed_with_signature_and_url() {
        let mut entry = buy_shell(&buy_request(Decimal::from(10)), &params(), Utc::now());
        settle_buy(
            &mut entry,
            BuyFill {
                signature: "abc123".into(),
                fees: Decimal::new(1, 1),
                liquidity: Decimal::from(100),
            },
            EXPLORER,
        );

        assert_eq!(entry.status, TransactionStatus::Completed);
        assert_eq!(entry.transaction_signature, "abc123");
        assert_eq!(entry.block_explorer_url, "https://explorer.solana.com/tx/abc123");
        assert_eq!(entry.buying_fees, Some(Decimal::new(1, 1)));
        assert_eq!(entry.liquidity, Decimal::from(100));
    }

    #[test]
    fn test_sell_entry_matches_worked_example() {
        let buy = open_buy(Decimal::from(10));
        let fill = SellFill {
            signature: "sell-sig".into(),
            price: Decimal::from(11),
            fees: Decimal::new(11, 2),
            liquidity: Decimal::from(110),
            gross_profit: Decimal::ONE,
        };
        let now = Utc::now();

        let sell = sell_entry(&buy, &params(), &fill, &format!("{EXPLORER}/"), now);

        assert_eq!(sell.tx_type, TransactionType::Sell);
        assert_eq!(sell.status, TransactionStatus::Completed);
        assert_eq!(sell.wallet_id, buy.wallet_id);
        assert_eq!(sell.token_address, buy.token_address);
        assert_eq!(sell.closes_transaction_id, Some(buy.id));
        assert_eq!(sell.sale_price, Some(Decimal::from(11)));
        assert_eq!(sell.selling_fees, Some(Decimal::new(11, 2)));
        assert_eq!(sell.liquidity, Decimal::from(110));
        assert_eq!(sell.profit_loss, Some(Decimal::new(79, 2)));
        assert_eq!(sell.exit_time, Some(now));
        assert_eq!(sell.block_explorer_url, "https://explorer.solana.com/tx/sell-sig");
    }

    #[tokio::test]
    async fn test_executor_error_becomes_execution_failed() {
        let result: Result<BuyFill, _> = run_with_timeout(
            Duration::from_secs(1),
            TransactionType::Buy,
            async { Err(ExecutionError::Rejected("no route".into())) },
        )
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.kind(), "EXECUTION_FAILED");
    }

    #[tokio::test]
    async fn test_slow_executor_times_out() {
        let result: Result<BuyFill, _> = run_with_timeout(
            Duration::from_millis(20),
            TransactionType::Sell,
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Err(ExecutionError::Transport("unreachable".into()))
            },
        )
        .await;

        assert!(matches!(result, Err(LedgerError::ExecutionTimeout(_))));
    }
}
