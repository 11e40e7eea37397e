use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::{Mutex, MutexGuard};

use tradelog::db::{parameters_repo, user_repo, wallet_repo};
use tradelog::execution::{
    BuyFill, ExecutionError, OrderExecutor, SellFill, SimulatedExecutor,
};
use tradelog::ledger::{Ledger, LedgerSettings};
use tradelog::models::parameters::ParametersInput;
use tradelog::models::{
    BuyParameters, Currency, SellParameters, StopLossParameters, TradingParameters, Transaction,
    User, Wallet,
};
use tradelog::security::passwords;

pub const EXPLORER: &str = "https://explorer.solana.com/tx";

/// Tests share one database; each holds this lock for its whole run.
fn db_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

#[allow(dead_code)]
pub struct TestDb {
    pub pool: PgPool,
    _guard: MutexGuard<'static, ()>,
}

/// Connect to `TEST_DATABASE_URL`, migrate and wipe all tables.
/// Returns None (and the caller skips) when the variable is unset.
#[allow(dead_code)]
pub async fn setup_test_db() -> Option<TestDb> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set; skipping database test");
        return None;
    };

    let guard = db_lock().lock().await;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    // Clean tables for test isolation
    sqlx::query("TRUNCATE transactions, trading_parameters, wallets, users CASCADE")
        .execute(&pool)
        .await
        .expect("Failed to clean tables");

    Some(TestDb {
        pool,
        _guard: guard,
    })
}

/// Ledger over the simulated executor with no artificial latency.
#[allow(dead_code)]
pub fn simulated_ledger(pool: &PgPool) -> Ledger {
    ledger_with(pool, Arc::new(SimulatedExecutor::new(Duration::ZERO)))
}

#[allow(dead_code)]
pub fn ledger_with(pool: &PgPool, executor: Arc<dyn OrderExecutor>) -> Ledger {
    Ledger::new(
        pool.clone(),
        executor,
        LedgerSettings {
            execution_timeout: Duration::from_secs(5),
            explorer_base_url: EXPLORER.into(),
        },
    )
}

/// Executor whose venue always refuses.
#[allow(dead_code)]
pub struct RejectingExecutor;

#[async_trait]
impl OrderExecutor for RejectingExecutor {
    async fn execute_buy(
        &self,
        _wallet: &Wallet,
        _token_address: &str,
        _amount: Decimal,
        _currency: Currency,
        _params: &TradingParameters,
    ) -> Result<BuyFill, ExecutionError> {
        Err(ExecutionError::Rejected("insufficient liquidity".into()))
    }

    async fn execute_sell(
        &self,
        _open_buy: &Transaction,
        _params: &TradingParameters,
    ) -> Result<SellFill, ExecutionError> {
        Err(ExecutionError::Rejected("insufficient liquidity".into()))
    }

    fn name(&self) -> &'static str {
        "rejecting"
    }
}

#[allow(dead_code)]
pub fn parameters_input() -> ParametersInput {
    ParametersInput {
        buy_parameters: BuyParameters {
            buy_in_amount: Decimal::from(10),
            buy_in_currency: Currency::Sol,
            tip_amount: Decimal::new(1, 3),
            tip_currency: Currency::Sol,
            slippage_percentage: Decimal::from(5),
        },
        sell_parameters: SellParameters {
            return_trigger_percentage: Decimal::from(10),
            max_trade_time_minutes: Some(60),
            profit_distribution_percentage: Decimal::from(100),
        },
        stop_loss_parameters: StopLossParameters {
            total_loss_limit_percentage: Decimal::from(20),
        },
    }
}

/// Seed a wallet record for testing.
#[allow(dead_code)]
pub async fn seed_wallet(pool: &PgPool, public_key: &str) -> Wallet {
    wallet_repo::insert_wallet(pool, public_key, "opaque-test-blob")
        .await
        .expect("Failed to seed wallet")
}

/// Seed an active parameter set for testing.
#[allow(dead_code)]
pub async fn seed_active_parameters(pool: &PgPool) -> TradingParameters {
    parameters_repo::create_active(pool, &parameters_input(), None)
        .await
        .expect("Failed to seed trading parameters")
}

/// Seed an admin user with a cheap bcrypt hash.
#[allow(dead_code)]
pub async fn seed_admin(pool: &PgPool, email: &str, password: &str) -> User {
    let hash = passwords::hash_password_with_cost(password, 4).expect("Failed to hash password");
    user_repo::ensure_admin(pool, email, &hash)
        .await
        .expect("Failed to seed admin")
}
