use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{Currency, TradingParameters, Transaction, Wallet};

use super::order_executor::{BuyFill, ExecutionError, OrderExecutor, SellFill};

/// Stand-in venue with a fixed delay and formulaic fills:
///
/// - buy: `fees = amount * 0.01`, `liquidity = amount * 10`
/// - sell: `price = purchase_price * 1.1`, `fees = price * 0.01`,
///   `liquidity = price * 10`, `gross_profit = price - purchase_price`
pub struct SimulatedExecutor {
    latency: Duration,
}

impl SimulatedExecutor {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    async fn settle_delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

/// `{unix_millis}_{uuid}`; the uuid part keeps signatures unique within a millisecond.
fn simulated_signature() -> String {
    format!("{}_{}", Utc::now().timestamp_millis(), Uuid::new_v4().simple())
}

fn fee_rate() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

fn liquidity_multiplier() -> Decimal {
    Decimal::TEN
}

fn sell_markup() -> Decimal {
    Decimal::new(11, 1) // 1.1
}

#[async_trait]
impl OrderExecutor for SimulatedExecutor {
    async fn execute_buy(
        &self,
        wallet: &Wallet,
        token_address: &str,
        amount: Decimal,
        currency: Currency,
        _params: &TradingParameters,
    ) -> Result<BuyFill, ExecutionError> {
        self.settle_delay().await;

        tracing::info!(
            wallet = %wallet.public_key,
            token_address,
            amount = %amount,
            currency = %currency,
            "[SIMULATED] Buy order settled"
        );

        Ok(BuyFill {
            signature: simulated_signature(),
            fees: amount * fee_rate(),
            liquidity: amount * liquidity_multiplier(),
        })
    }

    async fn execute_sell(
        &self,
        open_buy: &Transaction,
        _params: &TradingParameters,
    ) -> Result<SellFill, ExecutionError> {
        self.settle_delay().await;

        let price = open_buy.purchase_price * sell_markup();

        tracing::info!(
            buy_id = %open_buy.id,
            token_address = %open_buy.token_address,
            price = %price,
            "[SIMULATED] Sell order settled"
        );

        Ok(SellFill {
            signature: simulated_signature(),
            price,
            fees: price * fee_rate(),
            liquidity: price * liquidity_multiplier(),
            gross_profit: price - open_buy.purchase_price,
        })
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}
