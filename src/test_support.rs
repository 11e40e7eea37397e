//! Fixtures shared by unit tests.

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{
    BuyParameters, Currency, SellParameters, StopLossParameters, TradingParameters, Transaction,
    TransactionStatus, TransactionType, Wallet,
};

pub fn wallet() -> Wallet {
    Wallet {
        id: Uuid::new_v4(),
        public_key: "SimWallet111".into(),
        encrypted_private_key: "opaque".into(),
        balance: Decimal::ZERO,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn params() -> TradingParameters {
    TradingParameters {
        id: Uuid::new_v4(),
        buy_parameters: BuyParameters {
            buy_in_amount: Decimal::from(10),
            buy_in_currency: Currency::Sol,
            tip_amount: Decimal::new(1, 3),
            tip_currency: Currency::Sol,
            slippage_percentage: Decimal::from(5),
        },
        sell_parameters: SellParameters {
            return_trigger_percentage: Decimal::from(10),
            max_trade_time_minutes: None,
            profit_distribution_percentage: Decimal::from(100),
        },
        stop_loss_parameters: StopLossParameters {
            total_loss_limit_percentage: Decimal::from(20),
        },
        is_active: true,
        updated_by: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// A completed, still-open BUY with simulated fees.
pub fn open_buy(purchase_price: Decimal) -> Transaction {
    Transaction {
        id: Uuid::new_v4(),
        wallet_id: Uuid::new_v4(),
        wallet_public_key: None,
        parameters_id: None,
        token_address: "TokenMint111".into(),
        token_name: Some("Test Token".into()),
        token_symbol: Some("TST".into()),
        transaction_signature: "sig".into(),
        block_explorer_url: "https://explorer.solana.com/tx/sig".into(),
        status: TransactionStatus::Completed,
        tx_type: TransactionType::Buy,
        entry_time: Utc::now(),
        exit_time: None,
        purchase_price,
        sale_price: None,
        liquidity: purchase_price * Decimal::TEN,
        tip_amount: Some(Decimal::new(1, 3)),
        tip_currency: Some(Currency::Sol),
        buying_fees: Some(purchase_price * Decimal::new(1, 2)),
        selling_fees: None,
        profit_loss: None,
        closes_transaction_id: None,
        closed_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
