use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{Currency, TransactionStatus, TransactionType};

/// Database row for the transactions table.
///
/// A SELL points at the BUY it closes through `closes_transaction_id`;
/// the BUY records the moment it was closed in `closed_at`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub wallet_id: Uuid,
    /// Joined from wallets when listing; absent on single-row reads.
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_public_key: Option<String>,
    pub parameters_id: Option<Uuid>,
    pub token_address: String,
    pub token_name: Option<String>,
    pub token_symbol: Option<String>,
    pub transaction_signature: String,
    pub block_explorer_url: String,
    pub status: TransactionStatus,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    pub purchase_price: Decimal,
    pub sale_price: Option<Decimal>,
    pub liquidity: Decimal,
    pub tip_amount: Option<Decimal>,
    pub tip_currency: Option<Currency>,
    pub buying_fees: Option<Decimal>,
    pub selling_fees: Option<Decimal>,
    pub profit_loss: Option<Decimal>,
    pub closes_transaction_id: Option<Uuid>,
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn is_buy(&self) -> bool {
        self.tx_type == TransactionType::Buy
    }

    /// True for a BUY that no SELL has closed yet.
    pub fn is_open(&self) -> bool {
        self.is_buy() && self.closed_at.is_none()
    }
}

/// Columns for a new ledger entry, assembled before the executor runs.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub wallet_id: Uuid,
    pub parameters_id: Option<Uuid>,
    pub token_address: String,
    pub token_name: Option<String>,
    pub token_symbol: Option<String>,
    pub transaction_signature: String,
    pub block_explorer_url: String,
    pub status: TransactionStatus,
    pub tx_type: TransactionType,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    pub purchase_price: Decimal,
    pub sale_price: Option<Decimal>,
    pub liquidity: Decimal,
    pub tip_amount: Option<Decimal>,
    pub tip_currency: Option<Currency>,
    pub buying_fees: Option<Decimal>,
    pub selling_fees: Option<Decimal>,
    pub profit_loss: Option<Decimal>,
    pub closes_transaction_id: Option<Uuid>,
}
