use async_trait::async_trait;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::models::{Currency, TradingParameters, Transaction, Wallet};

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("order rejected by venue: {0}")]
    Rejected(String),

    #[error("venue request failed: {0}")]
    Transport(String),

    #[error("unexpected venue response: {0}")]
    Malformed(String),

    #[error("request signing failed: {0}")]
    Signing(#[from] super::venue_auth::SigningError),
}

/// Settlement of a buy order.
#[derive(Debug, Clone, PartialEq)]
pub struct BuyFill {
    pub signature: String,
    pub fees: Decimal,
    pub liquidity: Decimal,
}

/// Settlement of a sell order. `price` is quoted in the currency of the
/// BUY it closes.
#[derive(Debug, Clone, PartialEq)]
pub struct SellFill {
    pub signature: String,
    pub price: Decimal,
    pub fees: Decimal,
    pub liquidity: Decimal,
    /// Venue-reported profit before fees.
    pub gross_profit: Decimal,
}

/// A place that can settle buy and sell orders.
#[async_trait]
pub trait OrderExecutor: Send + Sync {
    async fn execute_buy(
        &self,
        wallet: &Wallet,
        token_address: &str,
        amount: Decimal,
        currency: Currency,
        params: &TradingParameters,
    ) -> Result<BuyFill, ExecutionError>;

    async fn execute_sell(
        &self,
        open_buy: &Transaction,
        params: &TradingParameters,
    ) -> Result<SellFill, ExecutionError>;

    /// Short name for logs and metrics labels.
    fn name(&self) -> &'static str;
}

/// Which executor the service is wired with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorMode {
    Simulated,
    Venue,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown executor mode '{0}', expected 'simulated' or 'venue'")]
pub struct UnknownExecutorMode(pub String);

impl FromStr for ExecutorMode {
    type Err = UnknownExecutorMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simulated" => Ok(ExecutorMode::Simulated),
            "venue" => Ok(ExecutorMode::Venue),
            _ => Err(UnknownExecutorMode(s.to_string())),
        }
    }
}

impl fmt::Display for ExecutorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutorMode::Simulated => write!(f, "simulated"),
            ExecutorMode::Venue => write!(f, "venue"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parses_known_names() {
        assert_eq!("venue".parse::<ExecutorMode>(), Ok(ExecutorMode::Venue));
        assert_eq!("VENUE".parse::<ExecutorMode>(), Ok(ExecutorMode::Venue));
        assert_eq!(" simulated ".parse::<ExecutorMode>(), Ok(ExecutorMode::Simulated));
        assert_eq!(ExecutorMode::Simulated.to_string(), "simulated");
    }

    #[test]
    fn test_mode_rejects_typos() {
        let err = "venu".parse::<ExecutorMode>().unwrap_err();
        assert_eq!(err, UnknownExecutorMode("venu".into()));
        assert!(err.to_string().contains("'venu'"));
        assert!("mock".parse::<ExecutorMode>().is_err());
    }
}
