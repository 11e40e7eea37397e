use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use crate::execution::ExecutionError;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{0}")]
    NotFound(String),

    #[error("No active trading parameters found")]
    NoActiveConfig,

    #[error("Referenced transaction is not a buy transaction")]
    InvalidReference,

    #[error("Buy transaction {0} is already closed")]
    AlreadyClosed(Uuid),

    #[error("Order execution failed: {0}")]
    ExecutionFailed(#[from] ExecutionError),

    #[error("Order execution timed out after {0:?}")]
    ExecutionTimeout(Duration),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl LedgerError {
    /// Stable, machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::NotFound(_) => "NOT_FOUND",
            LedgerError::NoActiveConfig => "NO_ACTIVE_CONFIG",
            LedgerError::InvalidReference => "INVALID_REFERENCE",
            LedgerError::AlreadyClosed(_) => "ALREADY_CLOSED",
            LedgerError::ExecutionFailed(_) => "EXECUTION_FAILED",
            LedgerError::ExecutionTimeout(_) => "EXECUTION_TIMEOUT",
            LedgerError::Internal(_) => "INTERNAL",
        }
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        LedgerError::Internal(e.into())
    }
}
