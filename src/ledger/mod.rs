pub mod analytics;
pub mod error;
pub mod transactions;

pub use analytics::{DateRange, OverviewMetrics, PerformanceMetrics};
pub use error::LedgerError;
pub use transactions::{BuyRequest, Ledger, LedgerSettings, TransactionPage};
