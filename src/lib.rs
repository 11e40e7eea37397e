pub mod api;
pub mod config;
pub mod db;
pub mod errors;
pub mod execution;
pub mod ledger;
pub mod metrics;
pub mod models;
pub mod security;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use crate::api::rate_limit::RateLimitStore;
use crate::config::AppConfig;
use crate::ledger::Ledger;
use crate::security::{KeyVault, TokenIssuer};

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: AppConfig,
    pub ledger: Ledger,
    pub vault: KeyVault,
    pub tokens: TokenIssuer,
    pub rate_limiter: Arc<dyn RateLimitStore>,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}
