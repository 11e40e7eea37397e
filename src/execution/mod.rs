pub mod order_executor;
pub mod simulated;
pub mod venue;
pub mod venue_auth;

pub use order_executor::{
    BuyFill, ExecutionError, ExecutorMode, OrderExecutor, SellFill, UnknownExecutorMode,
};
pub use simulated::SimulatedExecutor;
pub use venue::VenueExecutor;
pub use venue_auth::VenueCredentials;

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;

/// Build the executor selected by `EXECUTOR_MODE`.
pub fn build_executor(config: &AppConfig) -> anyhow::Result<Arc<dyn OrderExecutor>> {
    match config.executor_mode {
        ExecutorMode::Simulated => Ok(Arc::new(SimulatedExecutor::new(Duration::from_millis(
            config.simulated_latency_ms,
        )))),
        ExecutorMode::Venue => {
            let (Some(url), Some(key), Some(secret)) = (
                config.venue_url.clone(),
                config.venue_api_key.clone(),
                config.venue_api_secret.clone(),
            ) else {
                anyhow::bail!("EXECUTOR_MODE=venue requires VENUE_URL, VENUE_API_KEY and VENUE_API_SECRET");
            };

            let http = reqwest::Client::builder()
                .timeout(config.execution_timeout)
                .build()?;

            Ok(Arc::new(VenueExecutor::new(
                http,
                VenueCredentials::new(key, secret),
                url,
            )))
        }
    }
}
