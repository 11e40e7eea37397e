use std::env;
use std::time::Duration;

use crate::execution::ExecutorMode;

const DEFAULT_EXPLORER_BASE_URL: &str = "https://explorer.solana.com/tx";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub log_json: bool,

    // Auth
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,

    // Wallet key storage
    pub encryption_key: String,

    // Execution
    pub executor_mode: ExecutorMode,
    pub simulated_latency_ms: u64,
    pub execution_timeout: Duration,
    pub explorer_base_url: String,
    pub venue_url: Option<String>,
    pub venue_api_key: Option<String>,
    pub venue_api_secret: Option<String>,

    // Rate limiting
    pub rate_limit_max: usize,
    pub rate_limit_window: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".into())
                .parse()
                .unwrap_or(10),
            log_json: env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),

            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?,
            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .unwrap_or_else(|_| "72".into())
                .parse()
                .unwrap_or(72),
            admin_email: env::var("ADMIN_EMAIL").ok().filter(|s| !s.is_empty()),
            admin_password: env::var("ADMIN_PASSWORD").ok().filter(|s| !s.is_empty()),

            encryption_key: env::var("ENCRYPTION_KEY")
                .map_err(|_| anyhow::anyhow!("ENCRYPTION_KEY must be set"))?,

            executor_mode: env::var("EXECUTOR_MODE")
                .unwrap_or_else(|_| "simulated".into())
                .parse::<ExecutorMode>()
                .map_err(|e| anyhow::anyhow!("EXECUTOR_MODE: {e}"))?,
            simulated_latency_ms: env::var("SIMULATED_LATENCY_MS")
                .unwrap_or_else(|_| "1000".into())
                .parse()
                .unwrap_or(1_000),
            execution_timeout: Duration::from_secs(
                env::var("EXECUTION_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".into())
                    .parse()
                    .unwrap_or(30),
            ),
            explorer_base_url: env::var("EXPLORER_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_EXPLORER_BASE_URL.into()),
            venue_url: env::var("VENUE_URL").ok(),
            venue_api_key: env::var("VENUE_API_KEY").ok(),
            venue_api_secret: env::var("VENUE_API_SECRET").ok(),

            rate_limit_max: env::var("RATE_LIMIT_MAX")
                .unwrap_or_else(|_| "100".into())
                .parse()
                .unwrap_or(100),
            rate_limit_window: Duration::from_secs(
                env::var("RATE_LIMIT_WINDOW_SECS")
                    .unwrap_or_else(|_| "900".into())
                    .parse()
                    .unwrap_or(900),
            ),
        })
    }

    /// Returns true if both admin bootstrap credentials are configured.
    pub fn has_admin_bootstrap(&self) -> bool {
        self.admin_email.is_some() && self.admin_password.is_some()
    }
}
