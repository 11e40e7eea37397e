use std::net::SocketAddr;
use std::sync::Arc;

use tradelog::api::rate_limit::InMemoryRateLimiter;
use tradelog::api::router::create_router;
use tradelog::config::AppConfig;
use tradelog::db::{self, user_repo};
use tradelog::execution::build_executor;
use tradelog::ledger::{Ledger, LedgerSettings};
use tradelog::security::{passwords, KeyVault, TokenIssuer};
use tradelog::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    init_tracing(config.log_json);

    // reqwest and sqlx share rustls; pick the provider once.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let addr = format!("{}:{}", config.host, config.port);

    tracing::info!("Connecting to database...");
    let db = db::init_pool(&config.database_url, config.db_max_connections).await?;
    db::run_migrations(&db).await?;
    tracing::info!("Database connected");

    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        let hash = passwords::hash_password(password)?;
        let admin = user_repo::ensure_admin(&db, email, &hash).await?;
        tracing::info!(user_id = %admin.id, email = %admin.email, "Admin account ready");
    } else {
        tracing::warn!("ADMIN_EMAIL/ADMIN_PASSWORD not set; no admin account bootstrapped");
    }

    let executor = build_executor(&config)?;
    tracing::info!(executor = executor.name(), "Order executor ready");

    let ledger = Ledger::new(
        db.clone(),
        executor,
        LedgerSettings {
            execution_timeout: config.execution_timeout,
            explorer_base_url: config.explorer_base_url.clone(),
        },
    );

    let state = AppState {
        db,
        vault: KeyVault::new(&config.encryption_key),
        tokens: TokenIssuer::new(&config.jwt_secret, config.jwt_expiration_hours),
        rate_limiter: Arc::new(InMemoryRateLimiter::new(
            config.rate_limit_max,
            config.rate_limit_window,
        )),
        metrics_handle: tradelog::metrics::init_metrics(),
        ledger,
        config,
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn init_tracing(json: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tradelog=info,tower_http=info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
