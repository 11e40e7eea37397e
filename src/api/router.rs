use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;
use super::auth::require_auth;
use super::handlers;
use super::rate_limit::rate_limit;

pub fn create_router(state: AppState) -> Router {
    // Public routes — no authentication required
    let public = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render));

    let login = Router::new().route("/api/users/login", post(handlers::users::login));

    // Protected API routes — require a Bearer token issued at login
    let protected = Router::new()
        // Users
        .route("/api/users/logout", post(handlers::users::logout))
        .route("/api/users/change-password", post(handlers::users::change_password))
        // Wallets
        .route("/api/wallets", get(handlers::wallets::list).post(handlers::wallets::create))
        .route("/api/wallets/:id", get(handlers::wallets::detail).delete(handlers::wallets::remove))
        // Trading parameters
        .route(
            "/api/trading-parameters",
            get(handlers::parameters::active).post(handlers::parameters::create),
        )
        .route("/api/trading-parameters/:id", put(handlers::parameters::update))
        .route("/api/trading-parameters/:id/activate", post(handlers::parameters::activate))
        // Transactions
        .route("/api/transactions", get(handlers::transactions::list))
        .route("/api/transactions/buy", post(handlers::transactions::buy))
        .route("/api/transactions/sell", post(handlers::transactions::sell))
        .route("/api/transactions/:id", get(handlers::transactions::detail))
        // Analytics
        .route("/api/transactions/analytics/overview", get(handlers::analytics::overview))
        .route("/api/transactions/analytics/performance", get(handlers::analytics::performance))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Every /api route counts against the caller's budget, login included
    let api = login
        .merge(protected)
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
