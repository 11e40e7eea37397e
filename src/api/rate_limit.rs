use std::collections::VecDeque;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use dashmap::DashMap;
use metrics::counter;

use crate::errors::AppError;
use crate::AppState;

pub const RATE_LIMIT_MESSAGE: &str = "Too many requests from this IP, please try again later";

/// Per-caller request accounting.
pub trait RateLimitStore: Send + Sync {
    /// Record a hit for `key`; false when the caller is over its limit.
    fn check_and_record(&self, key: &str) -> bool;
}

/// Sliding window kept in memory, one timestamp queue per caller.
pub struct InMemoryRateLimiter {
    max_requests: usize,
    window: Duration,
    hits: DashMap<String, VecDeque<Instant>>,
}

impl InMemoryRateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            hits: DashMap::new(),
        }
    }
}

impl RateLimitStore for InMemoryRateLimiter {
    fn check_and_record(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut entry = self.hits.entry(key.to_string()).or_default();

        while let Some(oldest) = entry.front() {
            if now.duration_since(*oldest) >= self.window {
                entry.pop_front();
            } else {
                break;
            }
        }

        if entry.len() >= self.max_requests {
            return false;
        }
        entry.push_back(now);
        true
    }
}

/// First `X-Forwarded-For` hop, else the peer address, else "unknown".
pub fn caller_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".into())
}

pub async fn rate_limit(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let key = caller_key(req.headers(), peer);

    if !state.rate_limiter.check_and_record(&key) {
        counter!("rate_limited_requests_total").increment(1);
        tracing::warn!(caller = %key, "Rate limit exceeded");
        return AppError::TooManyRequests(RATE_LIMIT_MESSAGE.into()).into_response();
    }

    next.run(req).await
}
