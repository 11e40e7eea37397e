use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::ledger::LedgerError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Too many requests")]
    TooManyRequests(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    status: &'static str,
    kind: &'static str,
    message: String,
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::TooManyRequests(msg) => {
                (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED", msg.clone())
            }
            AppError::Ledger(e) => {
                let status = match e {
                    LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
                    LedgerError::NoActiveConfig | LedgerError::InvalidReference => {
                        StatusCode::BAD_REQUEST
                    }
                    LedgerError::AlreadyClosed(_) => StatusCode::CONFLICT,
                    LedgerError::ExecutionFailed(_) | LedgerError::ExecutionTimeout(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                    LedgerError::Internal(inner) => {
                        tracing::error!("Internal error: {inner:?}");
                        return (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "INTERNAL",
                            "Internal server error".into(),
                        );
                    }
                };
                (status, e.kind(), e.to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "Internal server error".into(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message) = self.parts();

        (
            status,
            Json(ErrorBody {
                status: "error",
                kind,
                message,
            }),
        )
            .into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Internal(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn ledger_errors_map_to_http_status() {
        let cases = [
            (LedgerError::NotFound("Wallet not found".into()), StatusCode::NOT_FOUND),
            (LedgerError::NoActiveConfig, StatusCode::BAD_REQUEST),
            (LedgerError::InvalidReference, StatusCode::BAD_REQUEST),
            (LedgerError::AlreadyClosed(Uuid::new_v4()), StatusCode::CONFLICT),
            (
                LedgerError::ExecutionTimeout(std::time::Duration::from_secs(30)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let kind = err.kind();
            let (status, body_kind, _) = AppError::from(err).parts();
            assert_eq!(status, expected);
            assert_eq!(body_kind, kind);
        }
    }

    #[test]
    fn internal_details_are_not_exposed() {
        let (status, kind, message) =
            AppError::Ledger(LedgerError::Internal(anyhow::anyhow!("pool timed out"))).parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(kind, "INTERNAL");
        assert_eq!(message, "Internal server error");
    }
}
