pub mod analytics;
pub mod health;
pub mod metrics;
pub mod parameters;
pub mod transactions;
pub mod users;
pub mod wallets;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};

use crate::errors::AppError;

/// Unwrap a JSON body, turning any rejection into a validation error.
pub(crate) fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// ISO-8601 timestamp or plain date (midnight UTC).
pub(crate) fn parse_date(field: &str, raw: Option<&str>) -> Result<Option<DateTime<Utc>>, AppError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Some(dt.and_utc()))
        .ok_or_else(|| AppError::BadRequest(format!("{field} must be an ISO-8601 date")))
}

/// Parse an optional integer query value.
pub(crate) fn parse_int(field: &str, raw: Option<&str>) -> Result<Option<i64>, AppError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| AppError::BadRequest(format!("{field} must be an integer")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn dates_accept_timestamps_and_plain_days() {
        assert_eq!(
            parse_date("startDate", Some("2024-03-01")).unwrap(),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            parse_date("startDate", Some("2024-03-01T12:30:00+02:00")).unwrap(),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap())
        );
        assert_eq!(parse_date("startDate", None).unwrap(), None);
        assert!(parse_date("endDate", Some("last tuesday")).is_err());
    }

    #[test]
    fn ints_reject_garbage() {
        assert_eq!(parse_int("page", Some("3")).unwrap(), Some(3));
        assert_eq!(parse_int("page", Some("")).unwrap(), None);
        assert!(parse_int("limit", Some("ten")).is_err());
    }
}
