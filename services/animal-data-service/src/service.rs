use axum::http::StatusCode;

use crate::models::{
    AnimalQuery, ErrorResponse, HistoryResponse, LatestResponse, OverviewResponse, ReadResponse,
    StoreResponse,
};
use crate::payload::{parse_animal_payload, PayloadError, REQUIRED_FIELDS};
use crate::state::EndpointState;
use crate::store::HistoryLimit;

const HISTORY_STORED_MESSAGE: &str = "Animal data stored successfully";
const LATEST_STORED_MESSAGE: &str = "Latest animal data stored successfully";
const ALLOWED_METHODS: [&str; 2] = ["GET", "POST"];

#[derive(Debug)]
pub struct ServiceError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ServiceError {
    pub fn missing_fields() -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorResponse {
                error: "Missing required fields",
                message: None,
                required: Some(REQUIRED_FIELDS.to_vec()),
                allowed_methods: None,
            },
        }
    }

    pub fn method_not_allowed() -> Self {
        Self {
            status: StatusCode::METHOD_NOT_ALLOWED,
            body: ErrorResponse {
                error: "Method not allowed",
                message: None,
                required: None,
                allowed_methods: Some(ALLOWED_METHODS.to_vec()),
            },
        }
    }

    pub fn internal(message: String) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorResponse {
                error: "Internal server error",
                message: Some(message),
                required: None,
                allowed_methods: None,
            },
        }
    }
}

impl From<PayloadError> for ServiceError {
    fn from(err: PayloadError) -> Self {
        match err {
            PayloadError::MissingFields => {
                tracing::warn!("rejected animal data without required fields");
                Self::missing_fields()
            }
            other => {
                tracing::error!(error = %other, "animal data payload failed");
                Self::internal(other.to_string())
            }
        }
    }
}

pub async fn store_animal(
    state: &EndpointState,
    body: &[u8],
) -> Result<StoreResponse, ServiceError> {
    let candidate = parse_animal_payload(body)?;
    let record = state.store.put(candidate).await;

    tracing::info!(
        id = record.id,
        job_id = %record.job_id,
        generation = %record.generation,
        display_name = %record.display_name,
        source = %record.source,
        timestamp = %record.timestamp,
        "stored animal data"
    );

    let message = if state.store.retains_history() {
        HISTORY_STORED_MESSAGE
    } else {
        LATEST_STORED_MESSAGE
    };
    Ok(StoreResponse {
        success: true,
        message,
        data: record,
    })
}

pub async fn read_latest(state: &EndpointState) -> ReadResponse {
    let data = state.store.latest().await;
    ReadResponse::Latest(LatestResponse {
        success: true,
        has_data: data.is_some(),
        data,
    })
}

pub async fn read_animal(state: &EndpointState, query: &AnimalQuery) -> ReadResponse {
    if query.is_set("latest") {
        return read_latest(state).await;
    }

    if query.is_set("history") {
        let limit = resolve_limit(query.value("limit").as_deref(), state.default_history_limit);
        let (data, total) = state.store.history(limit).await;
        return ReadResponse::History(HistoryResponse {
            success: true,
            data,
            total,
        });
    }

    let overview = state.store.overview(state.overview_history_limit).await;
    ReadResponse::Overview(OverviewResponse {
        success: true,
        has_data: overview.latest.is_some(),
        latest: overview.latest,
        history: overview.history,
        total_history: overview.total,
    })
}

// Only a value without any leading integer falls back to the default.
fn resolve_limit(raw: Option<&str>, default: usize) -> HistoryLimit {
    let Some(raw) = raw.filter(|value| !value.is_empty()) else {
        return HistoryLimit::First(default);
    };
    match parse_leading_int(raw) {
        Some(value) if value < 0 => {
            HistoryLimit::AllButLast(usize::try_from(value.unsigned_abs()).unwrap_or(usize::MAX))
        }
        Some(value) => HistoryLimit::First(usize::try_from(value).unwrap_or(usize::MAX)),
        None => {
            tracing::debug!(limit = raw, "unparsable history limit, using default");
            HistoryLimit::First(default)
        }
    }
}

// Leading whitespace, an optional sign, an optional 0x prefix, then digits up
// to the first character that is not one. "3abc" is 3, "2.5" is 2.
fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let (radix, digits) = match rest.get(..2) {
        Some("0x") | Some("0X") => (16, &rest[2..]),
        _ => (10, rest),
    };

    let mut value: i64 = 0;
    let mut seen_digit = false;
    for digit in digits.chars().map_while(|c| c.to_digit(radix)) {
        seen_digit = true;
        value = value
            .saturating_mul(i64::from(radix))
            .saturating_add(i64::from(digit));
    }
    seen_digit.then_some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_resolution() {
        assert_eq!(resolve_limit(None, 10), HistoryLimit::First(10));
        assert_eq!(resolve_limit(Some(""), 10), HistoryLimit::First(10));
        assert_eq!(resolve_limit(Some("abc"), 10), HistoryLimit::First(10));
        assert_eq!(resolve_limit(Some("   "), 10), HistoryLimit::First(10));
        assert_eq!(resolve_limit(Some(" 25 "), 10), HistoryLimit::First(25));
        assert_eq!(resolve_limit(Some("0"), 10), HistoryLimit::First(0));
        assert_eq!(resolve_limit(Some("-3"), 10), HistoryLimit::AllButLast(3));
        assert_eq!(resolve_limit(Some("3abc"), 10), HistoryLimit::First(3));
        assert_eq!(resolve_limit(Some("2.5"), 10), HistoryLimit::First(2));
        assert_eq!(resolve_limit(Some("3,4"), 10), HistoryLimit::First(3));
    }

    #[test]
    fn leading_int_parsing() {
        assert_eq!(parse_leading_int("+7"), Some(7));
        assert_eq!(parse_leading_int("0x1f"), Some(31));
        assert_eq!(parse_leading_int("0x"), None);
        assert_eq!(parse_leading_int("-"), None);
        assert_eq!(parse_leading_int("99999999999999999999999"), Some(i64::MAX));
    }

    #[test]
    fn flags_require_a_single_exact_true() {
        let query = |pairs: &[(&str, &str)]| {
            AnimalQuery::from_pairs(
                pairs
                    .iter()
                    .map(|(key, value)| (key.to_string(), value.to_string()))
                    .collect(),
            )
        };
        assert!(query(&[("latest", "true")]).is_set("latest"));
        assert!(!query(&[("latest", "TRUE")]).is_set("latest"));
        assert!(!query(&[("latest", "1")]).is_set("latest"));
        assert!(!query(&[]).is_set("latest"));
        assert!(!query(&[("latest", "true"), ("latest", "true")]).is_set("latest"));
    }

    #[test]
    fn missing_fields_error_lists_required_fields_in_order() {
        let err = ServiceError::missing_fields();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        let body = serde_json::to_value(&err.body).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "error": "Missing required fields",
                "required": ["jobId", "generation", "displayName"]
            })
        );
    }

    #[test]
    fn type_errors_map_to_internal_error() {
        let err = ServiceError::from(PayloadError::NotAString { field: "generation" });
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body.message.as_deref(), Some("generation must be a string"));
    }
}
