//! Machine-readable problem codes and the constructors that use them.

use http::StatusCode;

use crate::problem::{Problem, ValidationViolation};

pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const RATE_LIMITED: &str = "RATE_LIMITED";
pub const PAYLOAD_TOO_LARGE: &str = "PAYLOAD_TOO_LARGE";
pub const UPSTREAM_FAILURE: &str = "UPSTREAM_FAILURE";
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";

/// 400 for a request that is missing required input.
///
/// `fields` lists the missing or invalid fields; each becomes a violation entry.
pub fn validation(detail: impl Into<String>, fields: &[&str]) -> Problem {
    let p = Problem::new(StatusCode::BAD_REQUEST, "Bad Request", detail)
        .with_type("https://zesty.app/problems/validation")
        .with_code(VALIDATION_ERROR);
    if fields.is_empty() {
        return p;
    }
    p.with_errors(
        fields
            .iter()
            .map(|field| ValidationViolation {
                field: (*field).to_owned(),
                message: format!("{field} is required"),
                code: Some("required".to_owned()),
            })
            .collect(),
    )
}

pub fn not_found(detail: impl Into<String>) -> Problem {
    Problem::new(StatusCode::NOT_FOUND, "Not Found", detail).with_code(NOT_FOUND)
}

/// 429 for a client that exhausted its request window.
pub fn rate_limited(detail: impl Into<String>) -> Problem {
    Problem::new(StatusCode::TOO_MANY_REQUESTS, "Too Many Requests", detail)
        .with_type("https://zesty.app/problems/rate-limited")
        .with_code(RATE_LIMITED)
}

pub fn payload_too_large(detail: impl Into<String>) -> Problem {
    Problem::new(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large", detail)
        .with_code(PAYLOAD_TOO_LARGE)
}

/// 500 for a failed passthrough call. The detail is fixed by the caller and
/// must not contain anything returned by the upstream service.
pub fn upstream_failure(detail: impl Into<String>) -> Problem {
    Problem::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error",
        detail,
    )
    .with_type("https://zesty.app/problems/upstream")
    .with_code(UPSTREAM_FAILURE)
}

pub fn internal_error(detail: impl Into<String>) -> Problem {
    Problem::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error",
        detail,
    )
    .with_code(INTERNAL_ERROR)
}
