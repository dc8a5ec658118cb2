use axum::body::to_bytes;
use axum::extract::Request;
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use zesty_errors::{APPLICATION_PROBLEM_JSON, Problem, codes};

use crate::middleware::request_id;

/// Error bodies larger than this are not inspected.
const MAX_ERROR_BODY: usize = 64 * 1024;

/// Turns every error response into a Problem and stamps it with the request
/// path and id.
///
/// Problems produced by handlers only get `instance` and `trace_id` filled
/// in. Bare framework errors (extractor rejections, unmatched methods) are
/// wrapped; the text of a 4xx becomes the detail, a 5xx gets a generic one.
pub async fn error_mapping_middleware(req: Request, next: Next) -> Response {
    let instance = req.uri().path().to_owned();
    let trace_id = request_id::from_headers(req.headers());

    let resp = next.run(req).await;
    let status = resp.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return resp;
    }

    let (parts, body) = resp.into_parts();
    let bytes = to_bytes(body, MAX_ERROR_BODY).await.unwrap_or_default();

    let mut problem = if is_problem(&parts.headers) {
        serde_json::from_slice::<Problem>(&bytes)
            .unwrap_or_else(|_| from_bare(status, ""))
    } else {
        from_bare(status, String::from_utf8_lossy(&bytes).trim())
    };
    if problem.instance.is_empty() {
        problem = problem.with_instance(instance);
    }
    if problem.trace_id.is_none()
        && let Some(tid) = trace_id
    {
        problem = problem.with_trace_id(tid);
    }

    let mut out = problem.into_response();
    for name in [header::ALLOW, header::RETRY_AFTER] {
        if let Some(value) = parts.headers.get(&name) {
            out.headers_mut().insert(name, value.clone());
        }
    }
    out
}

fn is_problem(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains(APPLICATION_PROBLEM_JSON))
}

fn from_bare(status: StatusCode, text: &str) -> Problem {
    let title = status.canonical_reason().unwrap_or("Error");
    if status.is_server_error() {
        return Problem::new(status, title, "An internal error occurred")
            .with_code(codes::INTERNAL_ERROR);
    }
    let detail = if text.is_empty() { title } else { text };
    let code = match status {
        StatusCode::BAD_REQUEST
        | StatusCode::UNSUPPORTED_MEDIA_TYPE
        | StatusCode::UNPROCESSABLE_ENTITY => codes::VALIDATION_ERROR.to_owned(),
        StatusCode::NOT_FOUND => codes::NOT_FOUND.to_owned(),
        StatusCode::PAYLOAD_TOO_LARGE => codes::PAYLOAD_TOO_LARGE.to_owned(),
        StatusCode::TOO_MANY_REQUESTS => codes::RATE_LIMITED.to_owned(),
        other => format!("HTTP_{}", other.as_u16()),
    };
    Problem::new(status, title, detail).with_code(code)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn bare_client_errors_keep_their_text() {
        let p = from_bare(StatusCode::UNPROCESSABLE_ENTITY, "missing field `prompt`");
        assert_eq!(p.detail, "missing field `prompt`");
        assert_eq!(p.code, codes::VALIDATION_ERROR);
    }

    #[test]
    fn bare_server_errors_are_generic() {
        let p = from_bare(StatusCode::BAD_GATEWAY, "upstream said: secret stuff");
        assert_eq!(p.detail, "An internal error occurred");
        assert_eq!(p.code, codes::INTERNAL_ERROR);
    }

    #[test]
    fn other_statuses_get_numbered_codes() {
        let p = from_bare(StatusCode::METHOD_NOT_ALLOWED, "");
        assert_eq!(p.code, "HTTP_405");
        assert_eq!(p.detail, "Method Not Allowed");
    }
}
