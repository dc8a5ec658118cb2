//! Strips `<` and `>` from every string in query parameters and JSON bodies
//! before handlers, and through them the prompts and graph queries, see them.

use axum::body::{Body, to_bytes};
use axum::extract::Request;
use axum::http::uri::PathAndQuery;
use axum::http::{HeaderMap, HeaderValue, Uri, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use http_body_util::LengthLimitError;
use serde_json::Value;
use zesty_errors::codes;

pub async fn sanitize_middleware(req: Request, next: Next) -> Response {
    match sanitize_request(req).await {
        Ok(req) => next.run(req).await,
        Err(resp) => resp,
    }
}

async fn sanitize_request(req: Request) -> Result<Request, Response> {
    let (mut parts, body) = req.into_parts();

    if let Some(uri) = parts.uri.query().and_then(sanitize_query).and_then(|clean| {
        let path = parts.uri.path();
        let path_and_query = if clean.is_empty() {
            path.to_owned()
        } else {
            format!("{path}?{clean}")
        };
        with_path_and_query(&parts.uri, &path_and_query)
    }) {
        parts.uri = uri;
    }

    if !is_json(&parts.headers) {
        return Ok(Request::from_parts(parts, body));
    }

    // The enclosing body limit layer bounds this read.
    let raw = to_bytes(body, usize::MAX).await.map_err(|e| {
        if is_length_limit(&e) {
            codes::payload_too_large("request body exceeds the configured limit").into_response()
        } else {
            tracing::debug!(error = %e, "failed to read request body");
            codes::validation("request body could not be read", &[]).into_response()
        }
    })?;

    let cleaned = sanitize_json(&raw).unwrap_or(raw);
    parts
        .headers
        .insert(header::CONTENT_LENGTH, HeaderValue::from(cleaned.len()));
    Ok(Request::from_parts(parts, Body::from(cleaned)))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| ct.split(';').next())
        .is_some_and(|mime| {
            let mime = mime.trim();
            mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
        })
}

fn is_length_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}

fn with_path_and_query(uri: &Uri, path_and_query: &str) -> Option<Uri> {
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query).ok()?);
    Uri::from_parts(parts).ok()
}

/// Remove angle brackets in place; `true` when anything was removed.
fn strip(s: &mut String) -> bool {
    if !s.contains(['<', '>']) {
        return false;
    }
    s.retain(|c| c != '<' && c != '>');
    true
}

fn strip_value(value: &mut Value) -> bool {
    match value {
        Value::String(s) => strip(s),
        Value::Array(items) => items.iter_mut().fold(false, |changed, v| strip_value(v) | changed),
        Value::Object(map) => map
            .values_mut()
            .fold(false, |changed, v| strip_value(v) | changed),
        Value::Null | Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Re-encoded query with brackets removed from every value, or `None` when
/// nothing needed changing or the query does not parse.
fn sanitize_query(query: &str) -> Option<String> {
    let mut pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).ok()?;
    let changed = pairs
        .iter_mut()
        .fold(false, |changed, (_, v)| strip(v) | changed);
    if !changed {
        return None;
    }
    serde_urlencoded::to_string(&pairs).ok()
}

/// Sanitized body, or `None` when nothing needed changing or the body is not
/// JSON (the handler's extractor reports that).
fn sanitize_json(raw: &Bytes) -> Option<Bytes> {
    let mut value: Value = serde_json::from_slice(raw).ok()?;
    if !strip_value(&mut value) {
        return None;
    }
    serde_json::to_vec(&value).ok().map(Bytes::from)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_nested_strings_only() {
        let raw = Bytes::from(
            serde_json::to_vec(&json!({
                "prompt": "<script>alert(1)</script>",
                "list": [{ "name": "<b>Jazz</b>" }, 5, true],
                "<key>": null
            }))
            .unwrap(),
        );

        let cleaned: Value = serde_json::from_slice(&sanitize_json(&raw).unwrap()).unwrap();

        assert_eq!(cleaned["prompt"], "scriptalert(1)/script");
        assert_eq!(cleaned["list"][0]["name"], "bJazz/b");
        assert_eq!(cleaned["list"][1], 5);
        assert!(cleaned.get("<key>").is_some());
    }

    #[test]
    fn clean_or_invalid_bodies_are_left_alone() {
        assert!(sanitize_json(&Bytes::from_static(br#"{"prompt":"fine"}"#)).is_none());
        assert!(sanitize_json(&Bytes::from_static(b"{not json")).is_none());
    }

    #[test]
    fn query_values_are_stripped() {
        let clean = sanitize_query("query=%3Cb%3EJazz%3C%2Fb%3E&type=music").unwrap();
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(&clean).unwrap();
        assert_eq!(pairs[0], ("query".to_owned(), "bJazz/b".to_owned()));
        assert_eq!(pairs[1], ("type".to_owned(), "music".to_owned()));
        assert!(sanitize_query("query=Jazz&type=music").is_none());
    }

    #[test]
    fn json_content_types() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        assert!(is_json(&headers));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        assert!(!is_json(&headers));
    }
}
