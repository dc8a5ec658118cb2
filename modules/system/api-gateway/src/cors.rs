use anyhow::bail;
use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::config::CorsConfig;

/// Build a CORS layer from config.
///
/// # Errors
///
/// Fails when `allow_credentials` is combined with a `"*"` origin, method or
/// header list. Browsers reject such responses and `tower-http` refuses to
/// build the layer.
pub fn build_cors_layer(cfg: &CorsConfig) -> anyhow::Result<CorsLayer> {
    let wildcard = |list: &[String]| list.iter().any(|v| v == "*");
    let any_origin = wildcard(&cfg.allowed_origins);
    let any_method = wildcard(&cfg.allowed_methods);
    let any_header = wildcard(&cfg.allowed_headers);

    if cfg.allow_credentials && (any_origin || any_method || any_header) {
        bail!(
            "CORS misconfiguration: \"*\" in allowed origins, methods or headers cannot be \
             combined with allow_credentials=true; list them explicitly"
        );
    }

    let mut layer = CorsLayer::new();

    if any_origin {
        warn!("CORS allows any origin; list explicit origins for production deployments");
        layer = layer.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = cfg
            .allowed_origins
            .iter()
            .filter_map(|s| HeaderValue::from_str(s.trim_end_matches('/')).ok())
            .collect();
        if !origins.is_empty() {
            layer = layer.allow_origin(origins);
        }
    }

    if any_method {
        layer = layer.allow_methods(Any);
    } else {
        let methods: Vec<Method> = cfg
            .allowed_methods
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        if !methods.is_empty() {
            layer = layer.allow_methods(methods);
        }
    }

    if any_header {
        layer = layer.allow_headers(Any);
    } else {
        let headers: Vec<HeaderName> = cfg
            .allowed_headers
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        if !headers.is_empty() {
            layer = layer.allow_headers(headers);
        }
    }

    if cfg.allow_credentials {
        layer = layer.allow_credentials(true);
    }

    if cfg.max_age_seconds > 0 {
        layer = layer.max_age(std::time::Duration::from_secs(cfg.max_age_seconds));
    }

    Ok(layer)
}
