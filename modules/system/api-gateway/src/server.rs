use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::{Request, Response, StatusCode};
use axum::middleware::{from_fn, from_fn_with_state};
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::field::Empty;

use crate::api::rest::routes;
use crate::config::ApiGatewayConfig;
use crate::cors::build_cors_layer;
use crate::middleware::{error_mapping, rate_limit, request_id, sanitize};
use crate::state::AppState;

/// The routed application with the full middleware stack applied.
///
/// Layers are registered innermost first. At runtime a request passes, from
/// the outside in:
///
///   1. `SetRequestId`       - reuse `x-request-id` or assign a UUID
///   2. `PropagateRequestId` - echo the id on the response
///   3. Trace                - one span per request
///   4. Timeout              - 504 after `request_timeout`
///   5. CORS                 - when enabled
///   6. `RateLimit`          - fixed window per peer IP, when enabled
///   7. `ErrorMapping`       - every error response becomes a Problem
///   8. `BodyLimit`          - 413 above `body_limit_bytes`
///   9. Sanitize             - strip angle brackets from input strings
///  10. Router
///
/// # Errors
/// Returns an error when the CORS settings are inconsistent.
pub fn build_app(state: AppState, cfg: &ApiGatewayConfig) -> anyhow::Result<Router> {
    let mut router = routes::router(state);

    // 9) Sanitize
    router = router.layer(from_fn(sanitize::sanitize_middleware));

    // 8) Body limit
    router = router.layer(RequestBodyLimitLayer::new(cfg.body_limit_bytes));
    router = router.layer(DefaultBodyLimit::max(cfg.body_limit_bytes));

    // 7) Error mapping
    router = router.layer(from_fn(error_mapping::error_mapping_middleware));

    // 6) Rate limit
    if cfg.rate_limit.enabled {
        let limiter = Arc::new(rate_limit::FixedWindowLimiter::new(&cfg.rate_limit));
        router = router.layer(from_fn_with_state(
            limiter,
            rate_limit::rate_limit_middleware,
        ));
    }

    // 5) CORS
    if cfg.cors.enabled {
        router = router.layer(build_cors_layer(&cfg.cors)?);
    }

    // 4) Timeout
    router = router.layer(TimeoutLayer::with_status_code(
        StatusCode::GATEWAY_TIMEOUT,
        cfg.request_timeout,
    ));

    // 3) Trace
    router = apply_trace_layer(router);

    // 2) PropagateRequestId
    let x_request_id = request_id::header();
    router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));

    // 1) SetRequestId (registered last, runs first)
    router = router.layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid));

    Ok(router)
}

fn apply_trace_layer(router: Router) -> Router {
    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(|req: &Request<Body>| {
                let rid = req
                    .headers()
                    .get(request_id::X_REQUEST_ID)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("n/a");

                tracing::info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri().path(),
                    version = ?req.version(),
                    request_id = %rid,
                    status = Empty,
                    latency_ms = Empty,
                    "user_agent.original" = req
                        .headers()
                        .get("user-agent")
                        .and_then(|h| h.to_str().ok())
                        .unwrap_or("unknown"),
                )
            })
            .on_response(
                |res: &Response<Body>, latency: std::time::Duration, span: &tracing::Span| {
                    span.record("status", res.status().as_u16());
                    span.record("latency_ms", latency.as_millis());
                },
            ),
    )
}

/// Serve `app` on `listener` until `shutdown` resolves, then drain in-flight
/// requests.
///
/// # Errors
/// Returns an error when the server fails while accepting connections.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "HTTP server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
    .map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!("HTTP server stopped");
    Ok(())
}
