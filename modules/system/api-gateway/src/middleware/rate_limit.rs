use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderName, HeaderValue, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use dashmap::DashMap;
use zesty_errors::codes;

use crate::config::RateLimitConfig;
use crate::middleware::request_id;

/// Above this many tracked clients, expired windows are dropped before the
/// next check, at most once per quarter window.
const SWEEP_THRESHOLD: usize = 10_000;

const NEVER_SWEPT: u64 = u64::MAX;

const RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
const RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
const RATELIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

const LIMITED_DETAIL: &str = "Too many requests from this IP, please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32, reset: Duration },
    Limited { retry_after: Duration },
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Request counter per client IP over fixed wall-clock windows.
///
/// Each client's window opens with its first request and resets once
/// `window` has elapsed. A check-and-increment runs under the map shard lock
/// for that client, so concurrent requests cannot undercount.
pub struct FixedWindowLimiter {
    max_requests: u32,
    window: Duration,
    windows: DashMap<IpAddr, Window>,
    sweep_threshold: usize,
    /// Milliseconds since `origin` of the last sweep.
    last_sweep_ms: AtomicU64,
    origin: Instant,
}

impl FixedWindowLimiter {
    #[must_use]
    pub fn new(cfg: &RateLimitConfig) -> Self {
        Self {
            max_requests: cfg.max_requests,
            window: cfg.window,
            windows: DashMap::new(),
            sweep_threshold: SWEEP_THRESHOLD,
            last_sweep_ms: AtomicU64::new(NEVER_SWEPT),
            origin: Instant::now(),
        }
    }

    #[must_use]
    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    #[must_use]
    pub fn check(&self, client: IpAddr, now: Instant) -> Decision {
        if self.windows.len() >= self.sweep_threshold && self.sweep_due(now) {
            self.sweep(now);
        }

        let mut entry = self.windows.entry(client).or_insert(Window {
            started: now,
            count: 0,
        });
        let w = entry.value_mut();
        if now.saturating_duration_since(w.started) >= self.window {
            w.started = now;
            w.count = 0;
        }
        let reset = self
            .window
            .saturating_sub(now.saturating_duration_since(w.started));

        if w.count >= self.max_requests {
            return Decision::Limited { retry_after: reset };
        }
        w.count += 1;
        Decision::Allowed {
            remaining: self.max_requests - w.count,
            reset,
        }
    }

    /// Claims the next sweep; only one caller per quarter window wins.
    fn sweep_due(&self, now: Instant) -> bool {
        let at = millis(now.saturating_duration_since(self.origin));
        let last = self.last_sweep_ms.load(Ordering::Acquire);
        if last != NEVER_SWEPT && at.saturating_sub(last) < millis(self.window / 4) {
            return false;
        }
        self.last_sweep_ms
            .compare_exchange(last, at, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn sweep(&self, now: Instant) {
        let before = self.windows.len();
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.started) < self.window);
        tracing::debug!(before, after = self.windows.len(), "dropped expired rate limit windows");
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX - 1)
}

fn ceil_secs(d: Duration) -> u64 {
    d.as_secs() + u64::from(d.subsec_nanos() > 0)
}

/// Peer address recorded by the server; requests without one share a bucket.
fn client_ip(req: &Request) -> IpAddr {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED), |ConnectInfo(addr)| addr.ip())
}

pub async fn rate_limit_middleware(
    State(limiter): State<Arc<FixedWindowLimiter>>,
    req: Request,
    next: Next,
) -> Response {
    let client = client_ip(&req);
    match limiter.check(client, Instant::now()) {
        Decision::Allowed { remaining, reset } => {
            let mut resp = next.run(req).await;
            let headers = resp.headers_mut();
            headers.insert(RATELIMIT_LIMIT, limiter.max_requests().into());
            headers.insert(RATELIMIT_REMAINING, remaining.into());
            headers.insert(RATELIMIT_RESET, ceil_secs(reset).into());
            resp
        }
        Decision::Limited { retry_after } => {
            tracing::warn!(%client, path = %req.uri().path(), "rate limit exceeded");
            let problem = zesty_errors::finalize(
                codes::rate_limited(LIMITED_DETAIL),
                req.uri().path(),
                request_id::from_headers(req.headers()),
            );
            let mut resp = problem.into_response();
            let headers = resp.headers_mut();
            headers.insert(
                header::RETRY_AFTER,
                HeaderValue::from(ceil_secs(retry_after).max(1)),
            );
            headers.insert(RATELIMIT_LIMIT, limiter.max_requests().into());
            headers.insert(RATELIMIT_REMAINING, HeaderValue::from_static("0"));
            resp
        }
    }
}
