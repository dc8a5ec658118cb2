//! HTTP surface of the recommendation proxy.
//!
//! Routes under `/api` forward to the taste graph and text generation
//! clients, or run the discomfort card pipeline. [`build_app`] wraps the
//! router in the middleware stack (request ids, tracing, timeout, CORS, rate
//! limiting, problem mapping, body limit, input sanitization) and [`serve`]
//! runs it until shutdown.

#![forbid(unsafe_code)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod config;
pub mod cors;
pub mod middleware;
pub mod server;
pub mod state;

pub use config::{ApiGatewayConfig, CorsConfig, RateLimitConfig};
pub use server::{build_app, serve};
pub use state::AppState;
