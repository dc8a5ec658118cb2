//! Text generation client
//!
//! - [`GeminiClient`]: [`text_gen_sdk::TextGenApi`] over the Gemini
//!   `generateContent` endpoint.
//! - [`TextGenService`]: prompt helpers that never fail. Free-text helpers
//!   fall back to [`text_gen_sdk::FALLBACK_TEXT`]; structured helpers parse a
//!   JSON object out of the reply and fall back to a templated value of the
//!   same type.

#![forbid(unsafe_code)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod infra;

pub use config::TextGenConfig;
pub use domain::service::TextGenService;
pub use domain::structured::extract_json;
pub use infra::gemini::GeminiClient;
