//! Text generation SDK
//!
//! [`TextGenApi`] is the single free-form call to a generative language
//! model. It reports failures as [`TextGenError`]; the fixed
//! [`FALLBACK_TEXT`] and the templated structured fallbacks are applied by
//! callers, usually through the helpers of the `text-gen` crate.

#![forbid(unsafe_code)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![deny(rust_2018_idioms)]

pub mod api;
pub mod error;
pub mod models;

pub use api::TextGenApi;
pub use error::TextGenError;
pub use models::{ChallengeTask, DifficultyLabel, FALLBACK_TEXT};
pub use zesty_errors::FailureKind;
