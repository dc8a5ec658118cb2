//! Taste graph client
//!
//! [`HttpTasteGraph`] implements [`taste_graph_sdk::TasteGraphApi`] over the
//! graph's REST interface, authenticating with an `X-Api-Key` header.

#![forbid(unsafe_code)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod infra;

pub use config::TasteGraphConfig;
pub use infra::client::HttpTasteGraph;
