//! Discomfort module implementation
//!
//! The public contract lives in `discomfort-sdk`. This crate provides:
//!
//! - [`DiscomfortService`]: the card pipeline (graph seeds, approximate
//!   antitheses, curated fallback, explanation budget, padding, shuffle),
//!   the onboarding report, growth reflection and cultural nemesis
//! - [`CardSession`]: the accept / skip / share state machine of one
//!   browsing session
//! - [`TieredChallengeRepository`]: managed storage with a local fallback
//! - stores and feeds in [`infra`]

#![forbid(unsafe_code)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub use discomfort_sdk::{DiscomfortApi, DiscomfortError};

pub mod config;
pub mod domain;
pub mod infra;
pub mod local_client;

pub use config::{
    DiscomfortConfig, LocalStoreConfig, ManagedBackendConfig, ProxyFeedConfig, SessionConfig,
};
pub use domain::repository::{SaveReceipt, StorageNotice, TieredChallengeRepository};
pub use domain::service::DiscomfortService;
pub use domain::session::{Accepted, CardSession, SessionState, ShareOutcome};
pub use infra::open_session;
pub use local_client::LocalClient;
