//! Discomfort SDK
//!
//! Types shared by the card pipeline, the HTTP surface and the card session:
//!
//! - [`UserPreferenceSet`]: per-domain preferences, normalised at ingestion
//! - [`DiscomfortCard`] / [`CardBatch`]: what a generation call returns
//! - [`Challenge`]: the persisted form of an accepted card
//! - [`DiscomfortApi`]: the pipeline's public contract
//! - [`ChallengeStore`], [`PreferenceStore`], [`CardFeed`], [`ShareTarget`]:
//!   the seams the card session talks to

#![forbid(unsafe_code)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![deny(rust_2018_idioms)]

pub mod api;
pub mod error;
pub mod models;
pub mod ports;
pub mod preferences;

pub use api::DiscomfortApi;
pub use error::DiscomfortError;
pub use models::{
    CardBatch, CardMetadata, CardSource, Challenge, ChallengeStats, Difficulty, DiscomfortCard,
    GrowthReflection, Nemesis, NemesisPreference, OnboardingReport,
};
pub use ports::{CardFeed, ChallengeStore, PreferenceStore, SharePayload, ShareTarget};
pub use preferences::{PreferenceInput, UserPreferenceSet};
pub use taste_graph_sdk::Domain;
pub use text_gen_sdk::ChallengeTask;
