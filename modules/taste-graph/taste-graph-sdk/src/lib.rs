//! Taste graph SDK
//!
//! Public contract of the client that talks to the cultural recommendation
//! graph: the [`TasteGraphApi`] trait, the five content [`Domain`]s, the
//! [`TasteEntity`] returned by lookups and the [`TasteGraphError`] every call
//! may fail with.
//!
//! ```ignore
//! use taste_graph_sdk::{Domain, TasteGraphApi};
//!
//! let seed = graph.search_entity("Miles Davis", Domain::Music).await?;
//! if let Some(seed) = seed {
//!     let far = graph.approximate_antitheses(&seed.id, Domain::Music).await?;
//! }
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![deny(rust_2018_idioms)]

pub mod api;
pub mod domain;
pub mod error;
pub mod models;

pub use api::TasteGraphApi;
pub use domain::Domain;
pub use error::TasteGraphError;
pub use models::{InsightsQuery, TasteEntity};
pub use zesty_errors::FailureKind;
