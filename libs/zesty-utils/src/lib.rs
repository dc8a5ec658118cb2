#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod duration_serde;
pub mod secret_string;

pub use secret_string::SecretString;
