//! `Duration` fields written as humantime strings (`"10s"`, `"15m"`).
//!
//! ```
//! use serde::Deserialize;
//! use std::time::Duration;
//!
//! #[derive(Deserialize)]
//! struct Upstream {
//!     #[serde(with = "zesty_utils::duration_serde")]
//!     timeout: Duration,
//! }
//! ```

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer, de};

/// # Errors
/// Fails when the value is not a string humantime can parse.
pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
    let raw = String::deserialize(d)?;
    humantime::parse_duration(&raw)
        .map_err(|_| de::Error::invalid_value(de::Unexpected::Str(&raw), &"a duration like 10s"))
}

/// # Errors
/// Propagates serializer failures.
pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&humantime::format_duration(*d).to_string())
}
