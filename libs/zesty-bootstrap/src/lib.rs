//! Process bootstrap shared by Zesty binaries: layered configuration,
//! logging initialization and shutdown signals.

#![forbid(unsafe_code)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod logging;
pub mod signals;

pub use config::{LegacyKind, LegacyVar, load_layered, to_yaml};
pub use logging::{LogFormat, LoggingConfig, init_logging};
pub use signals::{ShutdownSignal, shutdown_signal, wait_for_shutdown};
