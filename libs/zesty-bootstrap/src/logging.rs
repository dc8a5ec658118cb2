use std::str::FromStr;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `info,discomfort=debug`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Text,
        }
    }
}

/// Level requested by `-v` flags: one for info, two for debug, three or more
/// for trace.
#[must_use]
pub fn verbosity_level(verbose: u8) -> Option<LevelFilter> {
    match verbose {
        0 => None,
        1 => Some(LevelFilter::INFO),
        2 => Some(LevelFilter::DEBUG),
        _ => Some(LevelFilter::TRACE),
    }
}

/// Filter directive in effect.
///
/// `RUST_LOG` wins outright. Otherwise `-v` flags replace the configured
/// level when they ask for more output; a configured directive that is not a
/// plain level is replaced by any `-v`.
#[must_use]
pub fn effective_directive(cfg: &LoggingConfig, verbose: u8, rust_log: Option<&str>) -> String {
    if let Some(env) = rust_log.map(str::trim).filter(|s| !s.is_empty()) {
        return env.to_owned();
    }
    let Some(requested) = verbosity_level(verbose) else {
        return cfg.level.clone();
    };
    match LevelFilter::from_str(cfg.level.trim()) {
        Ok(configured) if configured >= requested => cfg.level.clone(),
        _ => requested.to_string().to_lowercase(),
    }
}

/// Install the global subscriber, writing to stderr. Call once, before
/// anything logs.
///
/// # Errors
/// Fails when the directive does not parse or a subscriber is already set.
pub fn init_logging(cfg: &LoggingConfig, verbose: u8) -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = effective_directive(cfg, verbose, rust_log.as_deref());
    let filter = EnvFilter::try_new(&directive)
        .map_err(|e| anyhow!("invalid log filter {directive:?}: {e}"))?;

    let fmt_layer = match cfg.format {
        LogFormat::Text => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .with_writer(std::io::stderr)
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to install logging: {e}"))?;

    tracing::debug!(%directive, format = ?cfg.format, "logging initialized");
    Ok(())
}
