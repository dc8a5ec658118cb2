//! Layered configuration.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults (the `Default` impl of the config type)
//! 2. an optional YAML file
//! 3. `APP__`-prefixed environment variables, `__` separating nested keys
//!    (`APP__SERVER__PORT=4000` sets `server.port`)
//! 4. legacy flat environment variables, mapped through a [`LegacyVar`] table
//!
//! CLI overrides are applied by the binary on the extracted value.

use std::path::Path;

use anyhow::{Context, Result, bail};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

pub const ENV_PREFIX: &str = "APP__";
const ENV_SEPARATOR: &str = "__";

/// How the text of a legacy variable becomes a config value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyKind {
    Text,
    /// Unsigned integer, e.g. a port.
    Number,
    /// Comma-separated list.
    List,
}

/// Flat environment variable from older deployments and the dotted config
/// key it sets.
#[derive(Debug, Clone, Copy)]
pub struct LegacyVar {
    pub env: &'static str,
    pub key: &'static str,
    pub kind: LegacyKind,
}

impl LegacyVar {
    #[must_use]
    pub const fn new(env: &'static str, key: &'static str, kind: LegacyKind) -> Self {
        Self { env, key, kind }
    }
}

/// Load `T` from every layer.
///
/// # Errors
/// Fails when `file` is given but missing, when a layer does not parse, or
/// when the merged result does not fit `T` (unknown keys included, for types
/// that deny them).
pub fn load_layered<T>(file: Option<&Path>, legacy: &[LegacyVar]) -> Result<T>
where
    T: Default + Serialize + DeserializeOwned,
{
    let mut figment = Figment::new().merge(Serialized::defaults(T::default()));

    if let Some(path) = file {
        if !path.is_file() {
            bail!("config file does not exist: {}", path.display());
        }
        figment = figment.merge(Yaml::file_exact(path));
    }

    figment = figment
        .merge(Env::prefixed(ENV_PREFIX).split(ENV_SEPARATOR))
        .merge(Serialized::defaults(legacy_overrides(legacy)?));

    figment.extract().map_err(|e| {
        let source = file.map_or_else(
            || "defaults and environment".to_owned(),
            |p| p.display().to_string(),
        );
        anyhow::anyhow!("invalid configuration ({source}): {e}")
    })
}

/// Nested object holding every legacy variable that is set and non-blank.
///
/// # Errors
/// Fails when a numeric variable does not parse.
pub fn legacy_overrides(vars: &[LegacyVar]) -> Result<Value> {
    let mut root = Map::new();
    for var in vars {
        let Ok(raw) = std::env::var(var.env) else {
            continue;
        };
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let value = match var.kind {
            LegacyKind::Text => Value::from(raw),
            LegacyKind::Number => raw
                .parse::<u64>()
                .map(Value::from)
                .with_context(|| format!("{} must be a non-negative integer, got {raw:?}", var.env))?,
            LegacyKind::List => Value::from(
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>(),
            ),
        };
        tracing::debug!(env = var.env, key = var.key, "applying legacy environment variable");
        insert_dotted(&mut root, var.key, value);
    }
    Ok(Value::Object(root))
}

fn insert_dotted(map: &mut Map<String, Value>, key: &str, value: Value) {
    let Some((head, rest)) = key.split_once('.') else {
        map.insert(key.to_owned(), value);
        return;
    };
    let child = map
        .entry(head.to_owned())
        .or_insert_with(|| Value::Object(Map::new()));
    if !child.is_object() {
        *child = Value::Object(Map::new());
    }
    if let Value::Object(child) = child {
        insert_dotted(child, rest, value);
    }
}

/// Effective configuration as YAML. Secrets render redacted.
///
/// # Errors
/// Fails when the value cannot be serialized.
pub fn to_yaml<T: Serialize>(config: &T) -> Result<String> {
    serde_saphyr::to_string(config).context("failed to render configuration as YAML")
}
