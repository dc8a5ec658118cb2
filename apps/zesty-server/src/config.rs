use std::path::Path;

use anyhow::Result;
use api_gateway::ApiGatewayConfig;
use discomfort::DiscomfortConfig;
use serde::{Deserialize, Serialize};
use taste_graph::TasteGraphConfig;
use text_gen::TextGenConfig;
use zesty_bootstrap::{LegacyKind, LegacyVar, LoggingConfig};

/// Flat variables understood by earlier deployments of the service.
pub const LEGACY_ENV: &[LegacyVar] = &[
    LegacyVar::new("PORT", "server.port", LegacyKind::Number),
    LegacyVar::new("VITE_CORS_ORIGIN", "server.cors.allowed_origins", LegacyKind::List),
    LegacyVar::new("QLOO_BASE_URL", "taste_graph.base_url", LegacyKind::Text),
    LegacyVar::new("VITE_QLOO_API_KEY", "taste_graph.api_key", LegacyKind::Text),
    LegacyVar::new("VITE_GEMINI_API_URL", "text_gen.api_url", LegacyKind::Text),
    LegacyVar::new("VITE_GEMINI_API_KEY", "text_gen.api_key", LegacyKind::Text),
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ApiGatewayConfig,
    pub taste_graph: TasteGraphConfig,
    pub text_gen: TextGenConfig,
    pub discomfort: DiscomfortConfig,
    pub logging: LoggingConfig,
}

/// Values given on the command line; they beat every other layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
}

impl AppConfig {
    /// Defaults, then `file`, then `APP__*`, then the legacy variables.
    ///
    /// # Errors
    /// Fails when a source is missing or invalid.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        zesty_bootstrap::load_layered(file, LEGACY_ENV)
    }

    pub fn apply_cli_overrides(&mut self, cli: CliOverrides) {
        if let Some(port) = cli.port {
            self.server.port = port;
        }
    }

    /// # Errors
    /// Fails when the configuration cannot be serialized.
    pub fn to_yaml(&self) -> Result<String> {
        zesty_bootstrap::to_yaml(self)
    }
}
