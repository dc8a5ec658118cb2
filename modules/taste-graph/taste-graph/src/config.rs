//! Taste graph client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use zesty_utils::SecretString;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TasteGraphConfig {
    /// Graph API root, without a trailing path.
    pub base_url: String,
    /// Sent as `X-Api-Key`. Absent means every call reports `NotConfigured`.
    pub api_key: Option<SecretString>,
    /// Bound on each graph request, connect included.
    #[serde(with = "zesty_utils::duration_serde")]
    pub timeout: Duration,
    /// Size of the related set fetched when approximating antitheses.
    pub antithesis_fetch_limit: u32,
    /// How many entities from the tail of that set are kept.
    pub antithesis_tail: usize,
}

impl TasteGraphConfig {
    /// Credential, unless missing or blank.
    #[must_use]
    pub fn credential(&self) -> Option<&SecretString> {
        self.api_key.as_ref().filter(|k| !k.is_blank())
    }
}

impl Default for TasteGraphConfig {
    fn default() -> Self {
        Self {
            base_url: "https://hackathon.api.qloo.com".to_owned(),
            api_key: None,
            timeout: Duration::from_secs(10),
            antithesis_fetch_limit: 10,
            antithesis_tail: 5,
        }
    }
}
