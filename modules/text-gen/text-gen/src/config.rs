//! Text generation client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use zesty_utils::SecretString;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextGenConfig {
    /// Full `generateContent` URL of the model.
    pub api_url: String,
    /// Sent as the `key` query parameter.
    pub api_key: Option<SecretString>,
    #[serde(with = "zesty_utils::duration_serde")]
    pub timeout: Duration,
}

impl TextGenConfig {
    #[must_use]
    pub fn credential(&self) -> Option<&SecretString> {
        self.api_key.as_ref().filter(|k| !k.is_blank())
    }
}

impl Default for TextGenConfig {
    fn default() -> Self {
        Self {
            api_url: "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro-latest:generateContent".to_owned(),
            api_key: None,
            timeout: Duration::from_secs(20),
        }
    }
}
