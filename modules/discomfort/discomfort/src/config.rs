use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use zesty_utils::SecretString;

/// Knobs of the card pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscomfortConfig {
    /// Batches are padded with bonus cards up to this size.
    pub min_cards: usize,
    /// Preferences per domain used as graph seeds.
    pub max_seeds_per_domain: usize,
    /// Curated entries used for a domain without graph candidates.
    pub curated_per_domain: usize,
    /// Cap on graph-derived cards per domain.
    pub graph_candidates_per_domain: usize,
    /// Cards per batch that get a generated explanation.
    pub explanation_budget: usize,
    /// Bound on each seed lookup and each explanation request.
    #[serde(with = "zesty_utils::duration_serde")]
    pub upstream_timeout: Duration,
    /// Bound on a whole batch. Explanations still pending at the deadline
    /// keep their template. Keep it below [`ProxyFeedConfig::timeout`].
    #[serde(with = "zesty_utils::duration_serde")]
    pub batch_timeout: Duration,
}

impl Default for DiscomfortConfig {
    fn default() -> Self {
        Self {
            min_cards: 10,
            max_seeds_per_domain: 2,
            curated_per_domain: 4,
            graph_candidates_per_domain: 4,
            explanation_budget: 3,
            upstream_timeout: Duration::from_secs(5),
            batch_timeout: Duration::from_secs(8),
        }
    }
}

/// Hosted Postgres behind a PostgREST endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManagedBackendConfig {
    /// Project root, e.g. `https://xyz.supabase.co`.
    pub url: String,
    /// Public key sent as `apikey`.
    pub anon_key: Option<SecretString>,
    /// Signed-in user's token, sent as a bearer token.
    pub access_token: Option<SecretString>,
    /// Owner of the rows read and written.
    pub user_id: Option<String>,
    #[serde(with = "zesty_utils::duration_serde")]
    pub timeout: Duration,
}

impl ManagedBackendConfig {
    /// Everything needed to act on behalf of a signed-in user.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        !self.url.trim().is_empty()
            && self.anon_key.as_ref().is_some_and(|k| !k.is_blank())
            && self.access_token.as_ref().is_some_and(|k| !k.is_blank())
            && self.user_id.as_deref().is_some_and(|u| !u.trim().is_empty())
    }
}

impl Default for ManagedBackendConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: None,
            access_token: None,
            user_id: None,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Device-local challenge storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocalStoreConfig {
    /// Directory holding `zesty_challenges.json`.
    pub dir: PathBuf,
}

impl Default for LocalStoreConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".zesty"),
        }
    }
}

/// Where a card session fetches its batches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProxyFeedConfig {
    pub base_url: String,
    #[serde(with = "zesty_utils::duration_serde")]
    pub timeout: Duration,
}

impl Default for ProxyFeedConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001".to_owned(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Everything a card session needs to start.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub proxy: ProxyFeedConfig,
    pub managed: ManagedBackendConfig,
    pub local: LocalStoreConfig,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn pipeline_defaults() {
        let cfg = DiscomfortConfig::default();
        assert_eq!(cfg.min_cards, 10);
        assert_eq!(cfg.max_seeds_per_domain, 2);
        assert_eq!(cfg.curated_per_domain, 4);
        assert_eq!(cfg.explanation_budget, 3);
        assert!(cfg.upstream_timeout <= cfg.batch_timeout);
        assert!(cfg.batch_timeout < ProxyFeedConfig::default().timeout);
    }

    #[test]
    fn partial_yaml_keeps_defaults_and_rejects_unknown_keys() {
        let cfg: DiscomfortConfig =
            serde_json::from_value(serde_json::json!({ "min_cards": 12, "upstream_timeout": "2s" }))
                .unwrap();
        assert_eq!(cfg.min_cards, 12);
        assert_eq!(cfg.upstream_timeout, Duration::from_secs(2));
        assert_eq!(cfg.graph_candidates_per_domain, 4);

        let err = serde_json::from_value::<DiscomfortConfig>(serde_json::json!({ "min_card": 1 }));
        assert!(err.is_err());
    }

    #[test]
    fn managed_backend_needs_every_credential() {
        let mut cfg = ManagedBackendConfig {
            url: "https://db.example.com".to_owned(),
            anon_key: Some(SecretString::new("anon")),
            access_token: Some(SecretString::new("jwt")),
            user_id: Some("u-1".to_owned()),
            ..ManagedBackendConfig::default()
        };
        assert!(cfg.is_authenticated());
        cfg.access_token = Some(SecretString::new(" "));
        assert!(!cfg.is_authenticated());
        assert!(!ManagedBackendConfig::default().is_authenticated());
    }
}
