//! Request and response bodies of the REST surface.
//!
//! Request fields are optional so that missing input is reported by the
//! handlers as a validation problem naming the field, rather than as a bare
//! deserialization error.

use discomfort_sdk::{Nemesis, PreferenceInput, UserPreferenceSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use taste_graph_sdk::TasteEntity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ServiceStatus {
    Available,
    NotConfigured,
}

impl ServiceStatus {
    #[must_use]
    pub fn from_configured(configured: bool) -> Self {
        if configured {
            Self::Available
        } else {
            Self::NotConfigured
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ServicesDto {
    pub taste_graph: ServiceStatus,
    pub text_gen: ServiceStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthDto {
    pub status: &'static str,
    /// RFC 3339.
    pub timestamp: String,
    pub services: ServicesDto,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
    #[serde(rename = "type", alias = "types")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResultsDto {
    pub results: Vec<TasteEntity>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InsightsReq {
    pub signal: Option<Value>,
    pub filter: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RelatedDto {
    pub related: Vec<TasteEntity>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AntithesesReq {
    pub entity_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AntithesesDto {
    pub antitheses: Vec<TasteEntity>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AffinityClusterParams {
    pub entities: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrossDomainParams {
    pub source_entities: Option<String>,
    pub target_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateReq {
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateDto {
    pub text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCardsReq {
    pub user_preferences: Option<Vec<PreferenceInput>>,
    pub domains: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingReq {
    pub preferences: Option<Value>,
    pub user_name: Option<String>,
}

impl OnboardingReq {
    /// Preferences in either accepted shape: a profile map
    /// (`{"movies": ["Heat"]}`) or a list of `{name, type}` pairs. Anything
    /// else reads as no preferences.
    #[must_use]
    pub fn preference_set(&self) -> UserPreferenceSet {
        let Some(raw) = &self.preferences else {
            return UserPreferenceSet::new();
        };
        if raw.is_array() {
            return serde_json::from_value::<Vec<PreferenceInput>>(raw.clone())
                .map(|inputs| UserPreferenceSet::from_inputs(&inputs).0)
                .unwrap_or_default();
        }
        serde_json::from_value(raw.clone()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthReflectionReq {
    pub completed_challenges: Option<Value>,
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindNemesisReq {
    pub user_preferences: Option<Vec<PreferenceInput>>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NemesisDto {
    pub nemesis: Nemesis,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChallengeTaskReq {
    pub domain: Option<String>,
    pub difficulty: Option<i64>,
}
