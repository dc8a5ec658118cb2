//! Challenge and preference storage in the managed backend (PostgREST).

use std::time::Instant;

use anyhow::{Context, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use discomfort_sdk::{
    Challenge, ChallengeStore, Difficulty, Domain, PreferenceStore, UserPreferenceSet,
};
use serde::{Deserialize, Serialize};
use url::Url;
use zesty_utils::SecretString;

use crate::config::ManagedBackendConfig;

const CHALLENGES_TABLE: &str = "rest/v1/recommendations";
const PREFERENCES_TABLE: &str = "rest/v1/taste_preferences";

/// One row of the challenges table.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChallengeRow {
    id: String,
    user_id: String,
    #[serde(default)]
    qloo_entity_id: Option<String>,
    title: String,
    domain: Domain,
    difficulty_level: i64,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    gemini_explanation: Option<String>,
    is_completed: bool,
    created_at: DateTime<Utc>,
    #[serde(default)]
    completed_at: Option<DateTime<Utc>>,
}

impl ChallengeRow {
    fn from_challenge(c: &Challenge, user_id: &str) -> Self {
        Self {
            id: c.id.clone(),
            user_id: user_id.to_owned(),
            qloo_entity_id: c.entity_id.clone(),
            title: c.title.clone(),
            domain: c.domain,
            difficulty_level: i64::from(c.difficulty.get()),
            description: Some(c.description.clone()),
            image_url: c.image_url.clone(),
            gemini_explanation: c.explanation.clone(),
            is_completed: c.is_completed,
            created_at: c.created_at,
            completed_at: c.completed_at,
        }
    }

    fn into_challenge(self) -> Challenge {
        Challenge {
            id: self.id,
            title: self.title,
            description: self.description.unwrap_or_default(),
            domain: self.domain,
            difficulty: Difficulty::saturating(self.difficulty_level),
            cultural_context: String::new(),
            entity_id: self.qloo_entity_id,
            image_url: self.image_url,
            explanation: self.gemini_explanation,
            is_completed: self.is_completed,
            created_at: self.created_at,
            completed_at: self.completed_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionPatch {
    is_completed: bool,
    completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct PreferenceRow {
    domain: String,
    #[serde(default)]
    preferences: Vec<String>,
}

struct Credentials {
    anon_key: SecretString,
    access_token: SecretString,
    user_id: String,
}

pub struct ManagedStore {
    http: reqwest::Client,
    base_url: Url,
    credentials: Option<Credentials>,
}

impl ManagedStore {
    /// # Errors
    /// Fails if a configured `url` is not absolute or the HTTP client cannot be built.
    pub fn new(config: &ManagedBackendConfig) -> anyhow::Result<Self> {
        let raw_url = if config.url.trim().is_empty() {
            "http://localhost"
        } else {
            config.url.trim_end_matches('/')
        };
        let base_url = Url::parse(raw_url)
            .with_context(|| format!("invalid managed backend url: {}", config.url))?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .build()
            .context("failed to build managed backend HTTP client")?;

        let credentials = match (&config.anon_key, &config.access_token, &config.user_id) {
            (Some(anon_key), Some(access_token), Some(user_id)) if config.is_authenticated() => {
                Some(Credentials {
                    anon_key: anon_key.clone(),
                    access_token: access_token.clone(),
                    user_id: user_id.trim().to_owned(),
                })
            }
            _ => None,
        };

        Ok(Self {
            http,
            base_url,
            credentials,
        })
    }

    fn credentials(&self) -> anyhow::Result<&Credentials> {
        self.credentials
            .as_ref()
            .context("managed backend is not signed in")
    }

    fn table(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.as_str().trim_end_matches('/'))
    }

    fn request(
        &self,
        method: reqwest::Method,
        path: &str,
    ) -> anyhow::Result<(reqwest::RequestBuilder, &str)> {
        let creds = self.credentials()?;
        let builder = self
            .http
            .request(method, self.table(path))
            .header("apikey", creds.anon_key.expose())
            .bearer_auth(creds.access_token.expose());
        Ok((builder, creds.user_id.as_str()))
    }

    async fn send(op: &'static str, builder: reqwest::RequestBuilder) -> anyhow::Result<reqwest::Response> {
        let start = Instant::now();
        let response = builder
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("managed backend {op} failed"))?;
        // Duration in ms is always small enough for u64 in practice
        #[allow(clippy::cast_possible_truncation)]
        let duration_ms = start.elapsed().as_millis() as u64;
        let status = response.status();
        tracing::info!(op, status = status.as_u16(), duration_ms, "managed backend request completed");
        if !status.is_success() {
            bail!("managed backend {op} returned {status}");
        }
        Ok(response)
    }

    async fn fetch_rows(&self, query: &[(&str, String)]) -> anyhow::Result<Vec<ChallengeRow>> {
        let (builder, _) = self.request(reqwest::Method::GET, CHALLENGES_TABLE)?;
        let response = Self::send("list", builder.query(query)).await?;
        response
            .json::<Vec<ChallengeRow>>()
            .await
            .context("managed backend returned malformed challenge rows")
    }
}

#[async_trait]
impl ChallengeStore for ManagedStore {
    fn name(&self) -> &'static str {
        "managed"
    }

    async fn is_available(&self) -> bool {
        let Ok((builder, user_id)) = self.request(reqwest::Method::GET, CHALLENGES_TABLE) else {
            return false;
        };
        let probe = builder.query(&[
            ("select", "id".to_owned()),
            ("user_id", format!("eq.{user_id}")),
            ("limit", "1".to_owned()),
        ]);
        match Self::send("probe", probe).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "managed backend unreachable");
                false
            }
        }
    }

    async fn list(&self) -> anyhow::Result<Vec<Challenge>> {
        let user_id = self.credentials()?.user_id.clone();
        let rows = self
            .fetch_rows(&[
                ("select", "*".to_owned()),
                ("user_id", format!("eq.{user_id}")),
                ("order", "created_at.asc".to_owned()),
            ])
            .await?;
        Ok(rows.into_iter().map(ChallengeRow::into_challenge).collect())
    }

    async fn insert(&self, challenge: &Challenge) -> anyhow::Result<()> {
        let (builder, user_id) = self.request(reqwest::Method::POST, CHALLENGES_TABLE)?;
        let row = ChallengeRow::from_challenge(challenge, user_id);
        Self::send(
            "insert",
            builder.header("Prefer", "return=minimal").json(&row),
        )
        .await?;
        Ok(())
    }

    async fn set_completed(
        &self,
        id: &str,
        completed_at: Option<DateTime<Utc>>,
    ) -> anyhow::Result<Option<Challenge>> {
        let (builder, user_id) = self.request(reqwest::Method::PATCH, CHALLENGES_TABLE)?;
        let patch = CompletionPatch {
            is_completed: completed_at.is_some(),
            completed_at,
        };
        let response = Self::send(
            "update",
            builder
                .query(&[("id", format!("eq.{id}")), ("user_id", format!("eq.{user_id}"))])
                .header("Prefer", "return=representation")
                .json(&patch),
        )
        .await?;
        let rows: Vec<ChallengeRow> = response
            .json()
            .await
            .context("managed backend returned malformed challenge rows")?;
        Ok(rows.into_iter().next().map(ChallengeRow::into_challenge))
    }

    async fn remove(&self, id: &str) -> anyhow::Result<bool> {
        let (builder, user_id) = self.request(reqwest::Method::DELETE, CHALLENGES_TABLE)?;
        let response = Self::send(
            "delete",
            builder
                .query(&[("id", format!("eq.{id}")), ("user_id", format!("eq.{user_id}"))])
                .header("Prefer", "return=representation"),
        )
        .await?;
        let rows: Vec<serde_json::Value> = response
            .json()
            .await
            .context("managed backend returned malformed delete response")?;
        Ok(!rows.is_empty())
    }
}

#[async_trait]
impl PreferenceStore for ManagedStore {
    async fn read_preferences(&self, user_id: &str) -> anyhow::Result<UserPreferenceSet> {
        let (builder, _) = self.request(reqwest::Method::GET, PREFERENCES_TABLE)?;
        let response = Self::send(
            "read_preferences",
            builder.query(&[
                ("select", "domain,preferences".to_owned()),
                ("user_id", format!("eq.{user_id}")),
            ]),
        )
        .await?;
        let rows: Vec<PreferenceRow> = response
            .json()
            .await
            .context("managed backend returned malformed preference rows")?;
        let (set, unknown) =
            UserPreferenceSet::from_legacy_map(rows.into_iter().map(|r| (r.domain, r.preferences)));
        if !unknown.is_empty() {
            tracing::debug!(?unknown, "ignored preference rows with unknown domains");
        }
        Ok(set)
    }
}
