//! [`CardFeed`] backed by the recommendation proxy's generation endpoint.

use anyhow::Context;
use async_trait::async_trait;
use discomfort_sdk::{CardBatch, CardFeed, DiscomfortCard, DiscomfortError, Domain, PreferenceInput};
use serde::Serialize;
use url::Url;

use crate::config::ProxyFeedConfig;

const GENERATE_CARDS_PATH: &str = "api/zesty/generate-cards";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateCardsRequest<'a> {
    user_preferences: &'a [PreferenceInput],
    domains: &'a [Domain],
}

pub struct ProxyCardFeed {
    http: reqwest::Client,
    endpoint: Url,
}

impl ProxyCardFeed {
    /// # Errors
    /// Fails if `base_url` is not an absolute URL or the HTTP client cannot be built.
    pub fn new(config: &ProxyFeedConfig) -> anyhow::Result<Self> {
        let base = Url::parse(&format!("{}/", config.base_url.trim_end_matches('/')))
            .with_context(|| format!("invalid proxy base_url: {}", config.base_url))?;
        let endpoint = base
            .join(GENERATE_CARDS_PATH)
            .context("failed to build card generation URL")?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build proxy HTTP client")?;
        Ok(Self { http, endpoint })
    }
}

#[async_trait]
impl CardFeed for ProxyCardFeed {
    async fn fetch_cards(
        &self,
        preferences: &[PreferenceInput],
        domains: &[Domain],
    ) -> Result<Vec<DiscomfortCard>, DiscomfortError> {
        let body = GenerateCardsRequest {
            user_preferences: preferences,
            domains,
        };
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                if e.is_timeout() {
                    DiscomfortError::feed_unavailable("card generation timed out")
                } else {
                    DiscomfortError::feed_unavailable(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "card generation request failed");
            return Err(DiscomfortError::feed_unavailable(format!(
                "card generation returned {status}"
            )));
        }

        let batch: CardBatch = response.json().await.map_err(|e| {
            DiscomfortError::feed_unavailable(format!("malformed card batch: {}", e.without_url()))
        })?;
        if batch.cards.is_empty() {
            return Err(DiscomfortError::EmptyFeed);
        }
        Ok(batch.cards)
    }
}
