//! [`TasteGraphApi`] over HTTP.

use std::time::Instant;

use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;
use taste_graph_sdk::{Domain, InsightsQuery, TasteEntity, TasteGraphApi, TasteGraphError};
use tracing::instrument;
use url::Url;
use zesty_utils::SecretString;

use crate::config::TasteGraphConfig;
use crate::infra::wire;

const API_KEY_HEADER: &str = "X-Api-Key";

pub struct HttpTasteGraph {
    http: reqwest::Client,
    base_url: Url,
    api_key: Option<SecretString>,
    antithesis_fetch_limit: u32,
    antithesis_tail: usize,
}

impl HttpTasteGraph {
    /// # Errors
    /// Fails if `base_url` is not an absolute URL or the HTTP client cannot be built.
    pub fn new(config: &TasteGraphConfig) -> anyhow::Result<Self> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .with_context(|| format!("invalid taste graph base_url: {}", config.base_url))?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .pool_max_idle_per_host(8)
            .build()
            .context("failed to build taste graph HTTP client")?;

        let api_key = config.credential().cloned();
        if api_key.is_none() {
            tracing::warn!("taste graph API key not configured; graph lookups will fall back");
        }

        Ok(Self {
            http,
            base_url,
            api_key,
            antithesis_fetch_limit: config.antithesis_fetch_limit.max(1),
            antithesis_tail: config.antithesis_tail.max(1),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.as_str().trim_end_matches('/'))
    }

    fn extract_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
        headers
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok())
    }

    fn map_send_error(e: &reqwest::Error) -> TasteGraphError {
        if e.is_timeout() {
            TasteGraphError::Timeout
        } else if e.is_connect() {
            TasteGraphError::transport(format!("connection error: {e}"))
        } else {
            TasteGraphError::transport(format!("request error: {e}"))
        }
    }

    /// Authenticate, send, check the status and decode the JSON body.
    async fn execute(
        &self,
        op: &'static str,
        builder: reqwest::RequestBuilder,
    ) -> Result<Value, TasteGraphError> {
        let key = self.api_key.as_ref().ok_or(TasteGraphError::NotConfigured)?;
        let start = Instant::now();

        let response = builder
            .header(API_KEY_HEADER, key.expose())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| {
                let err = Self::map_send_error(&e);
                tracing::warn!(op, kind = %err.kind(), error = %e, "taste graph request failed");
                err
            })?;

        let status = response.status();
        #[allow(clippy::cast_possible_truncation)]
        let duration_ms = start.elapsed().as_millis() as u64;

        if !status.is_success() {
            let retry_after_sec = Self::extract_retry_after(response.headers());
            tracing::warn!(op, status = status.as_u16(), duration_ms, "taste graph returned an error status");
            return Err(TasteGraphError::upstream(status.as_u16(), retry_after_sec));
        }

        let body = response.json::<Value>().await.map_err(|e| {
            tracing::warn!(op, error = %e, "taste graph body is not JSON");
            if e.is_timeout() {
                TasteGraphError::Timeout
            } else {
                TasteGraphError::malformed(e.to_string())
            }
        })?;

        tracing::info!(op, status = status.as_u16(), duration_ms, "taste graph request completed");
        Ok(body)
    }

    fn decode(body: &Value, fallback_type: &str) -> Result<Vec<TasteEntity>, TasteGraphError> {
        wire::decode_entities(body, fallback_type)
            .ok_or_else(|| TasteGraphError::malformed("response has no entity list"))
    }
}

#[async_trait]
impl TasteGraphApi for HttpTasteGraph {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    #[instrument(skip(self, query))]
    async fn search(&self, query: &str, types: &str) -> Result<Vec<TasteEntity>, TasteGraphError> {
        if query.trim().is_empty() {
            return Err(TasteGraphError::invalid_query("search query is empty"));
        }
        let builder = self
            .http
            .get(self.endpoint("search"))
            .query(&[("query", query), ("types", types)]);
        let body = self.execute("search", builder).await?;
        let fallback_type = format!("urn:entity:{}", types.split(',').next().unwrap_or(types));
        Self::decode(&body, &fallback_type)
    }

    #[instrument(skip(self, query))]
    async fn search_entity(
        &self,
        query: &str,
        domain: Domain,
    ) -> Result<Option<TasteEntity>, TasteGraphError> {
        let mut results = self.search(query, domain.search_types()).await?;
        if results.is_empty() {
            tracing::debug!("no graph entity matches the query");
            return Ok(None);
        }
        let mut best = results.swap_remove(0);
        if best.domain().is_none() {
            domain.entity_urn().clone_into(&mut best.entity_type);
        }
        Ok(Some(best))
    }

    #[instrument(skip_all)]
    async fn insights(&self, query: &InsightsQuery) -> Result<Vec<TasteEntity>, TasteGraphError> {
        let builder = self.http.post(self.endpoint("v2/insights")).json(query);
        let body = self.execute("insights", builder).await?;
        let fallback_type = query
            .filter
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("urn:entity");
        Self::decode(&body, fallback_type)
    }

    async fn get_recommendations(
        &self,
        entity_id: &str,
        domain: Domain,
    ) -> Result<Vec<TasteEntity>, TasteGraphError> {
        self.insights(&InsightsQuery::related_to(entity_id, domain, None))
            .await
    }

    #[instrument(skip(self))]
    async fn approximate_antitheses(
        &self,
        entity_id: &str,
        domain: Domain,
    ) -> Result<Vec<TasteEntity>, TasteGraphError> {
        let query =
            InsightsQuery::related_to(entity_id, domain, Some(self.antithesis_fetch_limit));
        let mut related = self.insights(&query).await?;
        let tail_start = related.len().saturating_sub(self.antithesis_tail);
        let tail = related.split_off(tail_start);
        tracing::debug!(fetched = tail_start + tail.len(), kept = tail.len(), "approximated antitheses");
        Ok(tail)
    }

    async fn affinity_cluster(&self, entities: &str) -> Result<Value, TasteGraphError> {
        let builder = self
            .http
            .get(self.endpoint("affinity-cluster"))
            .query(&[("entities", entities)]);
        self.execute("affinity_cluster", builder).await
    }

    async fn cross_domain_affinity(
        &self,
        source_entities: &str,
        target_type: &str,
    ) -> Result<Value, TasteGraphError> {
        let builder = self
            .http
            .get(self.endpoint("cross-domain-affinity"))
            .query(&[("source_entities", source_entities), ("target_type", target_type)]);
        self.execute("cross_domain_affinity", builder).await
    }
}
