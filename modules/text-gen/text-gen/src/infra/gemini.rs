//! Gemini `generateContent` client.

use std::time::Instant;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use text_gen_sdk::{TextGenApi, TextGenError};
use tracing::instrument;
use url::Url;
use zesty_utils::SecretString;

use crate::config::TextGenConfig;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Text parts of the first candidate, concatenated.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_url: Url,
    api_key: Option<SecretString>,
}

impl GeminiClient {
    /// # Errors
    /// Fails if `api_url` is not an absolute URL or the HTTP client cannot be built.
    pub fn new(config: &TextGenConfig) -> anyhow::Result<Self> {
        let api_url = Url::parse(&config.api_url)
            .with_context(|| format!("invalid text generation api_url: {}", config.api_url))?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .build()
            .context("failed to build text generation HTTP client")?;

        let api_key = config.credential().cloned();
        if api_key.is_none() {
            tracing::warn!("text generation API key not configured; generated text will fall back");
        }
        Ok(Self {
            http,
            api_url,
            api_key,
        })
    }
}

#[async_trait]
impl TextGenApi for GeminiClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    #[instrument(skip_all, fields(prompt_len = prompt.len()))]
    async fn generate_content(&self, prompt: &str) -> Result<String, TextGenError> {
        let key = self.api_key.as_ref().ok_or(TextGenError::NotConfigured)?;
        if prompt.trim().is_empty() {
            return Err(TextGenError::EmptyPrompt);
        }
        let start = Instant::now();

        let request = GenerateRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
        };
        let response = self
            .http
            .post(self.api_url.clone())
            .query(&[("key", key.expose())])
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                let err = if e.is_timeout() {
                    TextGenError::Timeout
                } else {
                    // Strip the URL: it carries the key.
                    TextGenError::transport(e.without_url().to_string())
                };
                tracing::warn!(kind = %err.kind(), "text generation request failed");
                err
            })?;

        let status = response.status();
        #[allow(clippy::cast_possible_truncation)]
        let duration_ms = start.elapsed().as_millis() as u64;
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), duration_ms, "text generation returned an error status");
            return Err(TextGenError::Upstream {
                status: status.as_u16(),
            });
        }

        let body: GenerateResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                TextGenError::Timeout
            } else {
                TextGenError::malformed(e.without_url().to_string())
            }
        })?;
        let text = body
            .into_text()
            .ok_or_else(|| TextGenError::malformed("no candidate text in response"))?;

        tracing::info!(status = status.as_u16(), duration_ms, text_len = text.len(), "text generation completed");
        Ok(text)
    }
}
