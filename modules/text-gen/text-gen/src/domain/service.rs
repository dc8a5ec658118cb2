//! Helpers that always return something usable.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use text_gen_sdk::{ChallengeTask, FALLBACK_TEXT, TextGenApi, TextGenError};

use crate::domain::{prompts, structured};

/// Generic plan used when the model cannot produce a curriculum.
pub const FALLBACK_CURRICULUM: &str = "1. Sample: spend one evening with a short, accessible example.\n\
2. Context: read a little about where it comes from and who made it.\n\
3. Immerse: try a full-length work without distractions.\n\
4. Compare: note what differs from what you usually enjoy.\n\
5. Share: talk about it with someone or write down your reaction.";

pub const FALLBACK_INSIGHT: &str = "Every challenge you complete widens your cultural horizons. Keep exploring: your taste is growing with each new experience.";

#[derive(Clone)]
pub struct TextGenService {
    api: Arc<dyn TextGenApi>,
}

impl TextGenService {
    #[must_use]
    pub fn new(api: Arc<dyn TextGenApi>) -> Self {
        Self { api }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.api.is_configured()
    }

    /// Raw call; failures are returned for the caller to handle.
    ///
    /// # Errors
    /// Whatever the underlying [`TextGenApi`] reports.
    pub async fn generate(&self, prompt: &str) -> Result<String, TextGenError> {
        self.api.generate_content(prompt).await
    }

    /// Generated text, or [`FALLBACK_TEXT`] on any failure.
    pub async fn generate_or_fallback(&self, prompt: &str) -> String {
        self.text_or(prompt, FALLBACK_TEXT).await
    }

    /// Ask for a JSON object and decode it; `fallback` on any failure.
    pub async fn structured_or<T, F>(&self, prompt: &str, fallback: F) -> T
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        match self.structured(prompt).await {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(kind = %e.kind(), error = %e, "structured generation fell back");
                fallback()
            }
        }
    }

    /// Ask for a JSON object and decode it.
    ///
    /// # Errors
    /// Generation failures, or [`TextGenError::Malformed`] when the reply
    /// holds no object of type `T`.
    pub async fn structured<T: DeserializeOwned>(&self, prompt: &str) -> Result<T, TextGenError> {
        let text = self.api.generate_content(prompt).await?;
        structured::extract_json(&text).inspect_err(|e| {
            tracing::warn!(error = %e, "generated text is not the requested JSON");
        })
    }

    pub async fn explain_discomfort(
        &self,
        user_likes: &[String],
        recommendation: &str,
        domain: &str,
    ) -> String {
        self.generate_or_fallback(&prompts::explain_discomfort(user_likes, recommendation, domain))
            .await
    }

    /// Like [`Self::explain_discomfort`], for callers that keep their own
    /// text when generation fails.
    ///
    /// # Errors
    /// Whatever the underlying [`TextGenApi`] reports.
    pub async fn try_explain_discomfort(
        &self,
        user_likes: &[String],
        recommendation: &str,
        domain: &str,
    ) -> Result<String, TextGenError> {
        self.generate(&prompts::explain_discomfort(user_likes, recommendation, domain))
            .await
    }

    /// Structured challenge task, or [`ChallengeTask::fallback`] when the
    /// reply is unusable or incomplete.
    pub async fn challenge_task(&self, domain: &str, difficulty: u8) -> ChallengeTask {
        let prompt = prompts::challenge_task(domain, difficulty.clamp(1, 5));
        let task: ChallengeTask = self
            .structured_or(&prompt, || ChallengeTask::fallback(domain))
            .await;
        if task.is_complete() {
            task
        } else {
            tracing::debug!("generated challenge task has empty fields; using fallback");
            ChallengeTask::fallback(domain)
        }
    }

    /// Five-step plan from `current` towards `target`, or
    /// [`FALLBACK_CURRICULUM`] on any failure.
    pub async fn curriculum_plan(
        &self,
        current: &[String],
        target: &[String],
        domain: &str,
    ) -> String {
        self.text_or(&prompts::curriculum_plan(current, target, domain), FALLBACK_CURRICULUM)
            .await
    }

    pub async fn progress_insight(
        &self,
        previous_score: u32,
        current_score: u32,
        completed: &[String],
    ) -> String {
        self.text_or(
            &prompts::progress_insight(previous_score, current_score, completed),
            FALLBACK_INSIGHT,
        )
        .await
    }

    async fn text_or(&self, prompt: &str, fallback: &str) -> String {
        match self.api.generate_content(prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(kind = %e.kind(), error = %e, "text generation fell back");
                fallback.to_owned()
            }
        }
    }
}
