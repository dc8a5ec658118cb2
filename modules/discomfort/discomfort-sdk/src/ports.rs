//! Seams between the card session and the outside world.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::DiscomfortError;
use crate::models::{Challenge, DiscomfortCard};
use crate::preferences::{PreferenceInput, UserPreferenceSet};
use taste_graph_sdk::Domain;

/// Where accepted challenges are kept.
#[async_trait]
pub trait ChallengeStore: Send + Sync {
    /// Short name for logs and notices, e.g. `"managed"` or `"local"`.
    fn name(&self) -> &'static str;

    /// Capability check: can this store be used right now?
    async fn is_available(&self) -> bool;

    /// All challenges, oldest first.
    async fn list(&self) -> anyhow::Result<Vec<Challenge>>;

    async fn insert(&self, challenge: &Challenge) -> anyhow::Result<()>;

    /// Set or clear the completion mark. `Ok(None)` if the id is unknown.
    async fn set_completed(
        &self,
        id: &str,
        completed_at: Option<DateTime<Utc>>,
    ) -> anyhow::Result<Option<Challenge>>;

    /// `Ok(false)` if the id is unknown.
    async fn remove(&self, id: &str) -> anyhow::Result<bool>;
}

/// Read access to a user's stored taste preferences.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn read_preferences(&self, user_id: &str) -> anyhow::Result<UserPreferenceSet>;
}

/// Source of card batches for a browsing session.
#[async_trait]
pub trait CardFeed: Send + Sync {
    /// # Errors
    /// [`DiscomfortError::FeedUnavailable`] or [`DiscomfortError::EmptyFeed`],
    /// both meaning "retry later".
    async fn fetch_cards(
        &self,
        preferences: &[PreferenceInput],
        domains: &[Domain],
    ) -> Result<Vec<DiscomfortCard>, DiscomfortError>;
}

/// Text handed to the platform share sheet or the clipboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
}

impl SharePayload {
    #[must_use]
    pub fn for_card(card: &DiscomfortCard) -> Self {
        Self {
            title: card.title.clone(),
            text: card.description.clone(),
        }
    }

    /// Single-line form used for the clipboard.
    #[must_use]
    pub fn clipboard_text(&self) -> String {
        format!("{}: {}", self.title, self.text)
    }
}

/// Platform sharing facilities.
#[async_trait]
pub trait ShareTarget: Send + Sync {
    fn supports_native_share(&self) -> bool;

    async fn native_share(&self, payload: &SharePayload) -> anyhow::Result<()>;

    async fn copy_to_clipboard(&self, text: &str) -> anyhow::Result<()>;
}
