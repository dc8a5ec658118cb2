//! One browsing session over a batch of cards.
//!
//! ```text
//! Loading --load--> Presenting(0) --accept|skip--> Presenting(i+1) ... --> Exhausted
//! Exhausted --regenerate--> Loading
//! ```

use std::sync::Arc;

use chrono::Utc;
use discomfort_sdk::{
    CardFeed, Challenge, DiscomfortCard, DiscomfortError, Domain, PreferenceInput, SharePayload,
    ShareTarget,
};

use super::repository::{SaveReceipt, TieredChallengeRepository};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    /// `cards` is fixed for the lifetime of this state; only `index` moves.
    Presenting {
        cards: Arc<[DiscomfortCard]>,
        index: usize,
    },
    Exhausted,
}

impl SessionState {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Presenting { .. } => "presenting",
            Self::Exhausted => "exhausted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    pub challenge: Challenge,
    pub receipt: SaveReceipt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    CopiedToClipboard,
}

pub struct CardSession {
    feed: Arc<dyn CardFeed>,
    repository: Arc<TieredChallengeRepository>,
    preferences: Vec<PreferenceInput>,
    domains: Vec<Domain>,
    state: SessionState,
}

impl CardSession {
    #[must_use]
    pub fn new(
        feed: Arc<dyn CardFeed>,
        repository: Arc<TieredChallengeRepository>,
        preferences: Vec<PreferenceInput>,
        domains: Vec<Domain>,
    ) -> Self {
        Self {
            feed,
            repository,
            preferences,
            domains,
            state: SessionState::Loading,
        }
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn current_card(&self) -> Option<&DiscomfortCard> {
        match &self.state {
            SessionState::Presenting { cards, index } => cards.get(*index),
            _ => None,
        }
    }

    #[must_use]
    pub fn repository(&self) -> &TieredChallengeRepository {
        &self.repository
    }

    /// Fetch a batch and present its first card. On error the session stays
    /// in `Loading` and the call can be repeated.
    ///
    /// # Errors
    /// [`DiscomfortError::FeedUnavailable`] / [`DiscomfortError::EmptyFeed`]
    /// from the feed, or [`DiscomfortError::InvalidTransition`] outside `Loading`.
    pub async fn load(&mut self) -> Result<usize, DiscomfortError> {
        if self.state != SessionState::Loading {
            return Err(self.invalid("load"));
        }
        let cards = self
            .feed
            .fetch_cards(&self.preferences, &self.domains)
            .await?;
        if cards.is_empty() {
            return Err(DiscomfortError::EmptyFeed);
        }
        let count = cards.len();
        self.state = SessionState::Presenting {
            cards: cards.into(),
            index: 0,
        };
        tracing::debug!(count, "card session presenting");
        Ok(count)
    }

    /// Keep the current card as a challenge, then move on. A failed save
    /// does not hold the session back; it is reported in the receipt.
    ///
    /// # Errors
    /// [`DiscomfortError::NotPresenting`] when no card is shown.
    pub async fn accept(&mut self) -> Result<Accepted, DiscomfortError> {
        let card = self.current_card().ok_or(DiscomfortError::NotPresenting)?;
        let challenge = Challenge::from_card(card, Utc::now());
        let receipt = self.repository.save(&challenge).await;
        self.advance();
        Ok(Accepted { challenge, receipt })
    }

    /// # Errors
    /// [`DiscomfortError::NotPresenting`] when no card is shown.
    pub fn skip(&mut self) -> Result<(), DiscomfortError> {
        if self.current_card().is_none() {
            return Err(DiscomfortError::NotPresenting);
        }
        self.advance();
        Ok(())
    }

    /// Hand the current card to the platform share sheet, or to the
    /// clipboard where there is none. Does not move the cursor.
    ///
    /// # Errors
    /// [`DiscomfortError::NotPresenting`], or [`DiscomfortError::ShareFailed`]
    /// when the platform refuses.
    pub async fn share(&self, target: &dyn ShareTarget) -> Result<ShareOutcome, DiscomfortError> {
        let card = self.current_card().ok_or(DiscomfortError::NotPresenting)?;
        let payload = SharePayload::for_card(card);
        if target.supports_native_share() {
            target
                .native_share(&payload)
                .await
                .map_err(|e| DiscomfortError::share_failed(e.to_string()))?;
            Ok(ShareOutcome::Shared)
        } else {
            target
                .copy_to_clipboard(&payload.clipboard_text())
                .await
                .map_err(|e| DiscomfortError::share_failed(e.to_string()))?;
            Ok(ShareOutcome::CopiedToClipboard)
        }
    }

    /// Start over with a fresh batch; call [`Self::load`] next.
    ///
    /// # Errors
    /// [`DiscomfortError::InvalidTransition`] unless the session is exhausted.
    pub fn regenerate(&mut self) -> Result<(), DiscomfortError> {
        if self.state != SessionState::Exhausted {
            return Err(self.invalid("regenerate"));
        }
        self.state = SessionState::Loading;
        Ok(())
    }

    fn advance(&mut self) {
        let next = match &self.state {
            SessionState::Presenting { cards, index } if index + 1 < cards.len() => {
                SessionState::Presenting {
                    cards: Arc::clone(cards),
                    index: index + 1,
                }
            }
            SessionState::Presenting { .. } => SessionState::Exhausted,
            SessionState::Loading | SessionState::Exhausted => return,
        };
        self.state = next;
    }

    fn invalid(&self, action: &'static str) -> DiscomfortError {
        DiscomfortError::InvalidTransition {
            action,
            state: self.state.name(),
        }
    }
}
