//! Two-tier challenge storage: the managed backend when it can be used,
//! device-local storage otherwise.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use discomfort_sdk::{Challenge, ChallengeStats, ChallengeStore, DiscomfortError};

/// Something the user should be told after a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageNotice {
    /// The primary store failed; the challenge went to the fallback store,
    /// which also takes every later save of this session.
    FellBack {
        from: &'static str,
        to: &'static str,
        reason: String,
    },
    /// No store accepted the challenge.
    NotSaved { reason: String },
}

impl StorageNotice {
    /// Short text for a toast or status line.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::FellBack { to, .. } => {
                format!("Challenge saved to {to} storage; sync is unavailable right now.")
            }
            Self::NotSaved { .. } => "Challenge could not be saved.".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReceipt {
    /// Store that holds the challenge, if any.
    pub stored_in: Option<&'static str>,
    pub notice: Option<StorageNotice>,
}

/// Primary and fallback store, chosen once when the session starts.
///
/// A failed write to the primary store moves the repository to the fallback
/// store for the rest of its life.
pub struct TieredChallengeRepository {
    primary: Arc<dyn ChallengeStore>,
    fallback: Arc<dyn ChallengeStore>,
    use_primary: AtomicBool,
}

impl TieredChallengeRepository {
    /// Asks the primary store whether it can be used, once.
    pub async fn select(primary: Arc<dyn ChallengeStore>, fallback: Arc<dyn ChallengeStore>) -> Self {
        let use_primary = primary.is_available().await;
        tracing::info!(
            store = if use_primary { primary.name() } else { fallback.name() },
            "challenge store selected"
        );
        Self {
            primary,
            fallback,
            use_primary: AtomicBool::new(use_primary),
        }
    }

    fn active(&self) -> &Arc<dyn ChallengeStore> {
        if self.use_primary.load(Ordering::Acquire) {
            &self.primary
        } else {
            &self.fallback
        }
    }

    #[must_use]
    pub fn active_store(&self) -> &'static str {
        self.active().name()
    }

    /// Persist a challenge. Never fails; problems come back as a notice.
    pub async fn save(&self, challenge: &Challenge) -> SaveReceipt {
        // Decided before the write: a concurrent save may demote the
        // repository while this one is still waiting on the primary.
        let on_primary = self.use_primary.load(Ordering::Acquire);
        let store = if on_primary { &self.primary } else { &self.fallback };
        let Err(primary_err) = store.insert(challenge).await else {
            return SaveReceipt {
                stored_in: Some(store.name()),
                notice: None,
            };
        };

        if !on_primary {
            tracing::warn!(store = store.name(), error = %primary_err, "challenge not saved");
            return SaveReceipt {
                stored_in: None,
                notice: Some(StorageNotice::NotSaved {
                    reason: primary_err.to_string(),
                }),
            };
        }

        if self.use_primary.swap(false, Ordering::AcqRel) {
            tracing::warn!(
                from = self.primary.name(),
                to = self.fallback.name(),
                error = %primary_err,
                "primary challenge store failed; switching to fallback"
            );
        } else {
            tracing::debug!(error = %primary_err, "primary challenge store already demoted");
        }
        match self.fallback.insert(challenge).await {
            Ok(()) => SaveReceipt {
                stored_in: Some(self.fallback.name()),
                notice: Some(StorageNotice::FellBack {
                    from: self.primary.name(),
                    to: self.fallback.name(),
                    reason: primary_err.to_string(),
                }),
            },
            Err(e) => {
                tracing::warn!(store = self.fallback.name(), error = %e, "challenge not saved");
                SaveReceipt {
                    stored_in: None,
                    notice: Some(StorageNotice::NotSaved {
                        reason: e.to_string(),
                    }),
                }
            }
        }
    }

    /// # Errors
    /// [`DiscomfortError::Storage`] when the active store cannot be read.
    pub async fn list(&self) -> Result<Vec<Challenge>, DiscomfortError> {
        self.active()
            .list()
            .await
            .map_err(|e| DiscomfortError::storage(e.to_string()))
    }

    /// Mark a challenge done now.
    ///
    /// # Errors
    /// [`DiscomfortError::ChallengeNotFound`] or [`DiscomfortError::Storage`].
    pub async fn complete(&self, id: &str) -> Result<Challenge, DiscomfortError> {
        self.set_completed(id, Some(Utc::now())).await
    }

    /// Clear a challenge's completion.
    ///
    /// # Errors
    /// [`DiscomfortError::ChallengeNotFound`] or [`DiscomfortError::Storage`].
    pub async fn reactivate(&self, id: &str) -> Result<Challenge, DiscomfortError> {
        self.set_completed(id, None).await
    }

    async fn set_completed(
        &self,
        id: &str,
        completed_at: Option<chrono::DateTime<Utc>>,
    ) -> Result<Challenge, DiscomfortError> {
        self.active()
            .set_completed(id, completed_at)
            .await
            .map_err(|e| DiscomfortError::storage(e.to_string()))?
            .ok_or_else(|| DiscomfortError::challenge_not_found(id))
    }

    /// # Errors
    /// [`DiscomfortError::ChallengeNotFound`] or [`DiscomfortError::Storage`].
    pub async fn remove(&self, id: &str) -> Result<(), DiscomfortError> {
        let removed = self
            .active()
            .remove(id)
            .await
            .map_err(|e| DiscomfortError::storage(e.to_string()))?;
        if removed {
            Ok(())
        } else {
            Err(DiscomfortError::challenge_not_found(id))
        }
    }

    /// # Errors
    /// [`DiscomfortError::Storage`] when the active store cannot be read.
    pub async fn stats(&self) -> Result<ChallengeStats, DiscomfortError> {
        Ok(ChallengeStats::of(&self.list().await?))
    }
}
