//! Errors of the card session and its collaborators.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscomfortError {
    /// The action needs a card on screen.
    #[error("no card is being presented")]
    NotPresenting,

    /// The action is not valid in the session's current state.
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("challenge not found: {id}")]
    ChallengeNotFound { id: String },

    /// Card source unreachable or returned an error; try again later.
    #[error("card feed unavailable: {message}")]
    FeedUnavailable { message: String },

    /// The card source answered with no cards; try again later.
    #[error("card feed returned no cards")]
    EmptyFeed,

    #[error("challenge storage failed: {message}")]
    Storage { message: String },

    #[error("sharing failed: {message}")]
    ShareFailed { message: String },
}

impl DiscomfortError {
    #[must_use]
    pub fn challenge_not_found(id: impl Into<String>) -> Self {
        Self::ChallengeNotFound { id: id.into() }
    }

    #[must_use]
    pub fn feed_unavailable(message: impl Into<String>) -> Self {
        Self::FeedUnavailable {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn share_failed(message: impl Into<String>) -> Self {
        Self::ShareFailed {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// "Retry later" conditions rather than caller mistakes.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::FeedUnavailable { .. } | Self::EmptyFeed | Self::Storage { .. })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn feed_and_storage_problems_are_retriable() {
        assert!(DiscomfortError::EmptyFeed.is_retriable());
        assert!(DiscomfortError::feed_unavailable("down").is_retriable());
        assert!(DiscomfortError::storage("disk full").is_retriable());
        assert!(!DiscomfortError::NotPresenting.is_retriable());
        assert!(!DiscomfortError::challenge_not_found("x").is_retriable());
    }

    #[test]
    fn transition_message_names_action_and_state() {
        let err = DiscomfortError::InvalidTransition {
            action: "regenerate",
            state: "presenting",
        };
        assert_eq!(err.to_string(), "cannot regenerate while presenting");
    }
}
