//! Taste graph error types.

use thiserror::Error;
use zesty_errors::FailureKind;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TasteGraphError {
    #[error("taste graph credential is not configured")]
    NotConfigured,

    #[error("taste graph request timed out")]
    Timeout,

    #[error("taste graph transport error: {message}")]
    Transport { message: String },

    #[error("taste graph returned status {status}")]
    Upstream {
        status: u16,
        retry_after_sec: Option<u64>,
    },

    #[error("taste graph response could not be decoded: {message}")]
    Malformed { message: String },

    /// Caller supplied something the graph cannot be asked about.
    #[error("invalid taste graph query: {message}")]
    InvalidQuery { message: String },
}

impl TasteGraphError {
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn upstream(status: u16, retry_after_sec: Option<u64>) -> Self {
        Self::Upstream {
            status,
            retry_after_sec,
        }
    }

    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    /// Failure class the caller builds its fallback from. Invalid queries
    /// count as malformed: retrying them cannot help.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NotConfigured => FailureKind::NotConfigured,
            Self::Timeout => FailureKind::Timeout,
            Self::Transport { .. } => FailureKind::Transport,
            Self::Upstream { .. } => FailureKind::Upstream,
            Self::Malformed { .. } | Self::InvalidQuery { .. } => FailureKind::Malformed,
        }
    }

    #[must_use]
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::Upstream { status, .. } => *status == 429 || *status >= 500,
            other => other.kind().is_retriable(),
        }
    }
}
