//! Text generation error types.

use thiserror::Error;
use zesty_errors::FailureKind;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TextGenError {
    #[error("text generation credential is not configured")]
    NotConfigured,

    #[error("prompt is empty")]
    EmptyPrompt,

    #[error("text generation timed out")]
    Timeout,

    #[error("text generation transport error: {message}")]
    Transport { message: String },

    #[error("text generation returned status {status}")]
    Upstream { status: u16 },

    /// A reply arrived but carried no usable text, or not the JSON asked for.
    #[error("unusable text generation response: {message}")]
    Malformed { message: String },
}

impl TextGenError {
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NotConfigured => FailureKind::NotConfigured,
            Self::Timeout => FailureKind::Timeout,
            Self::Transport { .. } => FailureKind::Transport,
            Self::Upstream { .. } => FailureKind::Upstream,
            Self::EmptyPrompt | Self::Malformed { .. } => FailureKind::Malformed,
        }
    }

    #[must_use]
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::Upstream { status } => *status == 429 || *status >= 500,
            other => other.kind().is_retriable(),
        }
    }
}
