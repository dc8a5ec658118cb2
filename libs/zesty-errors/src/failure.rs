/// Why a call to an external service did not produce a usable answer.
///
/// Wrappers around the taste graph and the text generator report one of these
/// instead of swallowing the error, and callers pick their fallback from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// No credential configured; the call was never attempted.
    NotConfigured,
    Timeout,
    /// Connection refused, DNS failure, TLS error and the like.
    Transport,
    /// The service answered with a non-success status.
    Upstream,
    /// The service answered 2xx but the body was not what we asked for.
    Malformed,
}

impl FailureKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotConfigured => "not_configured",
            Self::Timeout => "timeout",
            Self::Transport => "transport",
            Self::Upstream => "upstream",
            Self::Malformed => "malformed",
        }
    }

    /// Whether repeating the same call later could succeed.
    #[must_use]
    pub const fn is_retriable(self) -> bool {
        matches!(self, Self::Timeout | Self::Transport | Self::Upstream)
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
