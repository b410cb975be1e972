use std::time::Duration;

/// Failure of a single provider call
///
/// These never reach the caller of a search: the fallback chain logs them and
/// moves on to the next adapter.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Credentials missing or rejected
    #[error("{provider} unavailable: {reason}")]
    Unavailable {
        provider: &'static str,
        reason: String,
    },

    #[error("{provider} quota exceeded")]
    RateLimited { provider: &'static str },

    /// Non-2xx response
    #[error("{provider} returned HTTP {status}: {message}")]
    Http {
        provider: &'static str,
        status: u16,
        message: String,
    },

    /// 2xx response whose body could not be read as the expected format
    #[error("{provider} returned a malformed response: {message}")]
    Malformed {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} timed out after {}ms", .after.as_millis())]
    Timeout {
        provider: &'static str,
        after: Duration,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl ProviderError {
    /// Map a transport error, turning client-side deadlines into `Timeout`.
    pub fn from_transport(provider: &'static str, deadline: Duration, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout {
                provider,
                after: deadline,
            }
        } else {
            ProviderError::Network(err.without_url())
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ProviderError::Timeout { .. })
    }
}

/// Errors surfaced to the caller of a search
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Rejected before any provider was called
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Even the curated fallback could not be produced
    #[error("Search service failure: {0}")]
    Internal(String),
}
