//! Error types for finchat-core
//!
//! Enrichment and generation failures that reach the caller, plus a
//! user-facing rendering that never echoes credentials.

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Embedding or similarity search failed on the support path
    #[error("search error: {0}")]
    Search(#[from] finchat_search::Error),

    /// Market data lookup failed
    #[error("market data error: {0}")]
    Market(#[from] finchat_market::Error),

    /// A single provider call failed
    #[error("llm error: {0}")]
    Llm(#[from] finchat_llm::Error),

    /// Primary retries and the secondary fallback were all exhausted
    #[error("Both {primary_provider} and {secondary_provider} APIs failed.")]
    BothProvidersFailed {
        /// Primary provider name
        primary_provider: String,
        /// Secondary provider name
        secondary_provider: String,
        /// Last primary error
        primary: finchat_llm::Error,
        /// Secondary error
        secondary: finchat_llm::Error,
    },

    /// Caller supplied values that cannot be processed
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the caller is at fault (maps to a 4xx at the HTTP boundary)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }

    /// Message safe to show an end user
    #[must_use]
    pub fn user_message(&self) -> String {
        finchat_llm::util::sanitize_error_for_user(&self.to_string())
    }
}
