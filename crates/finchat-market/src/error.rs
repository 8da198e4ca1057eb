//! Error types for finchat-market

use thiserror::Error;

/// Error type for market data operations
#[derive(Error, Debug)]
pub enum Error {
    /// Provider returned no quote for the symbol
    #[error("No real-time data found for symbol: {0}")]
    QuoteNotFound(String),

    /// Provider returned no bars for the symbol and range
    #[error("No historical data found for symbol: {0}")]
    HistoryNotFound(String),

    /// News feed had no items for the symbol
    #[error("No news articles found for symbol: {0}")]
    NewsNotFound(String),

    /// Symbol search matched nothing
    #[error("No matching symbols found for keywords: {0}")]
    SymbolNotFound(String),

    /// Transport failure talking to a provider
    #[error("Network error: {0}")]
    Network(String),

    /// Provider answered with something we could not parse
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Sentiment model call failed
    #[error("Sentiment error: {0}")]
    Sentiment(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Error::InvalidResponse(err.without_url().to_string())
        } else {
            Error::Network(err.without_url().to_string())
        }
    }
}

/// Result type for market data operations
pub type Result<T> = std::result::Result<T, Error>;
