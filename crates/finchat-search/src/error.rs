//! Error types for finchat-search

use thiserror::Error;

/// Error type for embedding and similarity search operations
#[derive(Error, Debug)]
pub enum Error {
    /// Embedding request failed or returned a vector of the wrong size
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Query vector is empty or has the wrong dimensions
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Vector index rejected or failed the search
    #[error("Search error: {0}")]
    Search(String),

    /// Required credentials or endpoints are missing
    #[error("Not configured: {0}")]
    NotConfigured(String),
}

/// Result type for search operations
pub type Result<T> = std::result::Result<T, Error>;
