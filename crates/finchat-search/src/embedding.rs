//! Embedding client backed by a hosted feature-extraction endpoint
//!
//! Turns free text into a fixed-length vector. A response whose length differs
//! from the configured dimensions is an error, never a truncated or padded vector.
//! There is no internal retry; callers decide whether an embedding failure is
//! terminal.

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Dimensions produced by all-mpnet-base-v2
pub const EMBEDDING_DIMENSIONS: usize = 768;

/// Default feature-extraction endpoint
pub const DEFAULT_EMBEDDING_URL: &str = "https://api-inference.huggingface.co/pipeline/feature-extraction/sentence-transformers/all-mpnet-base-v2";

/// Trait for embedding providers
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate the embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Get the embedding dimension
    fn dimensions(&self) -> usize;
}

/// Accept a raw vector only if it has exactly `expected` components
pub fn check_dimensions(vector: Vec<f32>, expected: usize) -> Result<Vec<f32>> {
    if vector.len() != expected {
        return Err(Error::Embedding(format!(
            "Unexpected embedding size: {}. Expected {}.",
            vector.len(),
            expected
        )));
    }
    Ok(vector)
}

/// Configuration for [`HuggingFaceEmbedder`]
#[derive(Clone)]
pub struct EmbeddingConfig {
    /// Bearer token
    pub api_token: String,
    /// Feature-extraction endpoint
    pub url: String,
    /// Expected vector length
    pub dimensions: usize,
    /// Request timeout
    pub timeout: Duration,
}

impl fmt::Debug for EmbeddingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingConfig")
            .field("api_token", &"[REDACTED]")
            .field("url", &self.url)
            .field("dimensions", &self.dimensions)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl EmbeddingConfig {
    /// Create a config for the default endpoint
    #[must_use]
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            url: DEFAULT_EMBEDDING_URL.to_string(),
            dimensions: EMBEDDING_DIMENSIONS,
            timeout: Duration::from_secs(30),
        }
    }

    /// Override the endpoint
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Override the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: &'a str,
}

/// Hugging Face Inference API embedder
pub struct HuggingFaceEmbedder {
    client: reqwest::Client,
    config: EmbeddingConfig,
}

impl HuggingFaceEmbedder {
    /// Create a new embedder
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built or the token is empty
    pub fn new(config: EmbeddingConfig) -> Result<Self> {
        if config.api_token.is_empty() {
            return Err(Error::NotConfigured(
                "HUGGINGFACE_API_TOKEN is required for embeddings".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Embedding(e.to_string()))?;
        Ok(Self { client, config })
    }
}

/// Decode a feature-extraction body into a flat vector
pub(crate) fn parse_vector(body: &serde_json::Value) -> Result<Vec<f32>> {
    let items = body
        .as_array()
        .ok_or_else(|| Error::Embedding("Embedding response is not an array".to_string()))?;

    items
        .iter()
        .map(|v| {
            v.as_f64().map(|f| f as f32).ok_or_else(|| {
                Error::Embedding(format!(
                    "Unexpected embedding size: {}. Expected a flat vector.",
                    items.len()
                ))
            })
        })
        .collect()
}

#[async_trait]
impl EmbeddingProvider for HuggingFaceEmbedder {
    #[instrument(skip(self, text), fields(chars = text.len()))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let response = self
            .client
            .post(&self.config.url)
            .bearer_auth(&self.config.api_token)
            .json(&FeatureExtractionRequest { inputs: text })
            .send()
            .await
            .map_err(|e| Error::Embedding(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Embedding endpoint returned an error");
            return Err(Error::Embedding(format!("HTTP {}", status)));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Embedding(e.to_string()))?;

        let vector = check_dimensions(parse_vector(&body)?, self.config.dimensions)?;
        debug!(dimensions = vector.len(), "Generated query embedding");
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }
}
