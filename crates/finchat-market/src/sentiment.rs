//! Sentiment scoring for short financial texts
//!
//! [`SentimentScorer::score`] never fails: transport errors and malformed
//! model output degrade to [`Sentiment::neutral`].

use crate::cache::TtlCache;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Hosted financial-news sentiment model
pub const DEFAULT_SENTIMENT_URL: &str = "https://api-inference.huggingface.co/models/mrm8488/distilroberta-finetuned-financial-news-sentiment-analysis";

/// Label and confidence for one text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    /// Model label (`positive`, `neutral`, `negative`, any case)
    pub label: String,
    /// Model confidence in `[0, 1]`
    pub score: f64,
}

impl Sentiment {
    /// Fallback when scoring is unavailable
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            label: "NEUTRAL".to_string(),
            score: 0.0,
        }
    }

    /// Label mapped to `+1 / 0 / -1`, unknown labels count as neutral
    #[must_use]
    pub fn polarity(&self) -> f64 {
        match self.label.to_ascii_lowercase().as_str() {
            "positive" => 1.0,
            "negative" => -1.0,
            _ => 0.0,
        }
    }

    /// Polarity weighted by confidence
    #[must_use]
    pub fn weighted(&self) -> f64 {
        self.polarity() * self.score
    }
}

/// Trait for text sentiment classification
#[async_trait]
pub trait SentimentScorer: Send + Sync {
    /// Classify `text`; never errors
    async fn score(&self, text: &str) -> Sentiment;
}

/// Configuration for [`HuggingFaceSentiment`]
#[derive(Clone)]
pub struct SentimentConfig {
    /// Inference API token
    pub api_token: String,
    /// Model endpoint
    pub url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl fmt::Debug for SentimentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentimentConfig")
            .field("api_token", &"[REDACTED]")
            .field("url", &self.url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SentimentConfig {
    /// Default model endpoint with the given token
    #[must_use]
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            url: DEFAULT_SENTIMENT_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Override the endpoint
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

/// Hugging Face inference client with a per-text cache
pub struct HuggingFaceSentiment {
    client: reqwest::Client,
    config: SentimentConfig,
    cache: Arc<TtlCache<Sentiment>>,
}

impl HuggingFaceSentiment {
    /// Create a scorer backed by `cache`
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: SentimentConfig, cache: Arc<TtlCache<Sentiment>>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;
        Ok(Self {
            client,
            config,
            cache,
        })
    }

    async fn classify(&self, text: &str) -> Result<Sentiment> {
        if self.config.api_token.is_empty() {
            return Err(Error::Sentiment(
                "Hugging Face API token is not defined".to_string(),
            ));
        }

        let response = self
            .client
            .post(&self.config.url)
            .bearer_auth(&self.config.api_token)
            .json(&serde_json::json!({ "inputs": text }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Sentiment(format!("HTTP {}", status)));
        }

        let body: serde_json::Value = response.json().await?;
        parse_sentiment(&body)
    }
}

/// Pull the top prediction out of `[[{label, score}, ...]]`
pub(crate) fn parse_sentiment(body: &serde_json::Value) -> Result<Sentiment> {
    body.get(0)
        .and_then(|inner| inner.get(0))
        .cloned()
        .ok_or_else(|| Error::InvalidResponse("expected nested label/score arrays".to_string()))
        .and_then(|top| {
            serde_json::from_value(top).map_err(|e| Error::InvalidResponse(e.to_string()))
        })
}

#[async_trait]
impl SentimentScorer for HuggingFaceSentiment {
    async fn score(&self, text: &str) -> Sentiment {
        let key = format!("sentiment_{}", text);
        if let Some(hit) = self.cache.get(&key) {
            debug!("Cache hit for sentiment analysis");
            return hit;
        }

        match self.classify(text).await {
            Ok(sentiment) => {
                self.cache.insert(key, sentiment.clone());
                sentiment
            }
            Err(e) => {
                warn!(error = %e, "Sentiment analysis failed, using neutral");
                Sentiment::neutral()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_nested_response() {
        let body = json!([[
            {"label": "positive", "score": 0.93},
            {"label": "neutral", "score": 0.05}
        ]]);
        let sentiment = parse_sentiment(&body).unwrap();
        assert_eq!(sentiment.label, "positive");
        assert!((sentiment.score - 0.93).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_rejects_flat_or_empty_shapes() {
        assert!(parse_sentiment(&json!([])).is_err());
        assert!(parse_sentiment(&json!([[]])).is_err());
        assert!(parse_sentiment(&json!({"error": "loading"})).is_err());
        assert!(parse_sentiment(&json!([[{"label": "positive"}]])).is_err());
    }

    #[test]
    fn test_weighted_polarity() {
        let s = |label: &str, score| Sentiment {
            label: label.to_string(),
            score,
        };
        assert_eq!(s("Positive", 0.8).weighted(), 0.8);
        assert_eq!(s("negative", 0.4).weighted(), -0.4);
        assert_eq!(s("NEUTRAL", 0.9).weighted(), 0.0);
        assert_eq!(s("bullish", 0.9).weighted(), 0.0);
    }

    #[tokio::test]
    async fn test_missing_token_degrades_to_neutral() {
        let scorer =
            HuggingFaceSentiment::new(SentimentConfig::new(""), Arc::new(TtlCache::default()))
                .unwrap();
        assert_eq!(scorer.score("Shares rally").await, Sentiment::neutral());
    }

    #[tokio::test]
    async fn test_cached_score_skips_remote() {
        let cache = Arc::new(TtlCache::default());
        let cached = Sentiment {
            label: "negative".to_string(),
            score: 0.7,
        };
        cache.insert("sentiment_Shares slump", cached.clone());

        // Empty token would force the neutral fallback on a miss.
        let scorer = HuggingFaceSentiment::new(SentimentConfig::new(""), cache).unwrap();
        assert_eq!(scorer.score("Shares slump").await, cached);
    }
}
