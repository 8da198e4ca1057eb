//! Aggregated news sentiment per symbol

use crate::provider::NewsItem;
use crate::sentiment::Sentiment;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Threshold separating a leaning aggregate from a neutral one
pub const LABEL_THRESHOLD: f64 = 0.1;

/// Aggregate label over a set of articles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AggregateLabel {
    /// Average above `+0.1`
    Positive,
    /// Average within `[-0.1, 0.1]`
    #[default]
    Neutral,
    /// Average below `-0.1`
    Negative,
}

impl AggregateLabel {
    /// Label for a weighted average
    #[must_use]
    pub fn from_average(average: f64) -> Self {
        if average > LABEL_THRESHOLD {
            Self::Positive
        } else if average < -LABEL_THRESHOLD {
            Self::Negative
        } else {
            Self::Neutral
        }
    }
}

impl fmt::Display for AggregateLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Positive => "Positive",
            Self::Neutral => "Neutral",
            Self::Negative => "Negative",
        };
        f.write_str(s)
    }
}

/// One headline with its score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredArticle {
    /// Headline
    pub title: String,
    /// Plain-text summary
    pub summary: String,
    /// Publication time
    pub published_at: Option<DateTime<Utc>>,
    /// Model label
    pub sentiment_label: String,
    /// Model confidence
    pub sentiment_score: f64,
}

impl ScoredArticle {
    /// Attach a sentiment to a feed item
    #[must_use]
    pub fn new(item: NewsItem, sentiment: Sentiment) -> Self {
        Self {
            title: item.title,
            summary: item.summary,
            published_at: item.published_at,
            sentiment_label: sentiment.label,
            sentiment_score: sentiment.score,
        }
    }

    fn sentiment(&self) -> Sentiment {
        Sentiment {
            label: self.sentiment_label.clone(),
            score: self.sentiment_score,
        }
    }
}

/// Scored headlines and their confidence-weighted average
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSentimentRecord {
    /// Ticker symbol
    pub symbol: String,
    /// Scored headlines in feed order
    pub articles: Vec<ScoredArticle>,
    /// Mean of `polarity * score`
    pub average_score: f64,
    /// Label derived from `average_score`
    pub average_label: AggregateLabel,
}

impl StockSentimentRecord {
    /// Empty neutral record
    #[must_use]
    pub fn neutral(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            articles: Vec::new(),
            average_score: 0.0,
            average_label: AggregateLabel::Neutral,
        }
    }

    /// Aggregate scored articles
    #[must_use]
    pub fn from_articles(symbol: impl Into<String>, articles: Vec<ScoredArticle>) -> Self {
        if articles.is_empty() {
            return Self::neutral(symbol);
        }
        let total: f64 = articles.iter().map(|a| a.sentiment().weighted()).sum();
        let average = total / articles.len() as f64;

        Self {
            symbol: symbol.into(),
            articles,
            average_score: average,
            average_label: AggregateLabel::from_average(average),
        }
    }

    /// Whether any headline was scored
    #[must_use]
    pub fn has_articles(&self) -> bool {
        !self.articles.is_empty()
    }
}
