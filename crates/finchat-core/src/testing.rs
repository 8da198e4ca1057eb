//! Fakes shared by the unit tests

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use finchat_market::{
    DailyBar, HistoryRange, MarketConfig, MarketDataClient, MarketDataProvider, NewsItem,
    RealTimeQuote, Sentiment, SentimentScorer, SymbolMatch,
};
use finchat_search::{EmbeddingProvider, SimilaritySearch};
use std::sync::{Arc, Mutex};

/// Embedder that returns a constant 768-float vector and records inputs
#[derive(Default)]
pub struct FixedEmbedder {
    pub fail: bool,
    pub inputs: Mutex<Vec<String>>,
}

#[async_trait]
impl EmbeddingProvider for FixedEmbedder {
    async fn embed(&self, text: &str) -> finchat_search::Result<Vec<f32>> {
        self.inputs.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(finchat_search::Error::Embedding(
                "Unexpected embedding size: 384. Expected 768.".to_string(),
            ));
        }
        Ok(vec![0.01; finchat_search::EMBEDDING_DIMENSIONS])
    }

    fn dimensions(&self) -> usize {
        finchat_search::EMBEDDING_DIMENSIONS
    }
}

/// Search that validates the vector and returns fixed ids
pub struct StaticSearch(pub Vec<&'static str>);

#[async_trait]
impl SimilaritySearch for StaticSearch {
    async fn search(&self, vector: &[f32]) -> finchat_search::Result<Vec<String>> {
        finchat_search::validate_query(vector, finchat_search::EMBEDDING_DIMENSIONS)?;
        Ok(self.0.iter().map(|s| s.to_string()).collect())
    }
}

/// Market provider that knows AAPL and MSFT and records quote lookups
#[derive(Default)]
pub struct FakeMarket {
    pub quote_calls: Mutex<Vec<String>>,
}

impl FakeMarket {
    pub fn quoted(&self) -> Vec<String> {
        self.quote_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketDataProvider for FakeMarket {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn quote(&self, symbol: &str) -> finchat_market::Result<Option<RealTimeQuote>> {
        self.quote_calls.lock().unwrap().push(symbol.to_string());
        let price = match symbol {
            "AAPL" => 189.84,
            "MSFT" => 415.5,
            _ => return Ok(None),
        };
        Ok(Some(RealTimeQuote {
            symbol: symbol.to_string(),
            short_name: None,
            price,
            change: 2.16,
            change_percent: 1.15,
            previous_close: None,
            volume: None,
            currency: Some("USD".to_string()),
            market_time: None,
        }))
    }

    async fn daily_history(
        &self,
        _symbol: &str,
        _range: &HistoryRange,
    ) -> finchat_market::Result<Vec<DailyBar>> {
        let bar = |day: u32, close: f64| DailyBar {
            date: Utc.with_ymd_and_hms(2024, 3, day, 14, 30, 0).unwrap(),
            open: 187.15,
            high: 190.32,
            low: 186.5,
            close,
            volume: 53_665_781,
        };
        Ok(vec![bar(5, 187.68), bar(6, 189.84)])
    }

    async fn news(&self, _symbol: &str) -> finchat_market::Result<Vec<NewsItem>> {
        let item = |text: &str| NewsItem {
            title: text.to_string(),
            text: text.to_string(),
            summary: String::new(),
            published_at: None,
        };
        Ok(vec![item("Earnings beat"), item("Revenue miss"), item("Flat")])
    }

    async fn search(&self, _keywords: &str) -> finchat_market::Result<Vec<SymbolMatch>> {
        Ok(Vec::new())
    }
}

/// Scores `beat` positive, `miss` negative, anything else neutral
pub struct KeywordScorer;

#[async_trait]
impl SentimentScorer for KeywordScorer {
    async fn score(&self, text: &str) -> Sentiment {
        let (label, score) = if text.contains("beat") {
            ("positive", 0.8)
        } else if text.contains("miss") {
            ("negative", 0.4)
        } else {
            ("neutral", 0.0)
        };
        Sentiment {
            label: label.to_string(),
            score,
        }
    }
}

pub fn market_client(provider: Arc<FakeMarket>) -> Arc<MarketDataClient> {
    Arc::new(MarketDataClient::new(
        provider,
        Arc::new(KeywordScorer),
        MarketConfig::default(),
    ))
}
