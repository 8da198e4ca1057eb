//! Cached market data client
//!
//! Every operation reads through its own TTL cache. Quotes, history and
//! symbol search fail hard on empty provider results; news sentiment is
//! fail-soft and de-duplicated across concurrent callers.

use crate::cache::{TtlCache, DEFAULT_CAPACITY, DEFAULT_TTL};
use crate::error::{Error, Result};
use crate::inflight::InflightRegistry;
use crate::news::{ScoredArticle, StockSentimentRecord};
use crate::provider::{
    DailyBar, HistoryPeriod, HistoryRange, MarketDataProvider, RealTimeQuote, SymbolMatch,
};
use crate::sentiment::SentimentScorer;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Client tuning
#[derive(Debug, Clone)]
pub struct MarketConfig {
    /// TTL shared by every cache
    pub cache_ttl: Duration,
    /// Entry bound per cache
    pub cache_capacity: usize,
    /// Headlines scored per symbol
    pub news_limit: usize,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_TTL,
            cache_capacity: DEFAULT_CAPACITY,
            news_limit: 10,
        }
    }
}

fn cache<V: Clone>(config: &MarketConfig) -> TtlCache<V> {
    TtlCache::new(config.cache_ttl, config.cache_capacity)
}

/// Quotes, history, news sentiment and symbol search with caching
pub struct MarketDataClient {
    provider: Arc<dyn MarketDataProvider>,
    scorer: Arc<dyn SentimentScorer>,
    quotes: TtlCache<RealTimeQuote>,
    history: TtlCache<Vec<DailyBar>>,
    sentiment: Arc<TtlCache<StockSentimentRecord>>,
    symbols: TtlCache<Vec<SymbolMatch>>,
    inflight: InflightRegistry<StockSentimentRecord>,
    news_limit: usize,
}

impl MarketDataClient {
    /// Create a client over `provider`, scoring headlines with `scorer`
    #[must_use]
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        scorer: Arc<dyn SentimentScorer>,
        config: MarketConfig,
    ) -> Self {
        Self {
            provider,
            scorer,
            quotes: cache(&config),
            history: cache(&config),
            sentiment: Arc::new(cache(&config)),
            symbols: cache(&config),
            inflight: InflightRegistry::new(),
            news_limit: config.news_limit,
        }
    }

    /// Latest quote for `symbol`
    ///
    /// # Errors
    /// `QuoteNotFound` when the provider has nothing for the symbol
    pub async fn quote(&self, symbol: &str) -> Result<RealTimeQuote> {
        let key = format!("real_time_quote_{}", symbol);
        if let Some(hit) = self.quotes.get(&key) {
            debug!(symbol, "Cache hit for real-time quote");
            return Ok(hit);
        }

        let quote = self
            .provider
            .quote(symbol)
            .await?
            .ok_or_else(|| Error::QuoteNotFound(symbol.to_string()))?;

        self.quotes.insert(key, quote.clone());
        info!(symbol, provider = self.provider.name(), "Cached real-time quote");
        Ok(quote)
    }

    /// Daily bars for `symbol`, most recent first
    ///
    /// `period` is `1mo`, `6mo` or `1y` (anything else means one month).
    ///
    /// # Errors
    /// `HistoryNotFound` when the provider returns no bars
    pub async fn history(&self, symbol: &str, period: &str, interval: &str) -> Result<Vec<DailyBar>> {
        let key = format!("daily_time_series_{}_{}_{}", symbol, period, interval);
        if let Some(hit) = self.history.get(&key) {
            debug!(symbol, period, interval, "Cache hit for daily time series");
            return Ok(hit);
        }

        let today = chrono::Utc::now().date_naive();
        let range = HistoryRange::ending(today, HistoryPeriod::parse(period), interval);
        let mut bars = self.provider.daily_history(symbol, &range).await?;
        if bars.is_empty() {
            return Err(Error::HistoryNotFound(symbol.to_string()));
        }
        bars.sort_by(|a, b| b.date.cmp(&a.date));

        self.history.insert(key, bars.clone());
        info!(symbol, bars = bars.len(), "Cached daily time series");
        Ok(bars)
    }

    /// Scored recent headlines for `symbol`
    ///
    /// Never fails: any problem yields [`StockSentimentRecord::neutral`].
    /// Concurrent calls for the same symbol share a single feed fetch.
    pub async fn news_sentiment(&self, symbol: &str) -> StockSentimentRecord {
        let key = format!("news_sentiment_{}", symbol);
        if let Some(hit) = self.sentiment.get(&key) {
            debug!(symbol, "Cache hit for news sentiment");
            return hit;
        }

        let provider = Arc::clone(&self.provider);
        let scorer = Arc::clone(&self.scorer);
        let cache = Arc::clone(&self.sentiment);
        let symbol = symbol.to_string();
        let limit = self.news_limit;
        let cache_key = key.clone();

        self.inflight
            .run(&key, move || async move {
                if let Some(hit) = cache.get(&cache_key) {
                    return hit;
                }
                match score_headlines(provider.as_ref(), scorer.as_ref(), &symbol, limit).await {
                    Ok(record) => {
                        cache.insert(cache_key, record.clone());
                        info!(symbol = %symbol, articles = record.articles.len(), "Cached news sentiment");
                        record
                    }
                    Err(e) => {
                        warn!(symbol = %symbol, error = %e, "News sentiment unavailable, using neutral");
                        StockSentimentRecord::neutral(symbol)
                    }
                }
            })
            .await
    }

    /// Symbols matching `keywords`
    ///
    /// # Errors
    /// `SymbolNotFound` when nothing matches
    pub async fn search_symbols(&self, keywords: &str) -> Result<Vec<SymbolMatch>> {
        let key = format!("symbol_search_{}", keywords.to_uppercase());
        if let Some(hit) = self.symbols.get(&key) {
            debug!(keywords, "Cache hit for symbol search");
            return Ok(hit);
        }

        let matches = self.provider.search(keywords).await?;
        if matches.is_empty() {
            return Err(Error::SymbolNotFound(keywords.to_string()));
        }

        self.symbols.insert(key, matches.clone());
        Ok(matches)
    }
}

async fn score_headlines(
    provider: &dyn MarketDataProvider,
    scorer: &dyn SentimentScorer,
    symbol: &str,
    limit: usize,
) -> Result<StockSentimentRecord> {
    let mut items = provider.news(symbol).await?;
    if items.is_empty() {
        return Err(Error::NewsNotFound(symbol.to_string()));
    }
    items.truncate(limit);

    let scores = join_all(items.iter().map(|item| scorer.score(&item.text))).await;
    let articles = items
        .into_iter()
        .zip(scores)
        .map(|(item, sentiment)| ScoredArticle::new(item, sentiment))
        .collect();

    Ok(StockSentimentRecord::from_articles(symbol, articles))
}
