//! finchat Market - quotes, price history and news sentiment
//!
//! - [`MarketDataClient`]: read-through cached access to a [`MarketDataProvider`]
//! - [`YahooFinance`]: provider backed by Yahoo Finance endpoints and RSS
//! - [`HuggingFaceSentiment`]: per-text cached [`SentimentScorer`]
//! - [`TtlCache`] / [`InflightRegistry`]: the caching and de-duplication primitives

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cache;
pub mod client;
pub mod error;
pub mod inflight;
pub mod news;
pub mod provider;
pub mod rss;
pub mod sentiment;
pub mod yahoo;

pub use cache::{CacheEntry, TtlCache, DEFAULT_CAPACITY, DEFAULT_TTL};
pub use client::{MarketConfig, MarketDataClient};
pub use error::{Error, Result};
pub use inflight::InflightRegistry;
pub use news::{AggregateLabel, ScoredArticle, StockSentimentRecord};
pub use provider::{
    DailyBar, HistoryPeriod, HistoryRange, MarketDataProvider, NewsItem, RealTimeQuote,
    SymbolMatch,
};
pub use sentiment::{HuggingFaceSentiment, Sentiment, SentimentConfig, SentimentScorer};
pub use yahoo::{YahooConfig, YahooFinance};
