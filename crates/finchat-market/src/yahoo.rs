//! Yahoo Finance implementation of [`MarketDataProvider`]
//!
//! Quotes come from the v7 quote endpoint, bars from the v8 chart endpoint,
//! symbol lookups from v1 search and headlines from the per-symbol RSS feed.

use crate::error::{Error, Result};
use crate::provider::{
    DailyBar, HistoryRange, MarketDataProvider, NewsItem, RealTimeQuote, SymbolMatch,
};
use crate::rss;
use async_trait::async_trait;
use chrono::{DateTime, NaiveTime};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

/// Browser-like agent; the endpoints reject empty user agents
const USER_AGENT: &str = "Mozilla/5.0 (compatible; finchat/0.1)";

/// Yahoo endpoint configuration
#[derive(Debug, Clone)]
pub struct YahooConfig {
    /// Base for quote and chart requests
    pub query_url: String,
    /// Base for symbol search
    pub search_url: String,
    /// Headline feed base, symbol appended as `?s=`
    pub rss_url: String,
    /// Maximum headlines read from the feed
    pub news_limit: usize,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            query_url: "https://query1.finance.yahoo.com".to_string(),
            search_url: "https://query2.finance.yahoo.com".to_string(),
            rss_url: "https://finance.yahoo.com/rss/headline".to_string(),
            news_limit: 10,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Yahoo Finance client
pub struct YahooFinance {
    client: reqwest::Client,
    config: YahooConfig,
}

impl YahooFinance {
    /// Create a new client
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: YahooConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;
        Ok(Self { client, config })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Network(format!("HTTP {} from {}", status, url)));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinance {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    #[instrument(skip(self))]
    async fn quote(&self, symbol: &str) -> Result<Option<RealTimeQuote>> {
        let url = format!("{}/v7/finance/quote", self.config.query_url);
        let body: QuoteEnvelope = self
            .get_json(&url, &[("symbols", symbol.to_string())])
            .await?;
        Ok(body.into_quote())
    }

    #[instrument(skip(self))]
    async fn daily_history(&self, symbol: &str, range: &HistoryRange) -> Result<Vec<DailyBar>> {
        let url = format!("{}/v8/finance/chart/{}", self.config.query_url, symbol);
        let period1 = range.start.and_time(NaiveTime::MIN).and_utc().timestamp();
        let period2 = range.end.and_time(NaiveTime::MIN).and_utc().timestamp() + 86_400;
        let body: ChartEnvelope = self
            .get_json(
                &url,
                &[
                    ("period1", period1.to_string()),
                    ("period2", period2.to_string()),
                    ("interval", range.interval.clone()),
                ],
            )
            .await?;
        Ok(body.into_bars())
    }

    #[instrument(skip(self))]
    async fn news(&self, symbol: &str) -> Result<Vec<NewsItem>> {
        let response = self
            .client
            .get(&self.config.rss_url)
            .query(&[("s", symbol)])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Network(format!("HTTP {} from news feed", status)));
        }
        let xml = response.text().await?;
        let items = rss::parse_feed(&xml, self.config.news_limit)?;
        debug!(count = items.len(), "Parsed news feed");
        Ok(items)
    }

    #[instrument(skip(self))]
    async fn search(&self, keywords: &str) -> Result<Vec<SymbolMatch>> {
        let url = format!("{}/v1/finance/search", self.config.search_url);
        let body: SearchEnvelope = self.get_json(&url, &[("q", keywords.to_string())]).await?;
        Ok(body.into_matches())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteEnvelope {
    quote_response: QuoteResponse,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(default)]
    result: Vec<RawQuote>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuote {
    symbol: String,
    short_name: Option<String>,
    regular_market_price: Option<f64>,
    #[serde(default)]
    regular_market_change: f64,
    #[serde(default)]
    regular_market_change_percent: f64,
    regular_market_previous_close: Option<f64>,
    regular_market_volume: Option<u64>,
    regular_market_time: Option<i64>,
    currency: Option<String>,
}

impl QuoteEnvelope {
    fn into_quote(self) -> Option<RealTimeQuote> {
        let raw = self.quote_response.result.into_iter().next()?;
        let price = raw.regular_market_price?;
        Some(RealTimeQuote {
            symbol: raw.symbol,
            short_name: raw.short_name,
            price,
            change: raw.regular_market_change,
            change_percent: raw.regular_market_change_percent,
            previous_close: raw.regular_market_previous_close,
            volume: raw.regular_market_volume,
            currency: raw.currency,
            market_time: raw
                .regular_market_time
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

impl ChartEnvelope {
    /// Zip the column arrays into bars, skipping rows with gaps
    fn into_bars(self) -> Vec<DailyBar> {
        let Some(result) = self.chart.result.and_then(|r| r.into_iter().next()) else {
            return Vec::new();
        };
        let q = result.indicators.quote.into_iter().next().unwrap_or_default();
        let at = |col: &[Option<f64>], i: usize| col.get(i).copied().flatten();

        result
            .timestamp
            .iter()
            .enumerate()
            .filter_map(|(i, &ts)| {
                Some(DailyBar {
                    date: DateTime::from_timestamp(ts, 0)?,
                    open: at(&q.open, i)?,
                    high: at(&q.high, i)?,
                    low: at(&q.low, i)?,
                    close: at(&q.close, i)?,
                    volume: q.volume.get(i).copied().flatten().unwrap_or(0),
                })
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    quotes: Vec<RawMatch>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMatch {
    symbol: Option<String>,
    shortname: Option<String>,
    exch_disp: Option<String>,
    type_disp: Option<String>,
}

impl SearchEnvelope {
    fn into_matches(self) -> Vec<SymbolMatch> {
        self.quotes
            .into_iter()
            .filter_map(|m| {
                Some(SymbolMatch {
                    symbol: m.symbol?,
                    short_name: m.shortname,
                    exchange: m.exch_disp,
                    type_display: m.type_disp,
                })
            })
            .collect()
    }
}
