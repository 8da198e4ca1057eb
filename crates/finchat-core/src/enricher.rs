//! Context enrichment
//!
//! Support requests are embedded and matched against the intent index.
//! Stock requests get a quote, the latest bar and news sentiment for every
//! ticker mentioned in the prompt that the conversation has not already
//! shown. Other personas pass through untouched.

use crate::error::Result;
use crate::persona::Persona;
use finchat_market::{DailyBar, MarketDataClient, RealTimeQuote, StockSentimentRecord};
use finchat_search::{EmbeddingProvider, SimilaritySearch};
use futures::future::join_all;
use regex::Regex;
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info, warn};

/// Uppercase ticker-like tokens, optionally with an exchange suffix (`BRK.B`).
/// Ordinary capitalised words such as `I` or `CEO` also match.
static SYMBOL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Z]{1,5}(?:\.[A-Z]{1,4})?\b").expect("SYMBOL_REGEX is a compile-time constant")
});

/// Per-request enrichment output
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichmentResult {
    /// `Relevant intentions: ...` line for support requests
    pub intentions: Option<String>,
    /// Combined stock blocks for stock requests
    pub market_text: Option<String>,
    /// Transcript with any stock blocks appended
    pub updated_history: String,
}

impl EnrichmentResult {
    /// Unchanged transcript, nothing added
    #[must_use]
    pub fn passthrough(history: &str) -> Self {
        Self {
            updated_history: history.to_string(),
            ..Self::default()
        }
    }

    /// Intentions text, empty when none
    #[must_use]
    pub fn intentions_text(&self) -> &str {
        self.intentions.as_deref().unwrap_or("")
    }
}

/// Source settings for stock blocks
#[derive(Debug, Clone)]
pub struct EnricherConfig {
    /// History period passed to the market client
    pub history_period: String,
    /// History interval passed to the market client
    pub history_interval: String,
}

impl Default for EnricherConfig {
    fn default() -> Self {
        Self {
            history_period: "1mo".to_string(),
            history_interval: "1d".to_string(),
        }
    }
}

/// Gathers supporting context ahead of generation
pub struct ContextEnricher {
    embedder: Arc<dyn EmbeddingProvider>,
    search: Arc<dyn SimilaritySearch>,
    market: Arc<MarketDataClient>,
    config: EnricherConfig,
}

impl ContextEnricher {
    /// Create an enricher
    #[must_use]
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        search: Arc<dyn SimilaritySearch>,
        market: Arc<MarketDataClient>,
        config: EnricherConfig,
    ) -> Self {
        Self {
            embedder,
            search,
            market,
            config,
        }
    }

    /// Enrich `prompt` for `persona` given the visible transcript
    ///
    /// # Errors
    /// Support requests fail when embedding or search fails. The stock path
    /// never fails; unavailable symbols become apology lines.
    pub async fn enrich(&self, persona: Persona, prompt: &str, history: &str) -> Result<EnrichmentResult> {
        let descriptor = persona.descriptor();
        if descriptor.requires_semantic_context {
            return self.intentions(prompt, history).await;
        }
        if descriptor.requires_market_context {
            return Ok(self.market_context(prompt, history).await);
        }
        Ok(EnrichmentResult::passthrough(history))
    }

    async fn intentions(&self, prompt: &str, history: &str) -> Result<EnrichmentResult> {
        let vector = self.embedder.embed(prompt).await?;
        let ids = self.search.search(&vector).await?;
        debug!(matches = ids.len(), "Matched intents");

        Ok(EnrichmentResult {
            intentions: Some(format!("Relevant intentions: {}", ids.join(", "))),
            ..EnrichmentResult::passthrough(history)
        })
    }

    async fn market_context(&self, prompt: &str, history: &str) -> EnrichmentResult {
        let pending: Vec<String> = extract_symbols(prompt)
            .into_iter()
            .filter(|symbol| {
                let shown = already_shown(symbol, history);
                if shown {
                    debug!(symbol = %symbol, "Stock data already in conversation");
                }
                !shown
            })
            .collect();

        if pending.is_empty() {
            return EnrichmentResult::passthrough(history);
        }

        info!(symbols = ?pending, "Fetching stock data");
        let blocks = join_all(pending.iter().map(|symbol| self.stock_block(symbol))).await;
        let combined = blocks.join("\n\n");

        EnrichmentResult {
            intentions: None,
            updated_history: format!("{}\n{}", history, combined),
            market_text: Some(combined),
        }
    }

    async fn stock_block(&self, symbol: &str) -> String {
        let (quote, bars, sentiment) = tokio::join!(
            self.market.quote(symbol),
            self.market.history(symbol, &self.config.history_period, &self.config.history_interval),
            self.market.news_sentiment(symbol),
        );

        let block = quote.and_then(|quote| bars.map(|bars| (quote, bars)));
        match block {
            Ok((quote, bars)) => match bars.first() {
                Some(latest) => format!(
                    "{}\n{}",
                    format_quote(symbol, &quote, latest),
                    format_sentiment(&sentiment)
                ),
                None => apology(symbol),
            },
            Err(e) => {
                warn!(symbol, error = %e, "Stock data unavailable");
                apology(symbol)
            }
        }
    }
}

/// Distinct ticker candidates in order of first appearance
#[must_use]
pub fn extract_symbols(prompt: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    SYMBOL_REGEX
        .find_iter(prompt)
        .map(|m| m.as_str())
        .filter(|symbol| seen.insert(*symbol))
        .map(str::to_string)
        .collect()
}

/// Header line identifying a stock block for `symbol`
#[must_use]
pub fn quote_header(symbol: &str) -> String {
    format!("Real-Time Stock Quote for {}:", symbol)
}

/// Whether the transcript already contains a stock block for `symbol`
#[must_use]
pub fn already_shown(symbol: &str, history: &str) -> bool {
    history.contains(&quote_header(symbol))
}

/// Quote plus latest-bar block
#[must_use]
pub fn format_quote(symbol: &str, quote: &RealTimeQuote, latest: &DailyBar) -> String {
    format!(
        "**{}**\n\
         - **Price:** ${:.2}\n\
         - **Change:** {:.2} ({:.2}%)\n\
         - **Last Trading Day:** {}\n\
         - **Open:** ${:.2}\n\
         - **High:** ${:.2}\n\
         - **Low:** ${:.2}\n\
         - **Close:** ${:.2}\n\
         - **Volume:** {}",
        quote_header(symbol),
        quote.price,
        quote.change,
        quote.change_percent,
        latest.date.format("%Y-%m-%d"),
        latest.open,
        latest.high,
        latest.low,
        latest.close,
        group_thousands(latest.volume),
    )
}

/// Aggregate news sentiment block
#[must_use]
pub fn format_sentiment(record: &StockSentimentRecord) -> String {
    if !record.has_articles() {
        return "No recent news sentiment data available for this stock.".to_string();
    }
    format!(
        "**News Sentiment for {}:**\n\
         - **Average Sentiment Score:** {:.2} ({})\n\
         - **Number of Articles Analyzed:** {}",
        record.symbol,
        record.average_score,
        record.average_label,
        record.articles.len()
    )
}

fn apology(symbol: &str) -> String {
    format!(
        "Sorry, I couldn't retrieve complete data for the stock symbol \"{}\". Please ensure it's correct and try again.",
        symbol
    )
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
