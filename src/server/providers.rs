//! Provider wiring
//!
//! Builds every remote client from configuration and assembles the chat
//! pipeline on top of them.

use super::config::{AppConfig, Credentials};
use anyhow::{Context, Result};
use finchat_core::{
    ChatService, ContextEnricher, EnricherConfig, GenerationConfig, GenerationOrchestrator,
    RetryConfig, SuggestionGenerator,
};
use finchat_llm::{GeminiConfig, GeminiProvider, OpenAiConfig, OpenAiProvider, SharedLlmProvider};
use finchat_market::{
    HuggingFaceSentiment, MarketConfig, MarketDataClient, SentimentConfig, TtlCache, YahooConfig,
    YahooFinance,
};
use finchat_search::{EmbeddingConfig, HuggingFaceEmbedder, MilvusConfig, MilvusSearchClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Primary and secondary completion providers
pub fn resolve_llm_providers(
    config: &AppConfig,
    creds: &Credentials,
) -> Result<(SharedLlmProvider, SharedLlmProvider)> {
    let llm = &config.llm;

    let openai = OpenAiConfig::new(creds.openai_api_key.clone())
        .with_model(llm.openai.model.clone())
        .with_timeout(llm.timeout());
    let primary: SharedLlmProvider =
        Arc::new(OpenAiProvider::new(openai).context("Failed to create OpenAI provider")?);
    info!(model = %llm.openai.model, "Registered OpenAI provider (primary)");

    let gemini = GeminiConfig::new(creds.gemini_api_key.clone())
        .with_model(llm.gemini.model.clone())
        .with_max_tokens(llm.max_tokens)
        .with_timeout(llm.timeout());
    let secondary: SharedLlmProvider =
        Arc::new(GeminiProvider::new(gemini).context("Failed to create Gemini provider")?);
    info!(model = %llm.gemini.model, "Registered Gemini provider (fallback)");

    Ok((primary, secondary))
}

/// Quotes, history, news sentiment and symbol search over Yahoo Finance
pub fn build_market_client(config: &AppConfig, creds: &Credentials) -> Result<Arc<MarketDataClient>> {
    let market = &config.market;
    let ttl = Duration::from_secs(market.cache_ttl_secs);
    let timeout = Duration::from_secs(market.timeout_secs);

    let yahoo = YahooFinance::new(YahooConfig {
        news_limit: market.news_limit,
        timeout,
        ..YahooConfig::default()
    })
    .context("Failed to create Yahoo Finance client")?;

    let sentiment_cache = Arc::new(TtlCache::new(ttl, market.cache_capacity));
    let mut sentiment_config =
        SentimentConfig::new(creds.huggingface_api_token.clone()).with_url(market.sentiment_url.clone());
    sentiment_config.timeout = timeout;
    let scorer = HuggingFaceSentiment::new(sentiment_config, sentiment_cache)
        .context("Failed to create sentiment scorer")?;

    Ok(Arc::new(MarketDataClient::new(
        Arc::new(yahoo),
        Arc::new(scorer),
        MarketConfig {
            cache_ttl: ttl,
            cache_capacity: market.cache_capacity,
            news_limit: market.news_limit,
        },
    )))
}

/// Full chat pipeline
pub fn build_chat_service(config: &AppConfig, creds: &Credentials) -> Result<ChatService> {
    let search = &config.search;
    let search_timeout = Duration::from_secs(search.timeout_secs);

    let mut embedding = EmbeddingConfig::new(creds.huggingface_api_token.clone())
        .with_url(search.embedding_url.clone())
        .with_timeout(search_timeout);
    embedding.dimensions = search.dimensions;
    let embedder = HuggingFaceEmbedder::new(embedding).context("Failed to create embedding client")?;

    let mut milvus = MilvusConfig::new(creds.milvus_address.clone(), creds.milvus_token.clone())
        .with_collection(search.collection.clone())
        .with_top_k(search.top_k)
        .with_nprobe(search.nprobe);
    milvus.dimensions = search.dimensions;
    milvus.timeout = search_timeout;
    let milvus = MilvusSearchClient::new(milvus).context("Failed to create Milvus client")?;
    info!(collection = %search.collection, "Intent search configured");

    let market = build_market_client(config, creds)?;
    let (primary, secondary) = resolve_llm_providers(config, creds)?;

    let enricher = ContextEnricher::new(
        Arc::new(embedder),
        Arc::new(milvus),
        market,
        EnricherConfig {
            history_period: config.market.history_period.clone(),
            history_interval: config.market.history_interval.clone(),
        },
    );

    let llm = &config.llm;
    let orchestrator = GenerationOrchestrator::new(
        primary.clone(),
        secondary,
        GenerationConfig {
            retry: RetryConfig::new()
                .with_max_retries(llm.max_retries)
                .with_initial_delay(Duration::from_millis(llm.initial_delay_ms)),
            max_tokens: llm.max_tokens,
            temperature: llm.temperature,
            title_max_tokens: llm.title_max_tokens,
        },
    );

    let suggestions = SuggestionGenerator::new(primary)
        .with_max_tokens(llm.suggestion_max_tokens)
        .with_temperature(llm.suggestion_temperature);

    Ok(ChatService::new(enricher, orchestrator, suggestions))
}
