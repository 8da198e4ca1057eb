//! Server configuration types
//!
//! File-backed settings live in [`AppConfig`]; provider credentials come
//! from the conventional environment variables and live in [`Credentials`].

use crate::middleware::rate_limit::RateLimitSettings;
use anyhow::{bail, Result};
use finchat_llm::util::mask_api_key;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub search: SearchConfig,
    pub market: MarketSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
}

/// Generation settings shared by both providers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_tokens: u32,
    pub temperature: f32,
    pub title_max_tokens: u32,
    pub suggestion_max_tokens: u32,
    pub suggestion_temperature: f32,
    pub timeout_secs: u64,
    pub openai: ModelConfig,
    pub gemini: ModelConfig,
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Per-provider model choice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub model: String,
}

/// Embedding and intent search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub collection: String,
    pub top_k: usize,
    pub nprobe: u32,
    pub dimensions: usize,
    pub embedding_url: String,
    pub timeout_secs: u64,
}

/// Market data, cache and sentiment settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSettings {
    pub cache_ttl_secs: u64,
    pub cache_capacity: usize,
    pub news_limit: usize,
    pub history_period: String,
    pub history_interval: String,
    pub sentiment_url: String,
    pub timeout_secs: u64,
}

/// Log output settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of the human format
    #[serde(default)]
    pub json: bool,
    /// Extra file receiving `ERROR` events only
    #[serde(default)]
    pub error_file: Option<String>,
}

/// Environment variables every deployment must provide
pub const REQUIRED_ENV_VARS: &[&str] = &[
    "OPENAI_API_KEY",
    "GEMINI_API_KEY",
    "MILVUS_ADDRESS",
    "MILVUS_TOKEN",
    "HUGGINGFACE_API_TOKEN",
];

/// Provider credentials
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub openai_api_key: String,
    pub gemini_api_key: String,
    pub milvus_address: String,
    pub milvus_token: String,
    pub huggingface_api_token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("openai_api_key", &mask_api_key(&self.openai_api_key))
            .field("gemini_api_key", &mask_api_key(&self.gemini_api_key))
            .field("milvus_address", &self.milvus_address)
            .field("milvus_token", &mask_api_key(&self.milvus_token))
            .field(
                "huggingface_api_token",
                &mask_api_key(&self.huggingface_api_token),
            )
            .finish()
    }
}

impl Credentials {
    /// Read credentials from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read credentials through `lookup`, naming every missing variable on failure
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let missing: Vec<&str> = REQUIRED_ENV_VARS
            .iter()
            .copied()
            .filter(|name| value(name).is_none())
            .collect();
        if !missing.is_empty() {
            bail!(
                "Missing required environment variables: {}",
                missing.join(", ")
            );
        }

        let get = |name: &str| value(name).unwrap_or_default();
        Ok(Self {
            openai_api_key: get("OPENAI_API_KEY"),
            gemini_api_key: get("GEMINI_API_KEY"),
            milvus_address: get("MILVUS_ADDRESS"),
            milvus_token: get("MILVUS_TOKEN"),
            huggingface_api_token: get("HUGGINGFACE_API_TOKEN"),
        })
    }

    /// Copy with every secret masked, for display
    pub fn masked(&self) -> Self {
        Self {
            openai_api_key: mask_api_key(&self.openai_api_key),
            gemini_api_key: mask_api_key(&self.gemini_api_key),
            milvus_address: self.milvus_address.clone(),
            milvus_token: mask_api_key(&self.milvus_token),
            huggingface_api_token: mask_api_key(&self.huggingface_api_token),
        }
    }
}
