//! Generation orchestrator
//!
//! Renders the persona prompt, asks the primary provider with retry, and
//! falls back once to the secondary provider when every primary attempt
//! fails. Titles are a separate, best-effort primary call.

use crate::error::{Error, Result};
use crate::persona::Persona;
use crate::utils::{retry_with_backoff, RetryConfig};
use finchat_llm::{CompletionRequest, SharedLlmProvider};
use tracing::{info, instrument, warn};

/// System message for title generation
pub const TITLE_SYSTEM_PROMPT: &str = "You are a helpful assistant that generates conversation titles.";

/// Title used whenever title generation fails
pub const FALLBACK_TITLE: &str = "New Chat";

/// Generation tuning
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Primary retry schedule
    pub retry: RetryConfig,
    /// Response token cap
    pub max_tokens: u32,
    /// Response temperature
    pub temperature: f32,
    /// Title token cap
    pub title_max_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            max_tokens: 150,
            temperature: 0.7,
            title_max_tokens: 50,
        }
    }
}

/// Inputs for one generation
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    /// Raw user prompt
    pub prompt: &'a str,
    /// Transcript, possibly with enrichment appended
    pub history: &'a str,
    /// Intentions line, empty when none
    pub intentions: &'a str,
    /// Whether to generate a title
    pub want_title: bool,
    /// Persona
    pub persona: Persona,
    /// Required interest rate in percent (financial planning only)
    pub interest_rate: Option<f64>,
}

/// Generated answer and optional title
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    /// Answer text, trimmed
    pub response: String,
    /// Title, only on the primary path when requested
    pub title: Option<String>,
}

/// Primary-with-fallback response generation
pub struct GenerationOrchestrator {
    primary: SharedLlmProvider,
    secondary: SharedLlmProvider,
    config: GenerationConfig,
}

impl GenerationOrchestrator {
    /// Create an orchestrator
    #[must_use]
    pub fn new(primary: SharedLlmProvider, secondary: SharedLlmProvider, config: GenerationConfig) -> Self {
        Self {
            primary,
            secondary,
            config,
        }
    }

    /// Generate a response (and optionally a title)
    ///
    /// # Errors
    /// `BothProvidersFailed` when the primary exhausts its retries and the
    /// secondary also fails
    #[instrument(skip_all, fields(persona = %request.persona, want_title = request.want_title))]
    pub async fn generate(&self, request: GenerationRequest<'_>) -> Result<Generation> {
        let descriptor = request.persona.descriptor();
        let base_prompt = descriptor.render_response(request.prompt, request.history, request.intentions);

        let mut user_prompt = base_prompt.clone();
        if let (Persona::FinancialPlanning, Some(rate)) = (request.persona, request.interest_rate) {
            user_prompt.push_str(&interest_rate_line(rate));
        }

        let completion = CompletionRequest::chat(descriptor.system_message(), user_prompt)
            .with_max_tokens(self.config.max_tokens)
            .with_temperature(self.config.temperature);

        let primary = retry_with_backoff(&self.config.retry, || self.primary.complete(completion.clone())).await;

        match primary {
            Ok(reply) => {
                let title = if request.want_title {
                    Some(self.title(request.prompt, request.persona).await)
                } else {
                    None
                };
                Ok(Generation {
                    response: reply.content.trim().to_string(),
                    title,
                })
            }
            Err(primary_err) => {
                warn!(
                    primary = self.primary.name(),
                    secondary = self.secondary.name(),
                    error = %primary_err,
                    "Primary provider failed, falling back"
                );
                match self.secondary.complete(CompletionRequest::single_prompt(base_prompt)).await {
                    Ok(reply) => {
                        info!(provider = self.secondary.name(), "Fallback provider answered");
                        Ok(Generation {
                            response: reply.content.trim().to_string(),
                            title: None,
                        })
                    }
                    Err(secondary_err) => Err(Error::BothProvidersFailed {
                        primary_provider: self.primary.name().to_string(),
                        secondary_provider: self.secondary.name().to_string(),
                        primary: primary_err,
                        secondary: secondary_err,
                    }),
                }
            }
        }
    }

    /// Best-effort title for `prompt`; never fails
    pub async fn title(&self, prompt: &str, persona: Persona) -> String {
        let request = CompletionRequest::chat(TITLE_SYSTEM_PROMPT, persona.descriptor().render_title(prompt))
            .with_max_tokens(self.config.title_max_tokens);

        match self.primary.complete(request).await {
            Ok(reply) if !reply.content.trim().is_empty() => reply.content.trim().to_string(),
            Ok(_) => FALLBACK_TITLE.to_string(),
            Err(e) => {
                warn!(error = %e, "Title generation failed");
                FALLBACK_TITLE.to_string()
            }
        }
    }
}

/// Line appended to financial-planning prompts
#[must_use]
pub fn interest_rate_line(rate: f64) -> String {
    format!("\n\nCalculated Required Interest Rate: {:.2}%", rate)
}

#[cfg(test)]
mod tests;
