//! Follow-up prompt suggestions
//!
//! One primary call, no retry and no fallback. Any failure yields an empty
//! list.

use crate::persona::Persona;
use finchat_llm::{CompletionRequest, SharedLlmProvider};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// System message for suggestion generation
pub const SUGGESTION_SYSTEM_PROMPT: &str =
    "You are an assistant that suggests helpful prompts to users in a chat.";

/// Most suggestions returned
pub const MAX_SUGGESTIONS: usize = 5;

/// Leading list markers: `1.`, `2)`, `-`, `*`, `•`
static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d+[.)]|[-*•])\s*").expect("LIST_MARKER is a compile-time constant")
});

/// Suggests follow-up prompts from a transcript
pub struct SuggestionGenerator {
    provider: SharedLlmProvider,
    max_tokens: u32,
    temperature: f32,
}

impl SuggestionGenerator {
    /// Create a generator over the primary provider
    #[must_use]
    pub fn new(provider: SharedLlmProvider) -> Self {
        Self {
            provider,
            max_tokens: 150,
            temperature: 0.7,
        }
    }

    /// Override the token cap
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Override the temperature
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Up to five suggestions; empty on any failure
    pub async fn suggest(&self, history: &str, persona: Persona) -> Vec<String> {
        let request = CompletionRequest::chat(
            SUGGESTION_SYSTEM_PROMPT,
            persona.descriptor().render_suggestions(history),
        )
        .with_max_tokens(self.max_tokens)
        .with_temperature(self.temperature);

        match self.provider.complete(request).await {
            Ok(reply) => {
                let prompts = normalize_suggestions(&reply.content);
                debug!(count = prompts.len(), "Suggested prompts");
                prompts
            }
            Err(e) => {
                warn!(error = %e, "Suggestion generation failed");
                Vec::new()
            }
        }
    }
}

/// Split model output into clean standalone prompts
#[must_use]
pub fn normalize_suggestions(raw: &str) -> Vec<String> {
    raw.lines()
        .map(clean_line)
        .filter(|line| !line.is_empty())
        .take(MAX_SUGGESTIONS)
        .collect()
}

fn clean_line(line: &str) -> String {
    let line = line.trim();
    let line = LIST_MARKER.replace(line, "");
    line.trim()
        .trim_matches(|c| matches!(c, '"' | '\'' | '\u{201c}' | '\u{201d}'))
        .trim()
        .to_string()
}
