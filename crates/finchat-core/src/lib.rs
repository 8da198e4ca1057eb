//! finchat Core - request enrichment and generation pipeline
//!
//! This crate provides the chat pipeline behind every persona:
//! - Persona: closed set of chatbot personas and their prompt material
//! - Enricher: intent search (support) and live market data (stock)
//! - Orchestrator: primary LLM with retry, secondary fallback, titles
//! - Suggestions: follow-up prompt generation
//! - Planning: required interest rate solver
//! - Utils: retry with exponential backoff, fixed-window rate limiting

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod enricher;
pub mod error;
pub mod history;
pub mod orchestrator;
pub mod persona;
pub mod planning;
pub mod service;
pub mod suggestions;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use enricher::{ContextEnricher, EnricherConfig, EnrichmentResult};
pub use error::{Error, Result};
pub use history::{transcript, ConversationTurn, Sender};
pub use orchestrator::{Generation, GenerationConfig, GenerationOrchestrator, GenerationRequest};
pub use persona::{describe, Persona, PersonaDescriptor};
pub use planning::{required_rate, SavingsPlan};
pub use service::{ChatRequest, ChatResponse, ChatService};
pub use suggestions::{normalize_suggestions, SuggestionGenerator};
pub use utils::{retry_with_backoff, RateLimitConfig, RateLimitResult, RateLimiter, RetryConfig};
