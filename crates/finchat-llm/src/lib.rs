//! finchat LLM - chat completion provider abstraction
//!
//! This crate provides the language-model seam for finchat:
//! - `LlmProvider`: the trait both chat providers implement
//! - OpenAI: primary provider (async-openai)
//! - Gemini: secondary provider, single combined prompt (reqwest)
//! - `MockProvider`: scripted provider for tests

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod completion;
pub mod error;
pub mod gemini;
pub mod message;
pub mod mock;
pub mod openai;
pub mod provider;
pub mod util;

pub use completion::{CompletionRequest, CompletionResponse, TokenUsage};
pub use error::{Error, Result};
pub use gemini::{GeminiConfig, GeminiProvider};
pub use message::{Message, MessageRole};
pub use mock::MockProvider;
pub use openai::{OpenAiConfig, OpenAiProvider};
pub use provider::{LlmProvider, SharedLlmProvider};
