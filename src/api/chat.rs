//! Chat API endpoint
//!
//! POST /api/chat - Answer a prompt as the selected persona

use axum::{routing::post, Extension, Json, Router};
use finchat_core::{transcript, ChatRequest, ChatResponse, ChatService, ConversationTurn};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use super::{require_persona, ApiError};

/// Request body for `/api/chat`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatBody {
    #[serde(default)]
    pub prompt: String,
    /// Pre-flattened transcript
    #[serde(default)]
    pub context: Option<String>,
    /// Structured turns, used when `context` is absent
    #[serde(default)]
    pub history: Vec<ConversationTurn>,
    #[serde(default)]
    pub generate_title: bool,
    #[serde(default)]
    pub chatbot: Option<String>,
    /// Required interest rate in percent
    #[serde(default)]
    pub interest_rate: Option<f64>,
}

impl ChatBody {
    fn context(&self) -> String {
        match &self.context {
            Some(context) => context.clone(),
            None => transcript(&self.history),
        }
    }
}

async fn chat(
    Extension(service): Extension<Arc<ChatService>>,
    Json(body): Json<ChatBody>,
) -> Result<Json<ChatResponse>, ApiError> {
    let persona = require_persona(body.chatbot.as_deref())?;
    debug!(persona = %persona, title = body.generate_title, "Received chat request");

    let request = ChatRequest {
        prompt: body.prompt.clone(),
        context: body.context(),
        generate_title: body.generate_title,
        persona,
        interest_rate: body.interest_rate,
    };

    let response = service.chat(&request).await?;
    Ok(Json(response))
}

/// Create chat routes
pub fn chat_routes() -> Router {
    Router::new().route("/api/chat", post(chat))
}
