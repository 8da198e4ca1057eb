//! Suggested prompts API endpoint
//!
//! POST /api/suggested-prompts - Follow-up questions for a conversation

use axum::{routing::post, Extension, Json, Router};
use finchat_core::ChatService;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{require_persona, ApiError};

/// Request body for `/api/suggested-prompts`
#[derive(Debug, Default, Deserialize)]
pub struct SuggestionsBody {
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub chatbot: Option<String>,
}

/// Response body
#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub prompts: Vec<String>,
}

async fn suggested_prompts(
    Extension(service): Extension<Arc<ChatService>>,
    Json(body): Json<SuggestionsBody>,
) -> Result<Json<SuggestionsResponse>, ApiError> {
    let persona = require_persona(body.chatbot.as_deref())?;
    let prompts = service.suggest(&body.context, persona).await;
    Ok(Json(SuggestionsResponse { prompts }))
}

/// Create suggested prompt routes
pub fn suggestions_routes() -> Router {
    Router::new().route("/api/suggested-prompts", post(suggested_prompts))
}
