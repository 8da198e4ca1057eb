//! Web API module for finchat
//!
//! Provides REST API endpoints for:
//! - Chat answers per persona
//! - Suggested follow-up prompts
//! - Required interest rate for a savings plan
//! - Health checks

pub mod chat;
pub mod health;
pub mod planning;
pub mod suggestions;

#[cfg(test)]
mod tests;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use finchat_core::Persona;
use serde::Serialize;
use tracing::error;

pub use chat::chat_routes;
pub use health::health_routes;
pub use planning::planning_routes;
pub use suggestions::suggestions_routes;

/// Shown when the persona tag is missing
pub const CHATBOT_REQUIRED: &str = "Chatbot type is required.";

/// Shown for failures the caller cannot act on
pub const GENERIC_ERROR: &str = "An unexpected error occurred. Please try again later.";

/// Create the API router with all endpoints
pub fn api_router() -> Router {
    Router::new()
        .merge(chat_routes())
        .merge(suggestions_routes())
        .merge(planning_routes())
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Handler failure mapped onto a status code
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<finchat_core::Error> for ApiError {
    fn from(err: finchat_core::Error) -> Self {
        if err.is_client_error() {
            return ApiError::BadRequest(err.user_message());
        }
        error!(error = %err, "Request failed");
        let message = err.user_message();
        if message.is_empty() {
            ApiError::Internal(GENERIC_ERROR.to_string())
        } else {
            ApiError::Internal(message)
        }
    }
}

/// Resolve the `chatbot` field, rejecting a missing or blank tag
pub fn require_persona(chatbot: Option<&str>) -> Result<Persona, ApiError> {
    match chatbot.map(str::trim) {
        Some(tag) if !tag.is_empty() => Ok(Persona::from_tag(tag)),
        _ => Err(ApiError::BadRequest(CHATBOT_REQUIRED.to_string())),
    }
}
