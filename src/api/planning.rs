//! Financial planning API endpoint
//!
//! POST /api/financial-plan/rate - Interest rate needed to reach a target

use axum::{routing::post, Json, Router};
use finchat_core::{required_rate, SavingsPlan};
use serde::Serialize;

use super::ApiError;

/// Response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateResponse {
    /// Per-period rate in percent
    pub interest_rate: f64,
}

async fn rate(Json(plan): Json<SavingsPlan>) -> Result<Json<RateResponse>, ApiError> {
    let interest_rate = required_rate(&plan)?;
    Ok(Json(RateResponse { interest_rate }))
}

/// Create financial planning routes
pub fn planning_routes() -> Router {
    Router::new().route("/api/financial-plan/rate", post(rate))
}
