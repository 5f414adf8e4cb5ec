//! Operations routes
//!
//! Health check endpoint for monitoring. Does not require authentication.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::state::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Server status
    pub status: &'static str,
    /// Uptime in seconds
    pub uptime_secs: u64,
}

/// Operations routes (health)
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}

/// Health check endpoint
///
/// GET /health
///
/// Always returns 200 OK if the API is running.
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.uptime_secs(),
    })
}
