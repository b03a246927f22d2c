//! GET /health: provider reachability.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Response};

use crate::core::{app_state::AppState, http::response_envelope::ApiResponse};

/// Always 200; per-provider `ok` flags carry the result.
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let statuses = state.llm_profiles.health_all().await;
    ApiResponse::success(statuses).into_response_with_status(StatusCode::OK)
}
