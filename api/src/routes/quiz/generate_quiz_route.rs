//! POST /quiz/generate: builds a quiz from one document.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use tracing::debug;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::{AppError, AppResult},
    routes::{
        quiz::quiz_request::{GenerateQuizRequest, GenerateQuizResponse},
        request_id,
    },
};

/// Handler: POST /quiz/generate
///
/// An empty `questions` list means the model produced nothing usable.
pub async fn generate_quiz(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<GenerateQuizRequest>,
) -> AppResult<Response> {
    let request_id = request_id(&headers);
    if body.counts.total() == 0 {
        return Err(AppError::BadRequest(
            "counts must request at least one question".into(),
        ));
    }

    let questions = state
        .quiz_generator
        .generate(&body.document, &body.counts)
        .await;
    debug!(
        target: "api::quiz",
        request_id = %request_id,
        document = %body.document.document_id,
        produced = questions.len(),
        "generate: done"
    );

    Ok(ApiResponse::success(GenerateQuizResponse { questions })
        .into_response_with_status(StatusCode::OK))
}
