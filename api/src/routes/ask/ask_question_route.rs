//! POST /ask: answers a question over the documents in scope.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use contextor::{AskOptions, DocumentScope, QaAnswer};
use tracing::debug;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::{AppError, AppResult},
    routes::{
        ask::ask_request::{AskRequest, AskResponse},
        request_id,
    },
};

/// Handler: POST /ask
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8080/ask \
///   -H 'content-type: application/json' \
///   -d '{"question":"What do ribosomes do?","documents":[{"document_id":"d1","title":"Cells","chunks":[{"page":1,"text":"Ribosomes make proteins."}]}]}'
/// ```
pub async fn ask_question(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<AskRequest>,
) -> AppResult<Response> {
    let request_id = request_id(&headers);
    if body.question.trim().is_empty() {
        return Err(AppError::BadRequest("question must not be empty".into()));
    }

    debug!(
        target: "api::ask",
        request_id = %request_id,
        documents = body.documents.as_ref().map_or(0, Vec::len),
        images = body.images.len(),
        "ask: start"
    );

    let scope = match body.documents {
        Some(docs) => DocumentScope::Selected(docs),
        None => DocumentScope::All,
    };
    let opts = AskOptions {
        depth: body.depth.unwrap_or_default(),
        images: body.images,
    };

    let qa = state.contextor.ask(&body.question, &scope, &opts).await;
    let history = qa.history_pair(&body.question);
    let QaAnswer {
        answer,
        citations,
        used_general,
        intent,
    } = qa;

    debug!(
        target: "api::ask",
        request_id = %request_id,
        intent = ?intent,
        citations = citations.len(),
        "ask: done"
    );

    Ok(ApiResponse::success(AskResponse {
        answer,
        citations,
        used_general,
        intent,
        history,
    })
    .into_response_with_status(StatusCode::OK))
}
