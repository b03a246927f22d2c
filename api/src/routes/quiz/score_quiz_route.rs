//! POST /quiz/score: grades a submitted attempt.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use quiz_grader::{Question, QuestionWire};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::{AppError, AppResult},
    routes::{quiz::quiz_request::ScoreQuizRequest, request_id},
};

/// Validates every submitted question, keeping positions aligned with answers.
fn validate_all(raw: Vec<Value>) -> Result<Vec<Question>, AppError> {
    let mut questions = Vec::with_capacity(raw.len());
    let mut invalid = Vec::new();
    for (i, item) in raw.into_iter().enumerate() {
        match serde_json::from_value::<QuestionWire>(item)
            .ok()
            .and_then(|w| w.validate(i))
        {
            Some(q) => questions.push(q),
            None => invalid.push(i),
        }
    }
    if invalid.is_empty() {
        Ok(questions)
    } else {
        Err(AppError::InvalidQuestions(invalid))
    }
}

/// Handler: POST /quiz/score
pub async fn score_quiz(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ScoreQuizRequest>,
) -> AppResult<Response> {
    let request_id = request_id(&headers);
    if body.questions.is_empty() {
        return Err(AppError::BadRequest("questions must not be empty".into()));
    }

    let questions = validate_all(body.questions).inspect_err(|e| {
        warn!(target: "api::quiz", request_id = %request_id, error = %e, "score: rejected");
    })?;
    debug!(
        target: "api::quiz",
        request_id = %request_id,
        questions = questions.len(),
        answers = body.answers.len(),
        "score: start"
    );

    let attempt = state.scorer.score(&questions, &body.answers).await;
    Ok(ApiResponse::success(attempt).into_response_with_status(StatusCode::OK))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn reports_every_invalid_position() {
        let raw = vec![
            json!({"type": "MCQ", "question": "ok", "options": ["a","b","c","d"], "answerIndex": 0}),
            json!({"type": "ESSAY", "question": "bad", "expectedAnswer": "x"}),
            json!({"type": "SAQ", "question": "ok", "expectedAnswer": "y"}),
            json!("not an object"),
        ];
        match validate_all(raw) {
            Err(AppError::InvalidQuestions(pos)) => assert_eq!(pos, vec![1, 3]),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
