use ai_llm_service::error_handler::AiLlmError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use contextor::ContextorError;
use quiz_grader::QuizError;
use thiserror::Error;

use crate::core::http::response_envelope::{ApiErrorDetail, ApiResponse};

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error("missing required environment variable: {0}")]
    MissingEnv(&'static str),

    #[error(transparent)]
    Llm(#[from] AiLlmError),

    #[error(transparent)]
    Contextor(#[from] ContextorError),

    #[error(transparent)]
    Quiz(#[from] QuizError),

    // --- IO / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request ---
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Positions of submitted questions that failed validation.
    #[error("{} submitted question(s) failed validation", .0.len())]
    InvalidQuestions(Vec<usize>),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidQuestions(_) => StatusCode::UNPROCESSABLE_ENTITY,

            // startup-only
            AppError::MissingEnv(_)
            | AppError::Llm(_)
            | AppError::Contextor(_)
            | AppError::Quiz(_)
            | AppError::Bind(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::MissingEnv(_) => "MISSING_ENV",
            AppError::Llm(_) | AppError::Contextor(_) | AppError::Quiz(_) => "CONFIG_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::InvalidQuestions(_) => "INVALID_QUESTIONS",
        }
    }

    fn details(&self) -> Vec<ApiErrorDetail> {
        match self {
            AppError::InvalidQuestions(positions) => positions
                .iter()
                .map(|i| {
                    ApiErrorDetail::new(
                        Some(format!("questions[{i}]")),
                        Some(
                            "Needs a known type, question text, and either 4 options with \
                             answerIndex 0-3 (MCQ) or an expectedAnswer."
                                .into(),
                        ),
                    )
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        ApiResponse::<()>::error(self.error_code(), self.to_string(), self.details())
            .into_response_with_status(self.status_code())
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_errors_map_to_client_statuses() {
        assert_eq!(
            AppError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        let invalid = AppError::InvalidQuestions(vec![1, 3]);
        assert_eq!(invalid.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(invalid.error_code(), "INVALID_QUESTIONS");
        let paths: Vec<_> = invalid.details().into_iter().filter_map(|d| d.path).collect();
        assert_eq!(paths, ["questions[1]", "questions[3]"]);
        assert_eq!(invalid.to_string(), "2 submitted question(s) failed validation");
    }

    #[test]
    fn startup_errors_are_server_errors() {
        let e = AppError::MissingEnv("API_ADDRESS");
        assert_eq!(e.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.error_code(), "MISSING_ENV");
    }
}
