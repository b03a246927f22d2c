//! `{success, data?, error?}` body shared by every route and by the
//! rejection mapper, so clients parse one shape for answers, quizzes and
//! failures alike.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    /// `SCREAMING_SNAKE` code, e.g. `INVALID_QUESTIONS`.
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ApiErrorDetail>,
}

/// Points at the offending request field (`answers`, `questions[2]`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiErrorDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ApiErrorDetail {
    pub fn new(path: Option<String>, hint: Option<String>) -> Self {
        Self { path, hint }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(
        code: &'static str,
        message: impl Into<String>,
        details: Vec<ApiErrorDetail>,
    ) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
                details,
            }),
        }
    }

    pub fn into_response_with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn success_omits_error() {
        let v = serde_json::to_value(ApiResponse::success(json!({"score": 3}))).unwrap();
        assert_eq!(v, json!({"success": true, "data": {"score": 3}}));
    }

    #[test]
    fn error_omits_data_and_empty_fields() {
        let v = serde_json::to_value(ApiResponse::<()>::error(
            "INVALID_QUESTIONS",
            "2 invalid questions",
            vec![ApiErrorDetail::new(Some("questions[1]".into()), None)],
        ))
        .unwrap();
        assert_eq!(
            v,
            json!({
                "success": false,
                "error": {
                    "code": "INVALID_QUESTIONS",
                    "message": "2 invalid questions",
                    "details": [{"path": "questions[1]"}]
                }
            })
        );

        let bare = serde_json::to_value(ApiResponse::<()>::error("BAD_REQUEST", "no", vec![])).unwrap();
        assert!(bare["error"].get("details").is_none());
    }
}
