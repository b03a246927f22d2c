use doc_rag::DocumentChunks;
use quiz_grader::{Question, QuizCounts, UserAnswer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request payload for /quiz/score.
#[derive(Debug, Deserialize)]
pub struct ScoreQuizRequest {
    /// Questions as previously generated; validated again before scoring.
    pub questions: Vec<Value>,
    /// Answers parallel to `questions`: option index, text or null.
    #[serde(default)]
    pub answers: Vec<UserAnswer>,
}

/// Request payload for /quiz/generate.
#[derive(Debug, Deserialize)]
pub struct GenerateQuizRequest {
    pub document: DocumentChunks,
    pub counts: QuizCounts,
}

/// Response payload for /quiz/generate.
#[derive(Debug, Serialize)]
pub struct GenerateQuizResponse {
    pub questions: Vec<Question>,
}
