use contextor::{AnswerDepth, ChatTurn, Intent};
use doc_rag::{Citation, DocumentChunks};
use serde::{Deserialize, Serialize};

/// Request payload for /ask.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// Natural language question.
    pub question: String,
    /// Documents in scope, already ownership-checked by the caller.
    #[serde(default)]
    pub documents: Option<Vec<DocumentChunks>>,
    #[serde(default)]
    pub depth: Option<AnswerDepth>,
    /// Image URLs or `data:` URIs.
    #[serde(default)]
    pub images: Vec<String>,
}

/// Response payload for /ask.
#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub citations: Vec<Citation>,
    pub used_general: bool,
    pub intent: Intent,
    /// `(user, assistant)` turns for the chat-history store.
    pub history: [ChatTurn; 2],
}
