//! Public API types re-used by external crates (e.g., the HTTP API layer).

use doc_rag::{Citation, DocumentChunks};
use serde::{Deserialize, Serialize};

/// Requested answer length.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnswerDepth {
    #[default]
    Standard,
    InDepth,
}

/// Which documents a question is asked against.
///
/// `All` (or an empty selection) means no specific document is in scope.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DocumentScope {
    #[default]
    All,
    Selected(Vec<DocumentChunks>),
}

impl DocumentScope {
    /// The selected documents, or `None` when nothing specific is in scope.
    pub fn documents(&self) -> Option<&[DocumentChunks]> {
        match self {
            DocumentScope::Selected(docs) if !docs.is_empty() => Some(docs),
            _ => None,
        }
    }
}

/// Per-question options.
///
/// # Example
/// ```
/// use contextor::{AnswerDepth, AskOptions};
/// let opts = AskOptions { depth: AnswerDepth::InDepth, images: vec![] };
/// assert_eq!(opts.depth, AnswerDepth::InDepth);
/// ```
#[derive(Clone, Debug, Default)]
pub struct AskOptions {
    pub depth: AnswerDepth,
    /// Image URLs or `data:` URIs attached to the question.
    pub images: Vec<String>,
}

/// Prompt branch chosen for a question.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    /// No document in scope.
    General,
    /// A document was in scope but retrieval found nothing usable.
    GeneralWithDocument,
    ExplainCode,
    DocumentOverview,
    Summarize,
    GroundedQa,
}

impl Intent {
    /// Whether the answer is built on retrieved document context.
    pub fn is_grounded(self) -> bool {
        matches!(
            self,
            Intent::ExplainCode | Intent::DocumentOverview | Intent::Summarize | Intent::GroundedQa
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One message for the external chat-history store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

/// Final answer with its sources.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QaAnswer {
    pub answer: String,
    pub citations: Vec<Citation>,
    /// The answer relies on general knowledge rather than the document.
    pub used_general: bool,
    pub intent: Intent,
}

impl QaAnswer {
    /// `(user, assistant)` turns to append to the chat history.
    pub fn history_pair(&self, question: &str) -> [ChatTurn; 2] {
        [
            ChatTurn {
                role: ChatRole::User,
                text: question.to_string(),
                citations: Vec::new(),
            },
            ChatTurn {
                role: ChatRole::Assistant,
                text: self.answer.clone(),
                citations: self.citations.clone(),
            },
        ]
    }
}
