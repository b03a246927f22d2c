use serde::{Deserialize, Serialize};

use crate::structs::chunk::RetrievalCandidate;

/// A run of adjacent chunks of one document collapsed into a single block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedPassage {
    pub document_id: String,
    pub title: String,
    /// Inclusive chunk index range.
    pub start_index: usize,
    pub end_index: usize,
    pub start_page: u32,
    pub end_page: u32,
    /// Chunk texts joined in chunk order.
    pub text: String,
    /// Best combined score among the merged chunks.
    pub score: f32,
}

impl From<&RetrievalCandidate> for MergedPassage {
    fn from(c: &RetrievalCandidate) -> Self {
        Self {
            document_id: c.chunk_ref.document_id.clone(),
            title: c.chunk_ref.title.clone(),
            start_index: c.chunk_ref.chunk_index,
            end_index: c.chunk_ref.chunk_index,
            start_page: c.chunk_ref.page,
            end_page: c.chunk_ref.page,
            text: c.text.clone(),
            score: c.combined_score,
        }
    }
}

/// Source reference shown next to an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub document_id: String,
    pub title: String,
    pub page: u32,
    /// At most 200 characters of the cited chunk.
    pub snippet: String,
}

/// Everything the prompt builder needs from retrieval.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssembledContext {
    /// Passages rendered with title and page labels.
    pub context_text: String,
    pub passages: Vec<MergedPassage>,
    pub citations: Vec<Citation>,
    /// Mean combined score of the top candidates, 0 when there are none.
    pub average_score: f32,
    /// Best combined score among the candidates, 0 when there are none.
    pub top_score: f32,
}

impl AssembledContext {
    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }
}
