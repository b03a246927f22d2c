use std::sync::Arc;

use ai_llm_service::{BoxFuture, TextEmbedder};
use doc_rag::{Chunk, DocRagConfig, DocRetriever, DocumentChunks};

/// Embeds by keyword presence so tests can steer similarity.
struct KeywordEmbedder;

impl TextEmbedder for KeywordEmbedder {
    fn embed<'a>(&'a self, texts: &'a [String]) -> BoxFuture<'a, Vec<Vec<f32>>> {
        Box::pin(async move {
            texts
                .iter()
                .map(|t| {
                    let t = t.to_lowercase();
                    vec![
                        t.contains("enzyme") as u8 as f32,
                        t.contains("planet") as u8 as f32,
                        1.0,
                    ]
                })
                .collect()
        })
    }
}

fn handout() -> DocumentChunks {
    let raw = [
        (1, "Enzymes are proteins that speed up reactions.", [1.0, 0.0, 1.0]),
        (1, "Each enzyme has an active site shaped for its substrate.", [1.0, 0.0, 1.0]),
        (2, "Temperature and pH change how fast an enzyme works.", [1.0, 0.0, 1.0]),
        (7, "Jupiter is the largest planet in the solar system.", [0.0, 1.0, 1.0]),
    ];
    DocumentChunks {
        document_id: "doc-1".into(),
        title: "Biology Handout".into(),
        chunks: raw
            .into_iter()
            .map(|(page, text, e)| Chunk {
                page,
                text: text.into(),
                embedding: Some(e.to_vec()),
            })
            .collect(),
    }
}

#[tokio::test]
async fn adjacent_chunks_collapse_into_one_passage() {
    let retriever = DocRetriever::new(Arc::new(KeywordEmbedder), DocRagConfig::default());

    let ctx = retriever.retrieve("What is an enzyme?", &[handout()]).await;

    let first = &ctx.passages[0];
    assert_eq!((first.start_index, first.end_index), (0, 3));
    assert!(first.text.contains("active site"));
    assert!(ctx.context_text.contains("[Biology Handout, pages 1-7]"));
    assert_eq!(
        ctx.citations.iter().map(|c| c.page).collect::<Vec<_>>(),
        vec![1, 2, 7]
    );
    assert!(ctx.average_score > 0.0);
}

#[tokio::test]
async fn no_documents_means_empty_context() {
    let retriever = DocRetriever::new(Arc::new(KeywordEmbedder), DocRagConfig::default());
    let ctx = retriever.retrieve("anything", &[]).await;
    assert!(ctx.is_empty());
    assert!(ctx.citations.is_empty());
}
