//! Hybrid relevance ranking: embedding cosine plus fuzzy lexical overlap.

use std::{sync::Arc, time::Instant};

use ai_llm_service::TextEmbedder;
use tracing::{debug, info};

use crate::{
    expand::expand_query,
    lexical::{fuzzy_overlap, normalize, prefix_match, words},
    similarity::{cosine, mean_vector},
    structs::{
        chunk::{ChunkRef, DocumentChunks, RetrievalCandidate},
        doc_rag_config::RankerConfig,
    },
};

/// `embed_weight * embedding + lexical_weight * lexical`.
pub fn combined_score(embedding: f32, lexical: f32, cfg: &RankerConfig) -> f32 {
    cfg.embed_weight * embedding + cfg.lexical_weight * lexical
}

/// Ranks document chunks against a query.
pub struct RelevanceRanker {
    embedder: Arc<dyn TextEmbedder>,
    cfg: RankerConfig,
}

impl RelevanceRanker {
    pub fn new(embedder: Arc<dyn TextEmbedder>, cfg: RankerConfig) -> Self {
        Self { embedder, cfg }
    }

    pub fn config(&self) -> &RankerConfig {
        &self.cfg
    }

    /// Expands and embeds the query, then scores every eligible chunk.
    ///
    /// Candidates come back sorted by combined score, descending. An empty
    /// list means nothing scored above zero.
    pub async fn rank(&self, query: &str, documents: &[DocumentChunks]) -> Vec<RetrievalCandidate> {
        let started = Instant::now();
        let expansions = expand_query(query);
        let vectors = self.embedder.embed(&expansions).await;
        let query_vec = mean_vector(&vectors);

        debug!(
            target: "doc_rag::ranker",
            expansions = expansions.len(),
            has_query_vector = query_vec.is_some(),
            "query prepared"
        );

        let out = score_chunks(query, query_vec.as_deref(), documents, &self.cfg);

        info!(
            target: "doc_rag::ranker",
            documents = documents.len(),
            candidates = out.len(),
            top_score = out.first().map(|c| c.combined_score).unwrap_or(0.0),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "ranking finished"
        );
        out
    }
}

/// Scores chunks with an already computed query vector.
///
/// Chunks whose trimmed text is shorter than `cfg.min_chunk_chars` are
/// skipped. Sorting is stable, so ties keep document order.
pub fn score_chunks(
    query: &str,
    query_vec: Option<&[f32]>,
    documents: &[DocumentChunks],
    cfg: &RankerConfig,
) -> Vec<RetrievalCandidate> {
    let query_words = words(query);
    let query_norm = normalize(query);

    let mut out = Vec::new();
    for doc in documents {
        for (idx, chunk) in doc.chunks.iter().enumerate() {
            let trimmed = chunk.text.trim();
            if trimmed.chars().count() < cfg.min_chunk_chars {
                continue;
            }

            let embedding_score = match (query_vec, chunk.embedding.as_deref()) {
                (Some(q), Some(c)) => cosine(q, c),
                _ => 0.0,
            };

            let overlap = fuzzy_overlap(&query_words, &words(trimmed));
            let prefix = if prefix_match(&query_norm, &normalize(trimmed), cfg.prefix_chars) {
                cfg.prefix_score
            } else {
                0.0
            };
            let lexical_score = overlap.max(prefix);

            out.push(RetrievalCandidate {
                chunk_ref: ChunkRef {
                    document_id: doc.document_id.clone(),
                    title: doc.title.clone(),
                    chunk_index: idx,
                    page: chunk.page,
                },
                text: chunk.text.clone(),
                embedding_score,
                lexical_score,
                combined_score: combined_score(embedding_score, lexical_score, cfg),
            });
        }
    }

    out.sort_by(|a, b| b.combined_score.total_cmp(&a.combined_score));

    if out.first().is_none_or(|c| c.combined_score <= 0.0) {
        return Vec::new();
    }
    out
}

#[cfg(test)]
mod tests {
    use ai_llm_service::BoxFuture;
    use proptest::prelude::*;

    use super::*;
    use crate::structs::chunk::Chunk;

    fn doc(id: &str, chunks: Vec<(u32, &str, Option<Vec<f32>>)>) -> DocumentChunks {
        DocumentChunks {
            document_id: id.into(),
            title: format!("{id} title"),
            chunks: chunks
                .into_iter()
                .map(|(page, text, embedding)| Chunk {
                    page,
                    text: text.into(),
                    embedding,
                })
                .collect(),
        }
    }

    struct Offline;

    impl TextEmbedder for Offline {
        fn embed<'a>(&'a self, texts: &'a [String]) -> BoxFuture<'a, Vec<Vec<f32>>> {
            Box::pin(async move { vec![Vec::new(); texts.len()] })
        }
    }

    struct Fixed(Vec<f32>);

    impl TextEmbedder for Fixed {
        fn embed<'a>(&'a self, texts: &'a [String]) -> BoxFuture<'a, Vec<Vec<f32>>> {
            Box::pin(async move { vec![self.0.clone(); texts.len()] })
        }
    }

    #[test]
    fn short_chunks_are_skipped() {
        let docs = [doc("d", vec![(1, "  tiny  ", None), (2, "cellular respiration basics", None)])];
        let out = score_chunks("cellular respiration", None, &docs, &RankerConfig::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].chunk_ref.chunk_index, 1);
        assert_eq!(out[0].embedding_score, 0.0);
    }

    #[test]
    fn nothing_above_zero_means_empty() {
        let docs = [doc("d", vec![(1, "completely unrelated paragraph", None)])];
        assert!(score_chunks("quantum", None, &docs, &RankerConfig::default()).is_empty());
    }

    #[test]
    fn prefix_heuristic_feeds_lexical_score() {
        let docs = [doc("d", vec![(3, "The Krebs cycle occurs in the matrix.", None)])];
        let cfg = RankerConfig::default();
        let out = score_chunks("the krebs cycle?", None, &docs, &cfg);
        assert_eq!(out.len(), 1);
        assert!(out[0].lexical_score >= cfg.prefix_score);
    }

    #[tokio::test]
    async fn embedding_outage_degrades_to_lexical() {
        let docs = [doc(
            "bio",
            vec![
                (1, "Mitosis divides the nucleus of a cell.", Some(vec![1.0, 0.0])),
                (2, "Plants perform photosynthesis in chloroplasts.", Some(vec![0.0, 1.0])),
            ],
        )];
        let ranker = RelevanceRanker::new(Arc::new(Offline), RankerConfig::default());
        let out = ranker.rank("photosynthesis chloroplasts", &docs).await;
        assert_eq!(out[0].chunk_ref.page, 2);
        assert!(out.iter().all(|c| c.embedding_score == 0.0));
    }

    #[tokio::test]
    async fn embedding_similarity_orders_candidates() {
        let docs = [doc(
            "bio",
            vec![
                (1, "First section of the handout text.", Some(vec![1.0, 0.0])),
                (2, "Second section of the handout text.", Some(vec![0.0, 1.0])),
            ],
        )];
        let ranker = RelevanceRanker::new(Arc::new(Fixed(vec![0.0, 1.0])), RankerConfig::default());
        let out = ranker.rank("zzz", &docs).await;
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].chunk_ref.page, 2);
        assert!((out[0].combined_score - 0.7).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn combined_score_is_monotonic(
            e in 0.0f32..1.0, l in 0.0f32..1.0, de in 0.0f32..1.0, dl in 0.0f32..1.0
        ) {
            let cfg = RankerConfig::default();
            let base = combined_score(e, l, &cfg);
            prop_assert!(combined_score(e + de, l, &cfg) >= base);
            prop_assert!(combined_score(e, l + dl, &cfg) >= base);
        }
    }
}
