//! Stitching of ranked candidates into prompt context and citations.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::structs::{
    chunk::RetrievalCandidate,
    doc_rag_config::AssemblerConfig,
    passage::{AssembledContext, Citation, MergedPassage},
};

/// Builds context text, passages and citations from ranked candidates.
///
/// `candidates` must be sorted by combined score, descending (as returned by
/// the ranker). Only the first `cfg.top_n` are used.
pub fn assemble(candidates: &[RetrievalCandidate], cfg: &AssemblerConfig) -> AssembledContext {
    let top = &candidates[..candidates.len().min(cfg.top_n)];
    if top.is_empty() {
        debug!(target: "doc_rag::stitcher", "no candidates; empty context");
        return AssembledContext::default();
    }

    let mut passages = merge_passages(top.iter().map(MergedPassage::from).collect());
    passages.sort_by(|a, b| b.score.total_cmp(&a.score));
    passages.truncate(cfg.max_passages);

    let mut seen_pages = HashSet::new();
    passages.retain(|p| seen_pages.insert((p.document_id.clone(), p.start_page)));

    let context_text = render_context(&passages);
    let citations = citations(top, cfg.snippet_chars);
    let average_score = top.iter().map(|c| c.combined_score).sum::<f32>() / top.len() as f32;
    let top_score = top
        .iter()
        .map(|c| c.combined_score)
        .fold(f32::MIN, f32::max);

    info!(
        target: "doc_rag::stitcher",
        candidates = top.len(),
        passages = passages.len(),
        citations = citations.len(),
        average_score,
        "context assembled"
    );

    AssembledContext {
        context_text,
        passages,
        citations,
        average_score,
        top_score,
    }
}

/// Merges passages of the same document whose chunk ranges are exactly adjacent.
///
/// Output is ordered by document, then start index. Merged text keeps chunk
/// order; the score is the best of the run. Applying it to its own output
/// changes nothing.
pub fn merge_passages(mut passages: Vec<MergedPassage>) -> Vec<MergedPassage> {
    passages.sort_by(|a, b| {
        a.document_id
            .cmp(&b.document_id)
            .then(a.start_index.cmp(&b.start_index))
            .then(a.end_index.cmp(&b.end_index))
    });

    let mut out: Vec<MergedPassage> = Vec::with_capacity(passages.len());
    let mut iter = passages.into_iter();
    let Some(mut current) = iter.next() else {
        return out;
    };

    for next in iter {
        if next.document_id == current.document_id && next.start_index == current.end_index + 1 {
            current.end_index = next.end_index;
            current.start_page = current.start_page.min(next.start_page);
            current.end_page = current.end_page.max(next.end_page);
            current.text.push('\n');
            current.text.push_str(&next.text);
            if next.score > current.score {
                current.score = next.score;
            }
        } else {
            out.push(std::mem::replace(&mut current, next));
        }
    }
    out.push(current);
    out
}

fn render_context(passages: &[MergedPassage]) -> String {
    passages
        .iter()
        .map(|p| {
            let pages = if p.start_page == p.end_page {
                format!("page {}", p.start_page)
            } else {
                format!("pages {}-{}", p.start_page, p.end_page)
            };
            format!("[{}, {}]\n{}", p.title, pages, p.text.trim())
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// One citation per distinct `(document, page)` among the candidates.
fn citations(top: &[RetrievalCandidate], snippet_chars: usize) -> Vec<Citation> {
    let mut seen = HashSet::new();
    top.iter()
        .filter(|c| seen.insert((c.chunk_ref.document_id.clone(), c.chunk_ref.page)))
        .map(|c| Citation {
            document_id: c.chunk_ref.document_id.clone(),
            title: c.chunk_ref.title.clone(),
            page: c.chunk_ref.page,
            snippet: snippet(&c.text, snippet_chars),
        })
        .collect()
}

fn snippet(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::structs::chunk::ChunkRef;

    fn cand(doc: &str, idx: usize, page: u32, score: f32) -> RetrievalCandidate {
        RetrievalCandidate {
            chunk_ref: ChunkRef {
                document_id: doc.into(),
                title: doc.to_uppercase(),
                chunk_index: idx,
                page,
            },
            text: format!("{doc} chunk {idx}"),
            embedding_score: score,
            lexical_score: 0.0,
            combined_score: score,
        }
    }

    #[test]
    fn adjacent_chunks_merge_with_max_score() {
        let ps = merge_passages(
            [cand("a", 3, 2, 0.4), cand("a", 1, 1, 0.2), cand("a", 2, 1, 0.9), cand("b", 4, 5, 0.3)]
                .iter()
                .map(MergedPassage::from)
                .collect(),
        );
        assert_eq!(ps.len(), 2);
        assert_eq!((ps[0].start_index, ps[0].end_index), (1, 3));
        assert_eq!((ps[0].start_page, ps[0].end_page), (1, 2));
        assert_eq!(ps[0].text, "a chunk 1\na chunk 2\na chunk 3");
        assert_eq!(ps[0].score, 0.9);
        assert_eq!(ps[1].document_id, "b");
    }

    #[test]
    fn gaps_and_other_documents_do_not_merge() {
        let ps = merge_passages(
            [cand("a", 1, 1, 0.5), cand("a", 3, 1, 0.5), cand("b", 2, 1, 0.5)]
                .iter()
                .map(MergedPassage::from)
                .collect(),
        );
        assert_eq!(ps.len(), 3);
    }

    #[test]
    fn assemble_limits_dedupes_and_cites() {
        let cfg = AssemblerConfig {
            top_n: 3,
            max_passages: 20,
            snippet_chars: 5,
        };
        let cands = vec![
            cand("a", 0, 1, 0.9),
            cand("a", 5, 1, 0.6),
            cand("b", 2, 4, 0.3),
            cand("c", 0, 9, 0.1),
        ];
        let ctx = assemble(&cands, &cfg);

        // Candidate "c" is beyond top_n; the second page-1 passage of "a" is suppressed.
        assert_eq!(ctx.passages.len(), 2);
        assert_eq!(ctx.citations.len(), 2);
        assert_eq!(ctx.citations[0].snippet, "a chu");
        assert!((ctx.average_score - 0.6).abs() < 1e-6);
        assert!((ctx.top_score - 0.9).abs() < 1e-6);
        assert!(ctx.context_text.starts_with("[A, page 1]\na chunk 0"));
        assert!(!ctx.context_text.contains("c chunk"));
    }

    #[test]
    fn empty_candidates_give_empty_context() {
        let ctx = assemble(&[], &AssemblerConfig::default());
        assert!(ctx.is_empty());
        assert_eq!(ctx.average_score, 0.0);
    }

    proptest! {
        #[test]
        fn merging_is_idempotent(
            picks in prop::collection::btree_set((0u8..3, 0usize..30), 0..40),
            scores in prop::collection::vec(0.0f32..1.0, 40),
        ) {
            let passages: Vec<MergedPassage> = picks
                .iter()
                .zip(&scores)
                .map(|(&(doc, idx), &s)| {
                    MergedPassage::from(&cand(&format!("d{doc}"), idx, idx as u32 / 3 + 1, s))
                })
                .collect();
            let once = merge_passages(passages);
            let twice = merge_passages(once.clone());
            prop_assert_eq!(once, twice);
        }
    }
}
