//! Answer equivalence grading.
//!
//! Single-token answers run an ordered list of stages, cheapest first:
//! numeric tolerance, normalized equality, embedding similarity, LLM verdict.
//! Free-text answers go straight to a strict LLM grader.

use std::sync::Arc;

use ai_llm_service::{TextEmbedder, TextGenerator, is_unavailable};
use doc_rag::similarity::cosine;
use serde::Serialize;
use tracing::{debug, warn};

use crate::verdict::{Verdict, parse_verdict};

/// How an answer is compared with the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeMode {
    /// Numbers and one-word answers.
    SingleToken,
    /// Short and long written answers.
    FreeText,
}

/// Stage that produced a grading decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    EmptyAnswer,
    Numeric,
    Normalized,
    Embedding,
    LlmVerdict,
}

/// Single-token cascade, in evaluation order.
pub const SINGLE_TOKEN_STAGES: [Stage; 4] = [
    Stage::Numeric,
    Stage::Normalized,
    Stage::Embedding,
    Stage::LlmVerdict,
];

#[derive(Debug, Clone, PartialEq)]
pub struct GradeOutcome {
    pub correct: bool,
    pub partial: bool,
    /// Raw LLM output, when the LLM stage ran.
    pub grader_output: Option<String>,
    pub stage: Stage,
}

impl GradeOutcome {
    fn decided(correct: bool, stage: Stage) -> Self {
        Self {
            correct,
            partial: false,
            grader_output: None,
            stage,
        }
    }

    fn from_llm(raw: String) -> Self {
        let verdict = parse_verdict(&raw);
        Self {
            correct: verdict == Verdict::Correct,
            partial: verdict == Verdict::Partial,
            grader_output: Some(raw),
            stage: Stage::LlmVerdict,
        }
    }
}

const SINGLE_TOKEN_SYSTEM: &str = "You grade quiz answers. Compare the student's answer with the \
expected answer, accepting synonyms, spelling slips and equivalent forms. Reply with one word: \
CORRECT, PARTIAL or INCORRECT.";

const FREE_TEXT_SYSTEM: &str = "You are a strict examiner grading a written quiz answer against \
the reference answer. CORRECT means every key point is present and accurate. PARTIAL means some \
key points are present and nothing stated is wrong. INCORRECT means the key points are missing \
or wrong. Output exactly one of CORRECT, PARTIAL, INCORRECT and nothing else.";

/// Numeric equality with tolerance `max(1e-6, |expected| * 1e-3)`.
///
/// `None` unless both sides parse as finite numbers.
pub fn numeric_match(expected: &str, user: &str) -> Option<bool> {
    let e: f64 = expected.trim().parse().ok()?;
    let u: f64 = user.trim().parse().ok()?;
    if !e.is_finite() || !u.is_finite() {
        return None;
    }
    let tol = (e.abs() * 1e-3).max(1e-6);
    Some((e - u).abs() <= tol)
}

/// Trim and lowercase. Inner whitespace is kept as is.
pub fn normalize_answer(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Grades answers against references using the shared embedder and generator.
#[derive(Clone)]
pub struct AnswerGrader {
    embedder: Arc<dyn TextEmbedder>,
    generator: Arc<dyn TextGenerator>,
    similarity_threshold: f32,
}

impl AnswerGrader {
    pub fn new(
        embedder: Arc<dyn TextEmbedder>,
        generator: Arc<dyn TextGenerator>,
        similarity_threshold: f32,
    ) -> Self {
        Self {
            embedder,
            generator,
            similarity_threshold,
        }
    }

    /// Grades `user` against `expected`. Never fails.
    pub async fn grade(&self, expected: &str, user: &str, mode: GradeMode) -> GradeOutcome {
        if expected.trim().is_empty() || user.trim().is_empty() {
            return GradeOutcome::decided(false, Stage::EmptyAnswer);
        }
        match mode {
            GradeMode::SingleToken => self.grade_single_token(expected, user).await,
            GradeMode::FreeText => {
                let raw = self.ask_llm(FREE_TEXT_SYSTEM, expected, user).await;
                GradeOutcome::from_llm(raw)
            }
        }
    }

    async fn grade_single_token(&self, expected: &str, user: &str) -> GradeOutcome {
        for stage in SINGLE_TOKEN_STAGES {
            let decided = match stage {
                // A numeric comparison settles the answer either way.
                Stage::Numeric => {
                    numeric_match(expected, user).map(|ok| GradeOutcome::decided(ok, stage))
                }
                Stage::Normalized => (normalize_answer(expected) == normalize_answer(user))
                    .then(|| GradeOutcome::decided(true, stage)),
                Stage::Embedding => {
                    let sim = self.similarity(expected, user).await;
                    debug!(target: "quiz_grader::equivalence", sim, "embedding similarity");
                    (sim >= self.similarity_threshold)
                        .then(|| GradeOutcome::decided(true, stage))
                }
                Stage::LlmVerdict => {
                    let raw = self.ask_llm(SINGLE_TOKEN_SYSTEM, expected, user).await;
                    Some(GradeOutcome::from_llm(raw))
                }
                Stage::EmptyAnswer => None,
            };
            if let Some(outcome) = decided {
                return outcome;
            }
        }
        GradeOutcome::decided(false, Stage::LlmVerdict)
    }

    async fn similarity(&self, expected: &str, user: &str) -> f32 {
        let texts = [expected.trim().to_string(), user.trim().to_string()];
        let vectors = self.embedder.embed(&texts).await;
        match vectors.as_slice() {
            [a, b] => cosine(a, b),
            _ => 0.0,
        }
    }

    async fn ask_llm(&self, system: &str, expected: &str, user: &str) -> String {
        let prompt = format!(
            "Expected answer:\n{}\n\nStudent answer:\n{}\n\nVerdict:",
            expected.trim(),
            user.trim()
        );
        let raw = self.generator.generate(&prompt, Some(system), 0.0).await;
        if is_unavailable(&raw) {
            warn!(
                target: "quiz_grader::equivalence",
                "grader unavailable; answer graded incorrect"
            );
        }
        raw
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use ai_llm_service::{BoxFuture, SERVICE_UNAVAILABLE_MESSAGE};
    use proptest::prelude::*;

    use super::*;

    struct FixedEmbedder {
        vectors: Vec<Vec<f32>>,
        calls: AtomicUsize,
    }

    impl TextEmbedder for FixedEmbedder {
        fn embed<'a>(&'a self, _texts: &'a [String]) -> BoxFuture<'a, Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move { self.vectors.clone() })
        }
    }

    struct FixedJudge {
        reply: String,
        calls: AtomicUsize,
    }

    impl TextGenerator for FixedJudge {
        fn generate<'a>(
            &'a self,
            _prompt: &'a str,
            _system: Option<&'a str>,
            temperature: f32,
        ) -> BoxFuture<'a, String> {
            assert_eq!(temperature, 0.0);
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move { self.reply.clone() })
        }

        fn generate_with_images<'a>(
            &'a self,
            prompt: &'a str,
            system: Option<&'a str>,
            temperature: f32,
            _images: &'a [String],
        ) -> BoxFuture<'a, String> {
            self.generate(prompt, system, temperature)
        }
    }

    fn grader(
        vectors: Vec<Vec<f32>>,
        reply: &str,
    ) -> (AnswerGrader, Arc<FixedEmbedder>, Arc<FixedJudge>) {
        let emb = Arc::new(FixedEmbedder {
            vectors,
            calls: AtomicUsize::new(0),
        });
        let judge = Arc::new(FixedJudge {
            reply: reply.into(),
            calls: AtomicUsize::new(0),
        });
        (AnswerGrader::new(emb.clone(), judge.clone(), 0.78), emb, judge)
    }

    #[tokio::test]
    async fn empty_answers_skip_every_service() {
        let (g, emb, judge) = grader(vec![], "CORRECT");
        for mode in [GradeMode::SingleToken, GradeMode::FreeText] {
            let out = g.grade("Photosynthesis", "   ", mode).await;
            assert!(!out.correct && !out.partial);
            assert_eq!(out.stage, Stage::EmptyAnswer);
            let out = g.grade("", "anything", mode).await;
            assert!(!out.correct);
        }
        assert_eq!(emb.calls.load(Ordering::SeqCst), 0);
        assert_eq!(judge.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn numeric_stage_decides_both_ways() {
        let (g, emb, judge) = grader(vec![vec![1.0], vec![1.0]], "CORRECT");
        let ok = g.grade("3.14159", "3.1416", GradeMode::SingleToken).await;
        assert!(ok.correct);
        assert_eq!(ok.stage, Stage::Numeric);
        let bad = g.grade("42", "43", GradeMode::SingleToken).await;
        assert!(!bad.correct);
        assert_eq!(bad.stage, Stage::Numeric);
        assert_eq!(emb.calls.load(Ordering::SeqCst), 0);
        assert_eq!(judge.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn normalized_match_skips_paid_stages() {
        let (g, emb, judge) = grader(vec![], "INCORRECT");
        let out = g.grade("Mitochondria", "  mitochondria ", GradeMode::SingleToken).await;
        assert!(out.correct);
        assert_eq!(out.stage, Stage::Normalized);
        assert_eq!(emb.calls.load(Ordering::SeqCst), 0);
        assert_eq!(judge.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn inner_space_falls_through_to_embedding() {
        let (g, emb, judge) = grader(vec![vec![1.0, 0.0], vec![0.9, 0.1]], "INCORRECT");
        let out = g
            .grade("Photosynthesis", "photo synthesis ", GradeMode::SingleToken)
            .await;
        assert!(out.correct);
        assert_eq!(out.stage, Stage::Embedding);
        assert_eq!(emb.calls.load(Ordering::SeqCst), 1);
        assert_eq!(judge.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn low_similarity_asks_the_judge() {
        let (g, _, judge) = grader(vec![vec![1.0, 0.0], vec![0.0, 1.0]], "PARTIAL");
        let out = g.grade("Nucleus", "cell centre", GradeMode::SingleToken).await;
        assert!(!out.correct);
        assert!(out.partial);
        assert_eq!(out.stage, Stage::LlmVerdict);
        assert_eq!(out.grader_output.as_deref(), Some("PARTIAL"));
        assert_eq!(judge.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_embeddings_fall_through() {
        let (g, _, judge) = grader(vec![vec![], vec![]], "CORRECT");
        let out = g.grade("Osmosis", "diffusion of water", GradeMode::SingleToken).await;
        assert!(out.correct);
        assert_eq!(out.stage, Stage::LlmVerdict);
        assert_eq!(judge.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn free_text_goes_straight_to_the_judge() {
        let (g, emb, judge) = grader(vec![vec![1.0], vec![1.0]], "CORRECT");
        let answer = "Plants convert light to energy";
        let out = g.grade(answer, answer, GradeMode::FreeText).await;
        assert!(out.correct);
        assert_eq!(out.stage, Stage::LlmVerdict);
        assert_eq!(emb.calls.load(Ordering::SeqCst), 0);
        assert_eq!(judge.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unavailable_judge_grades_incorrect() {
        let (g, _, _) = grader(vec![], SERVICE_UNAVAILABLE_MESSAGE);
        let out = g.grade("Enzymes speed reactions", "catalysts", GradeMode::FreeText).await;
        assert!(!out.correct && !out.partial);
        assert_eq!(out.grader_output.as_deref(), Some(SERVICE_UNAVAILABLE_MESSAGE));
    }

    proptest! {
        #[test]
        fn numbers_within_tolerance_match(b in -1.0e6f64..1.0e6, frac in -1.0f64..1.0) {
            let tol = (b.abs() * 1e-3).max(1e-6);
            // Stay clear of the boundary so float rounding cannot flip the result.
            let a = b + frac * tol * 0.99;
            prop_assert_eq!(numeric_match(&b.to_string(), &a.to_string()), Some(true));
        }

        #[test]
        fn case_and_padding_do_not_matter(s in "[A-Za-z][A-Za-z ]{0,20}", pad in 0usize..4) {
            let padded = format!("{}{}{}", " ".repeat(pad), s.to_uppercase(), " ".repeat(pad));
            prop_assert_eq!(normalize_answer(&s), normalize_answer(&padded));
        }
    }
}
