//! Scores a submitted attempt: MCQ by index, everything else through the
//! equivalence grader with bounded concurrency.

use std::{sync::Arc, time::Instant};

use ai_llm_service::service_profiles::LlmServiceProfiles;
use futures::{StreamExt, stream};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    config::GraderConfig,
    equivalence::{AnswerGrader, GradeMode},
    question::{Question, QuestionKind},
    structs::{grading_result::GradingResult, quiz_attempt::QuizAttempt},
};

/// Raw answer as submitted: an option index, free text, or nothing.
///
/// Any JSON scalar deserializes. Non-integer numbers and booleans grade as
/// their text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserAnswer {
    Index(i64),
    Number(f64),
    Flag(bool),
    Text(String),
    Blank,
}

impl UserAnswer {
    /// Option index; numeric text counts as an index.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(i) => usize::try_from(*i).ok(),
            Self::Number(n) if n.fract() == 0.0 && *n >= 0.0 => Some(*n as usize),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Number(_) | Self::Flag(_) | Self::Blank => None,
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            Self::Index(i) => i.to_string(),
            Self::Number(n) => n.to_string(),
            Self::Flag(b) => b.to_string(),
            Self::Text(s) => s.clone(),
            Self::Blank => String::new(),
        }
    }
}

fn grade_mode(kind: &QuestionKind) -> GradeMode {
    match kind {
        QuestionKind::Saq { .. } | QuestionKind::Laq { .. } => GradeMode::FreeText,
        QuestionKind::Mcq { .. } | QuestionKind::OneWord { .. } => GradeMode::SingleToken,
    }
}

pub struct QuizScorer {
    grader: AnswerGrader,
    concurrency: usize,
}

impl QuizScorer {
    pub fn new(grader: AnswerGrader, concurrency: usize) -> Self {
        Self {
            grader,
            concurrency: concurrency.max(1),
        }
    }

    pub fn from_profiles(svc: &LlmServiceProfiles, cfg: &GraderConfig) -> Self {
        let grader = AnswerGrader::new(
            Arc::new(svc.embedding_client()),
            Arc::new(svc.generation_client()),
            cfg.similarity_threshold,
        );
        Self::new(grader, cfg.concurrency)
    }

    /// Grades `answers` (parallel to `questions`) and rolls them up.
    ///
    /// Missing answers grade as blank; extra answers are ignored.
    pub async fn score(&self, questions: &[Question], answers: &[UserAnswer]) -> QuizAttempt {
        let started = Instant::now();
        if answers.len() > questions.len() {
            warn!(
                target: "quiz_grader::scoring",
                questions = questions.len(),
                answers = answers.len(),
                "more answers than questions; extras ignored"
            );
        }

        let mut slots: Vec<Option<GradingResult>> = vec![None; questions.len()];
        let mut pending = Vec::new();
        for (i, q) in questions.iter().enumerate() {
            let answer = answers.get(i).unwrap_or(&UserAnswer::Blank);
            match &q.kind {
                QuestionKind::Mcq { answer_index, .. } => {
                    let correct = answer.as_index() == Some(*answer_index);
                    slots[i] = Some(GradingResult::from_index_match(q, &answer.to_text(), correct));
                }
                kind => pending.push((i, answer.to_text(), grade_mode(kind))),
            }
        }

        let graded_count = pending.len();
        let graded: Vec<(usize, GradingResult)> = stream::iter(pending)
            .map(|(i, text, mode)| async move {
                let q = &questions[i];
                let outcome = self.grader.grade(q.kind.expected_answer(), &text, mode).await;
                (i, GradingResult::from_outcome(q, &text, outcome))
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;
        for (i, r) in graded {
            slots[i] = Some(r);
        }

        let attempt = QuizAttempt::from_results(slots.into_iter().flatten().collect());
        info!(
            target: "quiz_grader::scoring",
            score = attempt.score,
            total = attempt.total,
            graded = graded_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "quiz scored"
        );
        attempt
    }
}
