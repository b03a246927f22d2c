use serde::Serialize;

use crate::{
    equivalence::{GradeOutcome, Stage},
    question::{Question, QuestionType},
    topics::{Difficulty, classify_difficulty, classify_topic},
};

/// Outcome for one question of an attempt.
///
/// Built only through the constructors below, so `correct` and `partial`
/// are never both set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingResult {
    question_id: String,
    #[serde(rename = "type")]
    question_type: QuestionType,
    correct: bool,
    partial: bool,
    user_answer: String,
    expected_answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    grader_output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage: Option<Stage>,
    topic: &'static str,
    difficulty: Difficulty,
}

impl GradingResult {
    fn base(question: &Question, user_answer: &str) -> Self {
        let qtype = question.question_type();
        Self {
            question_id: question.id.clone(),
            question_type: qtype,
            correct: false,
            partial: false,
            user_answer: user_answer.to_string(),
            expected_answer: question.kind.expected_answer().to_string(),
            grader_output: None,
            stage: None,
            topic: classify_topic(&question.text),
            difficulty: classify_difficulty(qtype, &question.text),
        }
    }

    /// Result of a direct option-index comparison.
    pub fn from_index_match(question: &Question, user_answer: &str, correct: bool) -> Self {
        Self {
            correct,
            ..Self::base(question, user_answer)
        }
    }

    /// Result of the equivalence grader. `correct` wins over `partial`.
    pub fn from_outcome(question: &Question, user_answer: &str, outcome: GradeOutcome) -> Self {
        Self {
            correct: outcome.correct,
            partial: outcome.partial && !outcome.correct,
            grader_output: outcome.grader_output,
            stage: Some(outcome.stage),
            ..Self::base(question, user_answer)
        }
    }

    pub fn question_id(&self) -> &str {
        &self.question_id
    }

    pub fn question_type(&self) -> QuestionType {
        self.question_type
    }

    pub fn correct(&self) -> bool {
        self.correct
    }

    pub fn partial(&self) -> bool {
        self.partial
    }

    /// Counts toward accuracy ratios.
    pub fn accurate(&self) -> bool {
        self.correct || self.partial
    }

    pub fn user_answer(&self) -> &str {
        &self.user_answer
    }

    pub fn expected_answer(&self) -> &str {
        &self.expected_answer
    }

    pub fn grader_output(&self) -> Option<&str> {
        self.grader_output.as_deref()
    }

    pub fn stage(&self) -> Option<Stage> {
        self.stage
    }

    pub fn topic(&self) -> &'static str {
        self.topic
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }
}
