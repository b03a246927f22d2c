//! Quiz questions, answer grading and attempt scoring.
//!
//! Public API:
//! - [`parse_questions`]: validate generated quiz JSON, failing closed.
//! - [`AnswerGrader::grade`]: staged equivalence check of one answer.
//! - [`QuizScorer::score`]: grade an attempt and roll it up into a [`QuizAttempt`].
//! - [`QuizGenerator::generate`]: ask the LLM for a quiz over a document.

pub mod config;
pub mod equivalence;
pub mod errors;
pub mod generate;
pub mod question;
pub mod scoring;
pub mod structs;
pub mod topics;
pub mod verdict;

pub use config::GraderConfig;
pub use equivalence::{AnswerGrader, GradeMode, GradeOutcome, Stage};
pub use errors::quiz_error::QuizError;
pub use generate::{QuizCounts, QuizGenerator};
pub use question::{Question, QuestionKind, QuestionType, QuestionWire, parse_questions};
pub use scoring::{QuizScorer, UserAnswer};
pub use structs::grading_result::GradingResult;
pub use structs::quiz_attempt::{DifficultyStat, PerTypeAccuracy, QuizAttempt, TopicStat};
pub use topics::Difficulty;
pub use verdict::{Verdict, parse_verdict};
