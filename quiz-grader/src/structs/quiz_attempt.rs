use serde::Serialize;

use crate::{question::QuestionType, structs::grading_result::GradingResult, topics::Difficulty};

/// Accuracy bands for strengths and weaknesses.
pub const STRENGTH_MIN_ACCURACY: f32 = 0.8;
pub const WEAKNESS_MAX_ACCURACY: f32 = 0.5;
/// Buckets smaller than this are not reported as strengths or weaknesses.
pub const MIN_BUCKET_QUESTIONS: usize = 2;
pub const MAX_INSIGHTS: usize = 5;

/// Accuracy per question type. Types without questions report 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PerTypeAccuracy {
    #[serde(rename = "MCQ")]
    pub mcq: f32,
    #[serde(rename = "SAQ")]
    pub saq: f32,
    #[serde(rename = "LAQ")]
    pub laq: f32,
    #[serde(rename = "ONEWORD")]
    pub one_word: f32,
}

impl PerTypeAccuracy {
    pub fn get(&self, t: QuestionType) -> f32 {
        match t {
            QuestionType::Mcq => self.mcq,
            QuestionType::Saq => self.saq,
            QuestionType::Laq => self.laq,
            QuestionType::OneWord => self.one_word,
        }
    }

    fn set(&mut self, t: QuestionType, v: f32) {
        match t {
            QuestionType::Mcq => self.mcq = v,
            QuestionType::Saq => self.saq = v,
            QuestionType::Laq => self.laq = v,
            QuestionType::OneWord => self.one_word = v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicStat {
    pub name: String,
    pub accuracy: f32,
    pub questions_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyStat {
    pub level: Difficulty,
    pub accuracy: f32,
    pub questions_count: usize,
}

/// Scored submission handed to quiz persistence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub score: usize,
    pub total: usize,
    pub question_results: Vec<GradingResult>,
    pub overall_accuracy: f32,
    pub per_type_accuracy: PerTypeAccuracy,
    pub topics: Vec<TopicStat>,
    pub difficulty: Vec<DifficultyStat>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

#[derive(Default, Clone, Copy)]
struct Tally {
    accurate: usize,
    count: usize,
}

impl Tally {
    fn add(&mut self, r: &GradingResult) {
        self.count += 1;
        if r.accurate() {
            self.accurate += 1;
        }
    }

    fn ratio(self) -> f32 {
        if self.count == 0 {
            0.0
        } else {
            self.accurate as f32 / self.count as f32
        }
    }
}

impl QuizAttempt {
    /// Rolls results (in question order) up into an attempt.
    pub fn from_results(question_results: Vec<GradingResult>) -> Self {
        let total = question_results.len();
        let score = question_results.iter().filter(|r| r.correct()).count();

        let mut overall = Tally::default();
        let mut by_type = [Tally::default(); 4];
        let mut by_level = [Tally::default(); 3];
        let mut by_topic: Vec<(&'static str, Tally)> = Vec::new();

        for r in &question_results {
            overall.add(r);
            if let Some(i) = QuestionType::ALL.iter().position(|t| *t == r.question_type()) {
                by_type[i].add(r);
            }
            if let Some(i) = Difficulty::ALL.iter().position(|d| *d == r.difficulty()) {
                by_level[i].add(r);
            }
            match by_topic.iter_mut().find(|(name, _)| *name == r.topic()) {
                Some((_, t)) => t.add(r),
                None => {
                    let mut t = Tally::default();
                    t.add(r);
                    by_topic.push((r.topic(), t));
                }
            }
        }

        let mut per_type_accuracy = PerTypeAccuracy::default();
        for (t, tally) in QuestionType::ALL.iter().zip(by_type) {
            per_type_accuracy.set(*t, tally.ratio());
        }

        // Type buckets first, then topics in order of first appearance.
        let buckets: Vec<(String, Tally)> = QuestionType::ALL
            .iter()
            .zip(by_type)
            .map(|(t, tally)| (t.as_str().to_string(), tally))
            .chain(by_topic.iter().map(|(n, tally)| (n.to_string(), *tally)))
            .filter(|(_, tally)| tally.count >= MIN_BUCKET_QUESTIONS)
            .collect();
        let pick = |keep: &dyn Fn(f32) -> bool| -> Vec<String> {
            buckets
                .iter()
                .filter(|(_, tally)| keep(tally.ratio()))
                .map(|(name, _)| name.clone())
                .take(MAX_INSIGHTS)
                .collect()
        };
        let strengths = pick(&|a| a >= STRENGTH_MIN_ACCURACY);
        let weaknesses = pick(&|a| a < WEAKNESS_MAX_ACCURACY);

        let topics = by_topic
            .iter()
            .map(|(name, tally)| TopicStat {
                name: name.to_string(),
                accuracy: tally.ratio(),
                questions_count: tally.count,
            })
            .collect();
        let difficulty = Difficulty::ALL
            .iter()
            .zip(by_level)
            .filter(|(_, tally)| tally.count > 0)
            .map(|(level, tally)| DifficultyStat {
                level: *level,
                accuracy: tally.ratio(),
                questions_count: tally.count,
            })
            .collect();

        Self {
            score,
            total,
            question_results,
            overall_accuracy: overall.ratio(),
            per_type_accuracy,
            topics,
            difficulty,
            strengths,
            weaknesses,
        }
    }
}
