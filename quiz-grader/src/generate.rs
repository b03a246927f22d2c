//! Quiz generation from a document's chunks.

use std::sync::Arc;

use ai_llm_service::{TextGenerator, is_unavailable};
use doc_rag::DocumentChunks;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    config::GraderConfig,
    question::{Question, QuestionType, parse_questions},
};

/// Requested number of questions per type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuizCounts {
    pub mcq: usize,
    pub one_word: usize,
    pub saq: usize,
    pub laq: usize,
}

impl QuizCounts {
    pub fn get(&self, t: QuestionType) -> usize {
        match t {
            QuestionType::Mcq => self.mcq,
            QuestionType::OneWord => self.one_word,
            QuestionType::Saq => self.saq,
            QuestionType::Laq => self.laq,
        }
    }

    pub fn total(&self) -> usize {
        self.mcq + self.one_word + self.saq + self.laq
    }
}

const SYSTEM: &str = "You write quizzes from study material. Every question must be answerable \
from the material alone. Respond with a JSON array only, no prose.";

pub struct QuizGenerator {
    generator: Arc<dyn TextGenerator>,
    temperature: f32,
    max_chars: usize,
}

impl QuizGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>, cfg: &GraderConfig) -> Self {
        Self {
            generator,
            temperature: cfg.generation_temperature,
            max_chars: cfg.generation_max_chars,
        }
    }

    /// Generates up to `counts` questions per type. Upstream failure or
    /// unusable output yields an empty quiz.
    pub async fn generate(&self, document: &DocumentChunks, counts: &QuizCounts) -> Vec<Question> {
        let material = page_labelled(document, self.max_chars);
        if counts.total() == 0 || material.is_empty() {
            return Vec::new();
        }

        let prompt = build_prompt(&document.title, &material, counts);
        let raw = self
            .generator
            .generate(&prompt, Some(SYSTEM), self.temperature)
            .await;
        if is_unavailable(&raw) {
            warn!(
                target: "quiz_grader::generate",
                document = %document.document_id,
                "generation unavailable; empty quiz"
            );
            return Vec::new();
        }

        let questions = cap_and_number(parse_questions(&raw), counts);
        info!(
            target: "quiz_grader::generate",
            document = %document.document_id,
            requested = counts.total(),
            produced = questions.len(),
            "quiz generated"
        );
        questions
    }
}

/// Chunk texts prefixed with their page, cut at `budget` characters.
fn page_labelled(document: &DocumentChunks, budget: usize) -> String {
    let mut out = String::new();
    let mut used = 0usize;
    for chunk in &document.chunks {
        let text = chunk.text.trim();
        if text.is_empty() {
            continue;
        }
        let block = format!("[page {}]\n{}\n\n", chunk.page, text);
        let len = block.chars().count();
        if used + len > budget {
            let room = budget.saturating_sub(used);
            out.extend(block.chars().take(room));
            break;
        }
        out.push_str(&block);
        used += len;
    }
    out.trim_end().to_string()
}

fn build_prompt(title: &str, material: &str, counts: &QuizCounts) -> String {
    format!(
        "Write a quiz about \"{title}\" with exactly {mcq} MCQ, {ow} ONEWORD, {saq} SAQ and {laq} LAQ questions.\n\
         Each item is an object with keys: \"type\" (MCQ, ONEWORD, SAQ or LAQ), \"question\", \
         \"page\" (number of the page the answer comes from), \"explanation\".\n\
         MCQ items add \"options\" (exactly 4 strings) and \"answerIndex\" (0-3).\n\
         Other items add \"expectedAnswer\"; ONEWORD answers are a single word or number.\n\n\
         Material:\n{material}",
        mcq = counts.mcq,
        ow = counts.one_word,
        saq = counts.saq,
        laq = counts.laq,
    )
}

/// Keeps at most the requested number per type and assigns ids `q1..`.
fn cap_and_number(questions: Vec<Question>, counts: &QuizCounts) -> Vec<Question> {
    let mut taken = [0usize; 4];
    questions
        .into_iter()
        .filter(|q| {
            let t = q.question_type();
            let slot = QuestionType::ALL.iter().position(|x| *x == t).unwrap_or(0);
            if taken[slot] < counts.get(t) {
                taken[slot] += 1;
                true
            } else {
                false
            }
        })
        .enumerate()
        .map(|(i, mut q)| {
            q.id = format!("q{}", i + 1);
            q
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use ai_llm_service::{BoxFuture, SERVICE_UNAVAILABLE_MESSAGE};
    use doc_rag::Chunk;

    use super::*;

    struct Canned(String);

    impl TextGenerator for Canned {
        fn generate<'a>(
            &'a self,
            prompt: &'a str,
            _system: Option<&'a str>,
            _temperature: f32,
        ) -> BoxFuture<'a, String> {
            assert!(prompt.contains("[page 7]"));
            Box::pin(async move { self.0.clone() })
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

    fn doc() -> DocumentChunks {
        DocumentChunks {
            document_id: "bio".into(),
            title: "Cells".into(),
            chunks: vec![Chunk {
                page: 7,
                text: "Mitochondria produce ATP through cellular respiration.".into(),
                embedding: None,
            }],
        }
    }

    fn generator(reply: &str) -> QuizGenerator {
        QuizGenerator::new(Arc::new(Canned(reply.into())), &GraderConfig::default())
    }

    #[tokio::test]
    async fn caps_per_type_and_renumbers() {
        let reply = r#"[
          {"type":"ONEWORD","question":"Organelle making ATP?","expectedAnswer":"Mitochondria","page":7},
          {"type":"ONEWORD","question":"Molecule produced?","expectedAnswer":"ATP","page":7},
          {"type":"SAQ","question":"Describe respiration","expectedAnswer":"Glucose is oxidized","page":7}
        ]"#;
        let counts = QuizCounts {
            one_word: 1,
            saq: 1,
            ..Default::default()
        };
        let qs = generator(reply).generate(&doc(), &counts).await;
        assert_eq!(qs.len(), 2);
        assert_eq!(qs[0].id, "q1");
        assert_eq!(qs[0].kind.expected_answer(), "Mitochondria");
        assert_eq!(qs[1].id, "q2");
        assert_eq!(qs[1].question_type(), QuestionType::Saq);
    }

    #[tokio::test]
    async fn unavailable_service_gives_empty_quiz() {
        let counts = QuizCounts {
            mcq: 2,
            ..Default::default()
        };
        let qs = generator(SERVICE_UNAVAILABLE_MESSAGE)
            .generate(&doc(), &counts)
            .await;
        assert!(qs.is_empty());
    }

    #[test]
    fn material_respects_budget() {
        let text = page_labelled(&doc(), 20);
        assert!(text.chars().count() <= 20);
        assert!(text.starts_with("[page 7]"));
    }
}
