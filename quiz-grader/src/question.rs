//! Question model and defensive ingestion of generated quiz JSON.
//!
//! Generated output is untrusted: [`parse_questions`] strips a markdown
//! fence and requires what remains to be exactly one JSON array. Every item
//! is then validated on its own. Items that do not fit the schema are
//! dropped; any other payload (prose, wrapper objects, truncated JSON)
//! yields an empty list.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Wire tag of a question type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QuestionType {
    #[serde(rename = "MCQ")]
    Mcq,
    #[serde(rename = "ONEWORD")]
    OneWord,
    #[serde(rename = "SAQ")]
    Saq,
    #[serde(rename = "LAQ")]
    Laq,
}

impl QuestionType {
    /// Order used by rollups.
    pub const ALL: [QuestionType; 4] = [Self::Mcq, Self::OneWord, Self::Saq, Self::Laq];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mcq => "MCQ",
            Self::OneWord => "ONEWORD",
            Self::Saq => "SAQ",
            Self::Laq => "LAQ",
        }
    }

    /// Lenient tag match: case, `_`, `-` and spaces are ignored.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let norm: String = tag
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_ascii_uppercase();
        match norm.as_str() {
            "MCQ" => Some(Self::Mcq),
            "ONEWORD" => Some(Self::OneWord),
            "SAQ" => Some(Self::Saq),
            "LAQ" => Some(Self::Laq),
            _ => None,
        }
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type-specific payload of a question.
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionKind {
    Mcq {
        options: [String; 4],
        answer_index: usize,
    },
    OneWord {
        expected: String,
    },
    Saq {
        expected: String,
    },
    Laq {
        expected: String,
    },
}

impl QuestionKind {
    pub fn question_type(&self) -> QuestionType {
        match self {
            Self::Mcq { .. } => QuestionType::Mcq,
            Self::OneWord { .. } => QuestionType::OneWord,
            Self::Saq { .. } => QuestionType::Saq,
            Self::Laq { .. } => QuestionType::Laq,
        }
    }

    /// Reference answer as shown in results: the correct option text for MCQ.
    pub fn expected_answer(&self) -> &str {
        match self {
            Self::Mcq {
                options,
                answer_index,
            } => options
                .get(*answer_index)
                .map(String::as_str)
                .unwrap_or_default(),
            Self::OneWord { expected } | Self::Saq { expected } | Self::Laq { expected } => {
                expected
            }
        }
    }
}

/// A validated quiz question.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "QuestionWire")]
pub struct Question {
    pub id: String,
    pub kind: QuestionKind,
    pub text: String,
    pub page: u32,
    pub explanation: String,
}

impl Question {
    pub fn question_type(&self) -> QuestionType {
        self.kind.question_type()
    }
}

/// Loose JSON shape accepted from generators and API callers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(alias = "question")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, alias = "answer_index", skip_serializing_if = "Option::is_none")]
    pub answer_index: Option<Value>,
    #[serde(
        default,
        alias = "expected_answer",
        alias = "answer",
        skip_serializing_if = "Option::is_none"
    )]
    pub expected_answer: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl From<Question> for QuestionWire {
    fn from(q: Question) -> Self {
        let kind = q.kind.question_type().as_str().to_string();
        let (options, answer_index, expected_answer) = match q.kind {
            QuestionKind::Mcq {
                options,
                answer_index,
            } => (Some(options.to_vec()), Some(Value::from(answer_index)), None),
            QuestionKind::OneWord { expected }
            | QuestionKind::Saq { expected }
            | QuestionKind::Laq { expected } => (None, None, Some(expected)),
        };
        Self {
            id: Some(Value::String(q.id)),
            kind,
            text: q.text,
            options,
            answer_index,
            expected_answer,
            page: Some(q.page),
            explanation: Some(q.explanation),
        }
    }
}

impl QuestionWire {
    /// Validates one item. `position` seeds the id when none is given.
    pub fn validate(self, position: usize) -> Option<Question> {
        let Some(qtype) = QuestionType::from_tag(&self.kind) else {
            debug!(target: "quiz_grader::question", tag = %self.kind, "unknown question type dropped");
            return None;
        };
        let text = self.text.trim();
        if text.is_empty() {
            return None;
        }
        let expected = self
            .expected_answer
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let kind = match qtype {
            QuestionType::Mcq => {
                let options: [String; 4] = self
                    .options?
                    .into_iter()
                    .map(|o| o.trim().to_string())
                    .collect::<Vec<_>>()
                    .try_into()
                    .ok()?;
                if options.iter().any(String::is_empty) {
                    return None;
                }
                let answer_index = self
                    .answer_index
                    .as_ref()
                    .and_then(index_value)
                    .or_else(|| {
                        let e = expected?;
                        options.iter().position(|o| o.eq_ignore_ascii_case(e))
                    })
                    .filter(|i| *i < options.len())?;
                QuestionKind::Mcq {
                    options,
                    answer_index,
                }
            }
            QuestionType::OneWord => QuestionKind::OneWord {
                expected: expected?.to_string(),
            },
            QuestionType::Saq => QuestionKind::Saq {
                expected: expected?.to_string(),
            },
            QuestionType::Laq => QuestionKind::Laq {
                expected: expected?.to_string(),
            },
        };

        let id = match self.id {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => format!("q{}", position + 1),
        };

        Some(Question {
            id,
            kind,
            text: text.to_string(),
            page: self.page.unwrap_or(0),
            explanation: self.explanation.unwrap_or_default().trim().to_string(),
        })
    }
}

/// Integer index from a JSON number or numeric string.
fn index_value(v: &Value) -> Option<usize> {
    match v {
        Value::Number(n) => n.as_u64().and_then(|i| usize::try_from(i).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Removes a surrounding markdown code fence (with optional language tag).
pub fn strip_code_fence(raw: &str) -> &str {
    let t = raw.trim();
    let Some(rest) = t.strip_prefix("```") else {
        return t;
    };
    let body = match rest.find('\n') {
        Some(nl) => &rest[nl + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Parses generated quiz JSON into validated questions.
///
/// Never fails: anything unparseable yields an empty list.
pub fn parse_questions(raw: &str) -> Vec<Question> {
    let body = strip_code_fence(raw);
    let items: Vec<Value> = match serde_json::from_str(body) {
        Ok(items) => items,
        Err(e) => {
            warn!(target: "quiz_grader::question", error = %e, "generated quiz JSON rejected");
            return Vec::new();
        }
    };

    let total = items.len();
    let questions: Vec<Question> = items
        .into_iter()
        .enumerate()
        .filter_map(|(pos, item)| {
            serde_json::from_value::<QuestionWire>(item)
                .ok()
                .and_then(|w| w.validate(pos))
        })
        .collect();

    if questions.len() < total {
        debug!(
            target: "quiz_grader::question",
            kept = questions.len(),
            dropped = total - questions.len(),
            "invalid quiz items dropped"
        );
    }
    questions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fenced_array_and_drops_bad_items() {
        let raw = r#"```json
[
  {"id": "a", "type": "MCQ", "question": "Pick C", "options": ["A","B","C","D"], "answerIndex": 2, "page": 3},
  {"type": "ESSAY", "question": "dropped", "expectedAnswer": "x"},
  {"type": "MCQ", "question": "three options", "options": ["A","B","C"], "answerIndex": 0},
  {"type": "MCQ", "question": "index out of range", "options": ["A","B","C","D"], "answerIndex": 4},
  {"type": "one_word", "question": "Powerhouse of the cell?", "expectedAnswer": "Mitochondria"},
  {"type": "SAQ", "question": "no answer"},
  {"type": "laq", "text": "Discuss osmosis", "answer": "Movement of water"}
]
```"#;
        let qs = parse_questions(raw);
        assert_eq!(qs.len(), 3);
        assert_eq!(qs[0].id, "a");
        assert_eq!(qs[0].page, 3);
        assert!(matches!(
            qs[0].kind,
            QuestionKind::Mcq { answer_index: 2, .. }
        ));
        assert_eq!(qs[0].kind.expected_answer(), "C");
        assert_eq!(qs[1].id, "q5");
        assert_eq!(qs[1].question_type(), QuestionType::OneWord);
        assert_eq!(qs[2].question_type(), QuestionType::Laq);
        assert_eq!(qs[2].kind.expected_answer(), "Movement of water");
    }

    #[test]
    fn mcq_index_coerced_from_string_or_option_text() {
        let raw = r#"[
          {"type": "MCQ", "question": "q", "options": ["w","x","y","z"], "answerIndex": "1"},
          {"type": "MCQ", "question": "q", "options": ["w","x","y","z"], "expectedAnswer": "Z"}
        ]"#;
        let qs = parse_questions(raw);
        assert!(matches!(qs[0].kind, QuestionKind::Mcq { answer_index: 1, .. }));
        assert!(matches!(qs[1].kind, QuestionKind::Mcq { answer_index: 3, .. }));
    }

    #[test]
    fn fails_closed_on_garbage() {
        assert!(parse_questions("").is_empty());
        assert!(parse_questions("Sorry, I cannot help with that.").is_empty());
        assert!(parse_questions("[{\"type\": \"MCQ\",").is_empty());
        assert!(parse_questions("] nothing [").is_empty());
    }

    #[test]
    fn only_a_bare_array_is_accepted() {
        let item = r#"{"type": "SAQ", "question": "Define pH", "expectedAnswer": "Acidity measure"}"#;

        let qs = parse_questions(&format!("  [{item}]\n"));
        assert_eq!(qs.len(), 1);
        assert_eq!(qs[0].id, "q1");

        // Prose around the array, even with bracketed text, is rejected whole.
        assert!(parse_questions(&format!("See [1] below: [{item}]")).is_empty());
        assert!(parse_questions(&format!("[{item}] Hope this helps!")).is_empty());
        // Wrapper objects are not unwrapped.
        assert!(parse_questions(&format!(r#"{{"questions": [{item}], "note": "x"}}"#)).is_empty());
        // A fenced array with a stray trailing sentence is still rejected.
        assert!(parse_questions(&format!("```json\n[{item}]\n```\nDone.")).is_empty());
    }

    #[test]
    fn serializes_to_wire_shape() {
        let q = Question {
            id: "q1".into(),
            kind: QuestionKind::Mcq {
                options: ["a".into(), "b".into(), "c".into(), "d".into()],
                answer_index: 1,
            },
            text: "Pick b".into(),
            page: 2,
            explanation: String::new(),
        };
        let v = serde_json::to_value(&q).unwrap();
        assert_eq!(v["type"], "MCQ");
        assert_eq!(v["answerIndex"], 1);
        assert_eq!(v["options"][3], "d");
        assert!(v.get("expectedAnswer").is_none());

        // What is serialized parses back to the same question.
        let back = parse_questions(&serde_json::to_string(&vec![v]).unwrap());
        assert_eq!(back, vec![q]);
    }

    #[test]
    fn type_tags_are_lenient() {
        assert_eq!(QuestionType::from_tag("one-word"), Some(QuestionType::OneWord));
        assert_eq!(QuestionType::from_tag("Mcq"), Some(QuestionType::Mcq));
        assert_eq!(QuestionType::from_tag("TRUE_FALSE"), None);
    }
}
