//! Parsing of grader verdict tokens.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Judgement returned by the LLM grader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Correct,
    Partial,
    Incorrect,
}

impl Verdict {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "CORRECT" => Some(Self::Correct),
            "PARTIAL" => Some(Self::Partial),
            "INCORRECT" => Some(Self::Incorrect),
            _ => None,
        }
    }
}

static VERDICT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(INCORRECT|PARTIAL|CORRECT)\b").expect("valid regex"));

/// Reads a verdict from raw grader output.
///
/// The first whitespace token, upper-cased with punctuation stripped, wins.
/// Otherwise the first label found anywhere in the upper-cased output is
/// used. Anything else is `Incorrect`.
pub fn parse_verdict(raw: &str) -> Verdict {
    let first = raw
        .split_whitespace()
        .next()
        .map(|t| {
            t.chars()
                .filter(|c| c.is_ascii_alphabetic())
                .collect::<String>()
                .to_ascii_uppercase()
        })
        .and_then(|t| Verdict::from_token(&t));
    if let Some(v) = first {
        return v;
    }

    let upper = raw.to_ascii_uppercase();
    VERDICT_RE
        .captures(&upper)
        .and_then(|c| c.get(1))
        .and_then(|m| Verdict::from_token(m.as_str()))
        .unwrap_or(Verdict::Incorrect)
}
