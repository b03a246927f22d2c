//! Question classifiers used by the prompt router.

use std::sync::LazyLock;

use regex::Regex;

/// Exact phrases (after normalization) treated as greetings or small talk.
const GREETINGS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "hiya",
    "yo",
    "hi there",
    "hello there",
    "hey there",
    "good morning",
    "good afternoon",
    "good evening",
    "how are you",
    "how are you doing",
    "whats up",
    "sup",
    "greetings",
    "thanks",
    "thank you",
    "thanks a lot",
    "ok",
    "okay",
    "bye",
    "goodbye",
];

static EXPLAIN_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:explain|describe|walk\s+me\s+through)\b.*\bcode\b")
        .expect("valid regex")
});

static DOCUMENT_OVERVIEW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:what'?s|what\s+is)\s+in\s+(?:the|this|my)\s+(?:document|doc|file|pdf)\b|\bshow\s+me\s+(?:the|this|my)\s+(?:document|doc|file|pdf)\b",
    )
    .expect("valid regex")
});

static SUMMARIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:summari[sz]e|summary)\b").expect("valid regex")
});

/// Lowercase, apostrophes removed, other punctuation turned into spaces.
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| *c != '\'' && *c != '’')
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn is_greeting(question: &str) -> bool {
    let n = normalize(question);
    GREETINGS.contains(&n.as_str())
}

pub fn is_explain_code(question: &str) -> bool {
    EXPLAIN_CODE.is_match(question)
}

pub fn is_document_overview(question: &str) -> bool {
    DOCUMENT_OVERVIEW.is_match(question)
}

pub fn is_summarize(question: &str) -> bool {
    SUMMARIZE.is_match(question)
}
