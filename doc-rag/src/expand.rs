//! Query expansion by whole-word rewrites.

use std::sync::LazyLock;

use regex::Regex;

/// `(pattern, replacement)` pairs, applied one at a time to the original query.
const REWRITE_RULES: [(&str, &str); 3] = [
    (r"(?i)\b(?:define|meaning|what\s+is)\b", "explain"),
    (r"(?i)\bhow\b", "method"),
    (r"(?i)\bwhy\b", "reason"),
];

static RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    REWRITE_RULES
        .iter()
        .map(|(pat, rep)| (Regex::new(pat).expect("valid regex"), *rep))
        .collect()
});

/// Returns the original query followed by each rewrite that changed it.
///
/// Duplicates are removed; order is kept.
pub fn expand_query(query: &str) -> Vec<String> {
    let original = query.trim().to_string();
    let mut out = vec![original.clone()];
    for (re, rep) in RULES.iter() {
        if re.is_match(&original) {
            let rewritten = re.replace_all(&original, *rep).into_owned();
            if !out.contains(&rewritten) {
                out.push(rewritten);
            }
        }
    }
    out
}
