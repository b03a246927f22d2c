//! Fuzzy lexical overlap and the prefix heuristic.

use std::collections::BTreeSet;

/// Distinct lowercase words longer than two characters.
pub fn words(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 2)
        .map(str::to_lowercase)
        .collect()
}

/// Whether the Levenshtein distance between `a` and `b` is at most 1.
pub fn within_one_edit(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
    if long.len() - short.len() > 1 {
        return false;
    }

    let mut i = 0;
    while i < short.len() && short[i] == long[i] {
        i += 1;
    }
    if short.len() == long.len() {
        // One substitution.
        short[i + 1..] == long[i + 1..]
    } else {
        // One insertion into `short`.
        short[i..] == long[i + 1..]
    }
}

/// `matches / sqrt(|A| * |B|)` over distinct word sets, capped at 1.
///
/// A query word matches when any chunk word is within one edit of it.
pub fn fuzzy_overlap(query_words: &BTreeSet<String>, chunk_words: &BTreeSet<String>) -> f32 {
    if query_words.is_empty() || chunk_words.is_empty() {
        return 0.0;
    }
    let matches = query_words
        .iter()
        .filter(|q| chunk_words.contains(*q) || chunk_words.iter().any(|c| within_one_edit(q, c)))
        .count();
    let denom = ((query_words.len() * chunk_words.len()) as f32).sqrt();
    (matches as f32 / denom).min(1.0)
}

/// Lowercase, whitespace-collapsed form used by the prefix heuristic.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Whether the first `n` characters of either normalized text occur in the other.
///
/// A text shorter than `n` characters contributes no prefix.
pub fn prefix_match(a: &str, b: &str, n: usize) -> bool {
    let contains_prefix = |src: &str, hay: &str| {
        if n == 0 || src.chars().count() < n {
            return false;
        }
        let prefix: String = src.chars().take(n).collect();
        hay.contains(&prefix)
    };
    contains_prefix(a, b) || contains_prefix(b, a)
}
