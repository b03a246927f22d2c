//! Keyword topic buckets and difficulty heuristic for quiz questions.

use serde::{Deserialize, Serialize};

use crate::question::QuestionType;

pub const DEFAULT_TOPIC: &str = "General";

/// Fixed topic vocabulary. First bucket with the most keyword hits wins.
const TOPIC_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Mathematics",
        &[
            "equation", "integral", "derivative", "algebra", "geometry", "theorem", "matrix",
            "probability", "calculate", "fraction", "polynomial", "triangle", "angle",
        ],
    ),
    (
        "Physics",
        &[
            "force", "velocity", "acceleration", "energy", "momentum", "gravity", "newton",
            "electric", "magnetic", "wave", "quantum", "friction", "voltage",
        ],
    ),
    (
        "Chemistry",
        &[
            "atom", "molecule", "reaction", "acid", "base", "compound", "element", "bond",
            "periodic", "ion", "oxidation", "catalyst", "solution",
        ],
    ),
    (
        "Biology",
        &[
            "cell", "photosynthesis", "dna", "gene", "protein", "enzyme", "organism",
            "mitochondria", "evolution", "species", "tissue", "ecosystem", "respiration",
        ],
    ),
    (
        "Computer Science",
        &[
            "algorithm", "function", "variable", "database", "network", "compiler", "code",
            "program", "memory", "recursion", "array", "complexity", "software",
        ],
    ),
    (
        "History",
        &[
            "war", "empire", "revolution", "century", "king", "dynasty", "treaty", "ancient",
            "colonial", "independence", "civilization", "historical",
        ],
    ),
    (
        "Geography",
        &[
            "continent", "river", "mountain", "climate", "ocean", "country", "capital",
            "population", "latitude", "region", "desert",
        ],
    ),
    (
        "Literature",
        &[
            "poem", "novel", "author", "character", "metaphor", "theme", "poet", "narrative",
            "play", "literary", "verse",
        ],
    ),
    (
        "Economics",
        &[
            "market", "demand", "supply", "inflation", "price", "trade", "economy", "gdp",
            "tax", "investment", "cost",
        ],
    ),
];

/// Verbs that mark higher-order questions.
const COMPLEX_VERBS: &[&str] = &[
    "analyze", "analyse", "evaluate", "compare", "contrast", "justify", "critique", "assess",
    "synthesize", "derive", "prove", "discuss", "examine",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Self::Easy, Self::Medium, Self::Hard];
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

/// Topic bucket for `text`, or [`DEFAULT_TOPIC`] when no keyword matches.
pub fn classify_topic(text: &str) -> &'static str {
    let tokens: Vec<String> = words(text).collect();
    let mut best = (DEFAULT_TOPIC, 0usize);
    for (topic, keywords) in TOPIC_KEYWORDS {
        let hits = tokens
            .iter()
            .filter(|t| keywords.contains(&t.as_str()))
            .count();
        if hits > best.1 {
            best = (*topic, hits);
        }
    }
    best.0
}

/// LAQ, a complex verb or more than 50 words is hard; SAQ or more than 20 is medium.
pub fn classify_difficulty(qtype: QuestionType, text: &str) -> Difficulty {
    let tokens: Vec<String> = words(text).collect();
    let complex = tokens.iter().any(|t| COMPLEX_VERBS.contains(&t.as_str()));
    if qtype == QuestionType::Laq || complex || tokens.len() > 50 {
        Difficulty::Hard
    } else if qtype == QuestionType::Saq || tokens.len() > 20 {
        Difficulty::Medium
    } else {
        Difficulty::Easy
    }
}
