//! Intent routing: picks the `(system, prompt)` pair for a question.
//!
//! Priority order, first match wins: greeting, no document in scope, weak or
//! empty retrieval, code explanation, document overview, summary, grounded QA.

use doc_rag::AssembledContext;

use crate::{
    api_types::{AnswerDepth, Intent},
    intent::{is_document_overview, is_explain_code, is_greeting, is_summarize},
};

const GREETING_SYSTEM: &str = "You are a friendly study assistant. Reply warmly in one or two \
sentences and offer to help with the user's documents or questions.";

const CODE_SYSTEM: &str = "You are a patient programming tutor. Explain the code found in the \
provided document excerpts. Quote the relevant lines verbatim, then explain what they do step \
by step, mentioning the page they appear on.";

const OVERVIEW_SYSTEM: &str = "You are a study assistant describing a document. List its main \
topics and sections in reading order, with a short description of each and natural page \
references such as (page 3).";

const SUMMARY_SYSTEM: &str = "You are a study assistant. Write a faithful summary of the provided \
document excerpts. Keep the original structure, highlight key terms and cite pages naturally.";

/// A routed prompt ready for generation.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedPrompt {
    pub intent: Intent,
    pub system: String,
    pub prompt: String,
}

fn length_hint(depth: AnswerDepth) -> &'static str {
    match depth {
        AnswerDepth::InDepth => "Answer in depth, in 4 to 8 well-structured paragraphs.",
        AnswerDepth::Standard => "Answer in 2 to 4 concise paragraphs.",
    }
}

fn general_system(depth: AnswerDepth) -> String {
    format!(
        "You are a knowledgeable study assistant. Answer from general knowledge, accurately \
and clearly, with examples where helpful. {}",
        length_hint(depth)
    )
}

fn general_with_document_system(depth: AnswerDepth) -> String {
    format!(
        "You are a knowledgeable study assistant. The user has a document open, but it does not \
appear to cover this question. Say briefly that the document does not address it, then answer \
from general knowledge. {}",
        length_hint(depth)
    )
}

fn grounded_system(depth: AnswerDepth) -> String {
    format!(
        "You are a study assistant answering questions about the user's document. First state \
what the document says, with natural page references such as (page 4). Then add a short \
elaboration from general knowledge, clearly separated. If the excerpts do not contain the \
answer, say so. {}",
        length_hint(depth)
    )
}

/// Chooses the prompt branch for `question`.
///
/// `has_document` is whether a specific document is in scope; `ctx` is the
/// assembled retrieval for it (empty when nothing was retrieved).
pub fn route(
    question: &str,
    has_document: bool,
    ctx: &AssembledContext,
    depth: AnswerDepth,
    max_ctx_chars: usize,
) -> RoutedPrompt {
    let question = question.trim();

    if is_greeting(question) {
        return RoutedPrompt {
            intent: Intent::Greeting,
            system: GREETING_SYSTEM.to_string(),
            prompt: question.to_string(),
        };
    }

    if !has_document {
        return RoutedPrompt {
            intent: Intent::General,
            system: general_system(depth),
            prompt: question_only(question),
        };
    }

    let context = context_block(&ctx.context_text, max_ctx_chars);

    if ctx.is_empty() || ctx.average_score <= 0.0 {
        return RoutedPrompt {
            intent: Intent::GeneralWithDocument,
            system: general_with_document_system(depth),
            prompt: with_context(question, &context),
        };
    }

    let (intent, system) = if is_explain_code(question) {
        (Intent::ExplainCode, CODE_SYSTEM.to_string())
    } else if is_document_overview(question) {
        (Intent::DocumentOverview, OVERVIEW_SYSTEM.to_string())
    } else if is_summarize(question) {
        (Intent::Summarize, SUMMARY_SYSTEM.to_string())
    } else {
        (Intent::GroundedQa, grounded_system(depth))
    };

    RoutedPrompt {
        intent,
        system,
        prompt: with_context(question, &context),
    }
}

fn question_only(question: &str) -> String {
    format!("Question:\n{question}\n")
}

fn with_context(question: &str, context: &str) -> String {
    if context.is_empty() {
        return question_only(question);
    }
    format!("Document excerpts:\n{context}\n\nQuestion:\n{question}\n")
}

/// Context text clamped to `max_chars` bytes on a char boundary.
fn context_block(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.len() <= max_chars {
        return text.to_string();
    }
    let mut out = safe_truncate(text, max_chars).to_string();
    out.push_str("\n…");
    out
}

fn safe_truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        s
    } else {
        let mut end = max;
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        &s[..end]
    }
}

#[cfg(test)]
mod tests {
    use doc_rag::{Citation, MergedPassage};

    use super::*;

    fn ctx(score: f32) -> AssembledContext {
        AssembledContext {
            context_text: "[Notes, page 2]\nfn main() { println!(\"hi\"); }".into(),
            passages: vec![MergedPassage {
                document_id: "d".into(),
                title: "Notes".into(),
                start_index: 0,
                end_index: 0,
                start_page: 2,
                end_page: 2,
                text: "fn main() {}".into(),
                score,
            }],
            citations: vec![Citation {
                document_id: "d".into(),
                title: "Notes".into(),
                page: 2,
                snippet: "fn main".into(),
            }],
            average_score: score,
            top_score: score,
        }
    }

    #[test]
    fn greeting_wins_even_with_document() {
        let r = route("hey there", true, &ctx(0.9), AnswerDepth::Standard, 1000);
        assert_eq!(r.intent, Intent::Greeting);
        assert!(!r.prompt.contains("Document excerpts"));
    }

    #[test]
    fn no_document_uses_depth() {
        let std = route("What is DNA?", false, &ctx(0.9), AnswerDepth::Standard, 1000);
        let deep = route("What is DNA?", false, &ctx(0.9), AnswerDepth::InDepth, 1000);
        assert_eq!(std.intent, Intent::General);
        assert!(std.system.contains("2 to 4"));
        assert!(deep.system.contains("4 to 8"));
        assert!(!std.prompt.contains("fn main"));
    }

    #[test]
    fn weak_retrieval_falls_back_to_general() {
        let r = route("What is DNA?", true, &AssembledContext::default(), AnswerDepth::Standard, 1000);
        assert_eq!(r.intent, Intent::GeneralWithDocument);
        let r = route("What is DNA?", true, &ctx(0.0), AnswerDepth::Standard, 1000);
        assert_eq!(r.intent, Intent::GeneralWithDocument);
    }

    #[test]
    fn document_branches_in_priority_order() {
        let c = ctx(0.5);
        let pick = |q: &str| route(q, true, &c, AnswerDepth::Standard, 1000).intent;
        assert_eq!(pick("Explain the code in the document"), Intent::ExplainCode);
        assert_eq!(pick("What's in the document?"), Intent::DocumentOverview);
        assert_eq!(pick("Summarize the code"), Intent::Summarize);
        assert_eq!(pick("Where is main defined?"), Intent::GroundedQa);
    }

    #[test]
    fn grounded_prompt_embeds_context_verbatim() {
        let r = route("Explain code here", true, &ctx(0.5), AnswerDepth::Standard, 1000);
        assert!(r.prompt.contains("println!(\"hi\")"));
        assert!(r.prompt.ends_with("Question:\nExplain code here\n"));
    }

    #[test]
    fn context_is_clamped_on_char_boundary() {
        let out = context_block("ééééé", 3);
        assert_eq!(out, "é\n…");
    }
}
