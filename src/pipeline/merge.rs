//! Recognition merge and the language-section filter.
//!
//! Page-level recognized text supplements a question only when the native
//! text layer did not already capture it: the merge is append-only, joined
//! by blank lines, and checks for substring presence against the question's
//! raw provenance slice so repeated runs never duplicate content.
//!
//! The filter encodes a document-specific rule: these exams open with an
//! English language section (questions 1–5 in the foreign-language block),
//! after which a parallel Spanish section repeats the same question numbers.
//! The pipeline targets the English section, so any question past the early
//! threshold whose raw text mentions the Spanish marker is excluded.

use crate::question::Question;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::info;

/// Questions numbered at or below this are always kept; the Spanish-section
/// marker is only meaningful past it.
pub const LANGUAGE_SECTION_THRESHOLD: u32 = 5;

/// Accented and unaccented spellings, any case.
static RE_SPANISH_SECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)espanhol|español").unwrap());

/// Append recognized page text to the question's passage when the native
/// extraction missed it.
///
/// For each of the question's pages, recognized text that is not already a
/// substring of `raw_text` is appended (blank-line joined, initialising the
/// passage when empty). Existing content is never removed or reordered.
pub fn merge_recognized(question: Question, recognized: &HashMap<usize, String>) -> Question {
    let mut passage = question.passage.clone();
    for page in &question.pages {
        let Some(text) = recognized.get(page) else {
            continue;
        };
        if text.is_empty() || question.raw_text.contains(text.as_str()) {
            continue;
        }
        if passage.is_empty() {
            passage = text.clone();
        } else {
            passage.push_str("\n\n");
            passage.push_str(text);
        }
    }
    Question { passage, ..question }
}

/// Whether this question belongs to the Spanish section the pipeline does
/// not target. Decided on `raw_text` alone — provenance no later stage
/// touches — so one application excludes the question for good no matter
/// what recognition or figure text was added on top.
pub fn is_spanish_section(question: &Question) -> bool {
    question.number > LANGUAGE_SECTION_THRESHOLD
        && RE_SPANISH_SECTION.is_match(&question.raw_text)
}

/// Drop Spanish-section questions, returning the survivors and the count of
/// exclusions.
pub fn filter_language_sections(questions: Vec<Question>) -> (Vec<Question>, usize) {
    let before = questions.len();
    let kept: Vec<Question> = questions
        .into_iter()
        .filter(|q| {
            if is_spanish_section(q) {
                info!("Excluding Spanish-section question {}", q.id());
                false
            } else {
                true
            }
        })
        .collect();
    let excluded = before - kept.len();
    (kept, excluded)
}
