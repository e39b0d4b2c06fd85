//! Content parsing: separate passage, stem, and alternatives within one
//! raw question span.
//!
//! The layout convention in these exams is: an optional reading passage as
//! the first paragraph, the prompt, then lettered alternatives `A)`–`E)`
//! (or `A.`–`E.`) each starting its own line. Alternative bodies run until
//! the next letter marker and may span several lines or paragraphs; since
//! the `regex` crate has no look-ahead, bodies are sliced between successive
//! marker offsets, the same technique the segmenter uses for question
//! markers.
//!
//! Parsing never fails: malformed input simply yields fewer derived fields.

use crate::pipeline::normalize::clean;
use crate::question::Question;
use once_cell::sync::Lazy;
use regex::Regex;

/// Paragraph boundary: one or more blank lines (whitespace-only counts).
static RE_PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Line-leading alternative marker: a single uppercase A–E followed by `)`
/// or `.`.
static RE_ALTERNATIVE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^([A-E])[).]").unwrap());

/// Fill `passage`, `stem`, and `alternatives` from the raw span.
///
/// Pure transformation: consumes the raw question and returns it with the
/// derived fields populated. An empty (or artefact-only) span leaves all
/// three empty.
pub fn parse_content(question: Question) -> Question {
    let text = clean(&question.raw_text);
    if text.is_empty() {
        return question;
    }

    // First blank-line-delimited segment is the reading passage — but only
    // when something follows it; a lone paragraph is all prompt.
    let segments: Vec<&str> = RE_PARAGRAPH_BREAK
        .split(&text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    let (passage, remainder) = if segments.len() > 1 {
        (segments[0].to_string(), segments[1..].join("\n\n"))
    } else {
        (String::new(), text)
    };

    let markers: Vec<(usize, usize, char)> = RE_ALTERNATIVE
        .captures_iter(&remainder)
        .filter_map(|caps| {
            let m = caps.get(0)?;
            let letter = caps[1].chars().next()?;
            Some((m.start(), m.end(), letter))
        })
        .collect();

    let mut alternatives = Vec::with_capacity(markers.len());
    for (index, &(_, body_start, letter)) in markers.iter().enumerate() {
        let body_end = markers
            .get(index + 1)
            .map(|&(next_start, _, _)| next_start)
            .unwrap_or(remainder.len());
        let body = clean(&remainder[body_start..body_end]);
        alternatives.push(format!("{}) {}", letter, body));
    }

    let stem = match markers.first() {
        Some(&(first_start, _, _)) => clean(&remainder[..first_start]),
        None => clean(&remainder),
    };

    Question {
        passage,
        stem,
        alternatives,
        ..question
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exam::ExamCode;

    fn raw(text: &str) -> Question {
        Question::raw(1, ExamCode::new("ENEM23_F2"), vec![0], text.to_string())
    }

    #[test]
    fn alternatives_keep_document_order() {
        let q = parse_content(raw("A) one\nB) two\nC) three"));
        assert_eq!(q.alternatives, vec!["A) one", "B) two", "C) three"]);
        assert_eq!(q.passage, "");
        assert_eq!(q.stem, "");
    }

    #[test]
    fn first_paragraph_becomes_passage() {
        let q = parse_content(raw("Intro paragraph.\n\nQuestion stem here.\nA) x\nB) y"));
        assert_eq!(q.passage, "Intro paragraph.");
        assert_eq!(q.stem, "Question stem here.");
        assert_eq!(q.alternatives, vec!["A) x", "B) y"]);
    }

    #[test]
    fn single_paragraph_is_all_stem() {
        let q = parse_content(raw("Just a prompt with no options."));
        assert_eq!(q.passage, "");
        assert_eq!(q.stem, "Just a prompt with no options.");
        assert!(q.alternatives.is_empty());
    }

    #[test]
    fn dot_markers_and_multiline_bodies() {
        let q = parse_content(raw(
            "Stem.\n\nA. first line\nof the same option\nB. second option",
        ));
        assert_eq!(q.passage, "Stem.");
        assert_eq!(
            q.alternatives,
            vec!["A) first line\nof the same option", "B) second option"]
        );
    }

    #[test]
    fn skipped_or_repeated_letters_are_preserved_faithfully() {
        let q = parse_content(raw("prompt\nA) one\nC) three\nC) three again"));
        assert_eq!(q.alternatives, vec!["A) one", "C) three", "C) three again"]);
        assert_eq!(q.stem, "prompt");
    }

    #[test]
    fn marker_must_lead_the_line() {
        // "B)" mid-line is option text, not a new alternative.
        let q = parse_content(raw("stem\nA) pick A or B) maybe\nC) other"));
        assert_eq!(q.alternatives, vec!["A) pick A or B) maybe", "C) other"]);
    }

    #[test]
    fn empty_raw_text_leaves_fields_empty() {
        let q = parse_content(raw(""));
        assert_eq!(q.passage, "");
        assert_eq!(q.stem, "");
        assert!(q.alternatives.is_empty());

        // Artefact-only spans clean down to nothing too.
        let q = parse_content(raw("12\nENEM 2023"));
        assert_eq!(q.stem, "");
        assert!(q.alternatives.is_empty());
    }

    #[test]
    fn artefacts_inside_bodies_are_cleaned() {
        let q = parse_content(raw("Read this.\n\nstem\nA) option\n7\nB) other\nENEM 2023"));
        assert_eq!(q.alternatives, vec!["A) option", "B) other"]);
    }
}
