//! Text normalisation: strip layout artefacts from extracted page text.
//!
//! Native PDF text layers carry debris that is invisible on the page but
//! poisonous to parsing: bare page numbers on their own line, the exam's
//! running header repeated on every page, and ragged whitespace from the
//! extractor's line reconstruction. `clean` removes exactly those, keeps
//! everything else, and is idempotent: `clean(clean(x)) == clean(x)`, so
//! stages can re-clean already-merged text without drift.

use once_cell::sync::Lazy;
use regex::Regex;

/// A line that is nothing but digits — a stray page number.
static RE_PAGE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\s*$").unwrap());

/// The document's own running header ("ENEM 2023" and friends), repeated at
/// the top of every page by the layout.
static RE_RUNNING_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)ENEM\s+\d+").unwrap());

/// Clean a block of raw extracted text.
///
/// Line by line: blank lines are kept (they delimit paragraphs), page-number
/// and running-header lines are dropped, every other line is trimmed. Runs
/// of two or more blank lines then collapse to one, and leading/trailing
/// blanks are stripped.
pub fn clean(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for line in text.lines() {
        let stripped = line.trim();
        if stripped.is_empty() {
            lines.push("");
            continue;
        }
        if RE_PAGE_NUMBER.is_match(stripped) {
            continue;
        }
        if RE_RUNNING_HEADER.is_match(stripped) {
            continue;
        }
        lines.push(stripped);
    }

    let mut cleaned: Vec<&str> = Vec::with_capacity(lines.len());
    let mut previous_blank = false;
    for line in lines {
        if line.is_empty() {
            if !previous_blank {
                cleaned.push("");
            }
            previous_blank = true;
        } else {
            cleaned.push(line);
            previous_blank = false;
        }
    }

    cleaned.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_page_numbers_and_headers() {
        let input = "First line\n12\nENEM 2023\nSecond line";
        assert_eq!(clean(input), "First line\nSecond line");
    }

    #[test]
    fn header_match_is_case_insensitive() {
        assert_eq!(clean("keep\nenem 2019\nkeep too"), "keep\nkeep too");
    }

    #[test]
    fn digits_inside_a_sentence_survive() {
        assert_eq!(clean("Question about 42 things"), "Question about 42 things");
    }

    #[test]
    fn collapses_blank_runs_and_trims_edges() {
        let input = "\n\n  a  \n\n\n\nb\n\n";
        assert_eq!(clean(input), "a\n\nb");
    }

    #[test]
    fn preserves_single_paragraph_breaks() {
        assert_eq!(clean("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn empty_and_artefact_only_input() {
        assert_eq!(clean(""), "");
        assert_eq!(clean("7\n\nENEM 2020\n"), "");
    }

    #[test]
    fn clean_is_idempotent() {
        let inputs = [
            "First line\n12\nENEM 2023\nSecond line",
            "\n\n  a  \n\n\n\nb\n\n",
            "a\nb\n\nc",
            "",
            "   \n \n  ",
        ];
        for input in inputs {
            let once = clean(input);
            assert_eq!(clean(&once), once, "not idempotent for {input:?}");
        }
    }
}
