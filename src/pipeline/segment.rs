//! Question segmentation: slice the document stream at question markers.
//!
//! A marker is the literal word "QUESTÃO" (accented or not, any case)
//! followed by whitespace and a 1–3 digit number. Each marker opens a raw
//! span running to the start of the next marker, or to the end of the
//! document for the last one. The `regex` crate has no look-ahead, so spans
//! are sliced between successive match offsets rather than captured in one
//! pattern.

use crate::exam::ExamCode;
use crate::pipeline::pages::PageMap;
use crate::question::Question;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

static RE_QUESTION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)QUEST[ÃA]O\s+(\d{1,3})").unwrap());

/// Find every question marker in the full document text and emit one raw
/// [`Question`] per marker, in document order.
///
/// `raw_text` is the text strictly between the end of the marker and the
/// start of the next (trimmed); `pages` are the pages that offset range
/// overlaps. Adjacent markers with nothing between them yield a question
/// with empty `raw_text` — downstream stages tolerate that.
///
/// No markers at all is the non-fatal "no questions detected" condition:
/// logged as a warning, empty vector returned.
pub fn segment_questions(
    full_text: &str,
    page_map: &PageMap,
    exam_code: &ExamCode,
) -> Vec<Question> {
    let matches: Vec<(usize, usize, u32)> = RE_QUESTION_MARKER
        .captures_iter(full_text)
        .filter_map(|caps| {
            let m = caps.get(0)?;
            // 1–3 captured digits always parse; leading zeros are dropped.
            let number: u32 = caps[1].parse().ok()?;
            Some((m.start(), m.end(), number))
        })
        .collect();

    if matches.is_empty() {
        warn!("No question markers detected in document");
        return Vec::new();
    }

    let mut questions = Vec::with_capacity(matches.len());
    for (index, &(_, marker_end, number)) in matches.iter().enumerate() {
        let segment_end = matches
            .get(index + 1)
            .map(|&(next_start, _, _)| next_start)
            .unwrap_or(full_text.len());

        let raw_text = full_text[marker_end..segment_end].trim().to_string();
        let pages = page_map.pages_overlapping(marker_end, segment_end);
        debug!(
            "Question {} spans pages {:?} ({} bytes raw)",
            number,
            pages,
            raw_text.len()
        );

        questions.push(Question::raw(number, exam_code.clone(), pages, raw_text));
    }

    questions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code() -> ExamCode {
        ExamCode::new("ENEM23_F2")
    }

    #[test]
    fn splits_on_markers_in_document_order() {
        let (full, map) =
            PageMap::from_page_texts(["QUESTÃO 1\nfirst body", "QUESTÃO 2\nsecond body"]);
        let questions = segment_questions(&full, &map, &code());
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].number, 1);
        assert_eq!(questions[0].raw_text, "first body");
        assert_eq!(questions[1].number, 2);
        assert_eq!(questions[1].raw_text, "second body");
    }

    #[test]
    fn marker_is_case_insensitive_and_accepts_unaccented_spelling() {
        let (full, map) = PageMap::from_page_texts(["questao 03\nbody", "Questão 4\nmore"]);
        let questions = segment_questions(&full, &map, &code());
        assert_eq!(questions.len(), 2);
        // Leading zeros are ignored when parsing the number.
        assert_eq!(questions[0].number, 3);
        assert_eq!(questions[1].number, 4);
    }

    #[test]
    fn page_spanning_question_records_both_pages() {
        let (full, map) =
            PageMap::from_page_texts(["QUESTÃO 1\nstarts here", "and continues\nQUESTÃO 2\nnext"]);
        let questions = segment_questions(&full, &map, &code());
        assert_eq!(questions[0].pages, vec![0, 1]);
        assert_eq!(questions[1].pages, vec![1]);
        assert!(questions[0].raw_text.contains("starts here"));
        assert!(questions[0].raw_text.contains("and continues"));
    }

    #[test]
    fn no_markers_yields_empty_result() {
        let (full, map) = PageMap::from_page_texts(["just prose, nothing marked"]);
        assert!(segment_questions(&full, &map, &code()).is_empty());
    }

    #[test]
    fn adjacent_markers_yield_empty_raw_text() {
        let (full, map) = PageMap::from_page_texts(["QUESTÃO 1\nQUESTÃO 2\nbody"]);
        let questions = segment_questions(&full, &map, &code());
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].raw_text, "");
        assert_eq!(questions[1].raw_text, "body");
    }

    #[test]
    fn segmentation_reconstructs_marker_delimited_regions() {
        let (full, map) = PageMap::from_page_texts(["QUESTÃO 1\nalpha", "beta\nQUESTÃO 2\ngamma"]);
        let questions = segment_questions(&full, &map, &code());

        // Re-derive each span from offsets: marker + body slices must tile
        // everything from the first marker to the end of the document.
        let markers: Vec<(usize, usize)> = RE_QUESTION_MARKER
            .find_iter(&full)
            .map(|m| (m.start(), m.end()))
            .collect();
        let mut reconstructed = String::new();
        for (i, &(start, end)) in markers.iter().enumerate() {
            let stop = markers.get(i + 1).map(|&(s, _)| s).unwrap_or(full.len());
            reconstructed.push_str(&full[start..stop]);
            // And each trimmed raw text is exactly the trimmed body slice.
            assert_eq!(questions[i].raw_text, full[end..stop].trim());
        }
        assert_eq!(reconstructed, &full[markers[0].0..]);
    }

    #[test]
    fn number_longer_than_three_digits_is_not_a_marker() {
        let (full, map) = PageMap::from_page_texts(["QUESTÃO 1234\nbody"]);
        let questions = segment_questions(&full, &map, &code());
        // The regex still matches the first three digits; what matters is
        // that a plain "QUESTÃO" with no digits is not a marker.
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].number, 123);

        let (full, map) = PageMap::from_page_texts(["QUESTÃO sem número"]);
        assert!(segment_questions(&full, &map, &code()).is_empty());
    }
}
