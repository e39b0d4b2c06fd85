//! Output types: the reconstructed questions plus run statistics.

use crate::exam::ExamCode;
use crate::question::Question;
use serde::Serialize;

/// The result of one extraction run.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionOutput {
    /// The exam code all questions in this run belong to.
    pub exam_code: ExamCode,
    /// Final question records, in document order, after the
    /// language-section filter.
    pub questions: Vec<Question>,
    /// Counters and timings for the run.
    pub stats: ExtractionStats,
}

/// Counters and timings for one extraction run.
///
/// A successful run can still have skipped work (failed recognitions,
/// undecodable figures); the counters here are how callers see that
/// without digging through logs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionStats {
    /// Pages in the source document.
    pub total_pages: usize,
    /// Questions found by the segmenter.
    pub questions_detected: usize,
    /// Questions dropped by the language-section filter.
    pub questions_excluded: usize,
    /// Questions in the final output.
    pub questions_emitted: usize,
    /// Pages that contributed recognized text.
    pub recognized_pages: usize,
    /// Figures saved to the image root.
    pub images_saved: usize,
    /// Wall-clock duration of the whole run.
    pub total_duration_ms: u64,
    /// Time spent rendering and recognizing pages.
    pub recognition_duration_ms: u64,
    /// Time spent extracting and saving figures.
    pub figure_duration_ms: u64,
}
