//! Progress-callback trait for per-question extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgress>`] via
//! [`crate::config::ExtractionConfigBuilder::progress`] to receive events
//! as the pipeline runs. Callbacks are the least-invasive integration
//! point: the CLI forwards them to an indicatif progress bar; a host
//! application could forward them to a channel or a database record. The
//! trait is `Send + Sync` because the figure stage runs on a blocking
//! thread.

use std::sync::Arc;

/// Called by the extraction pipeline as it progresses through a document.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ExtractionProgress: Send + Sync {
    /// Called once after segmentation, with the number of questions found.
    fn on_extraction_start(&self, total_questions: usize) {
        let _ = total_questions;
    }

    /// Called before page recognition begins, with the number of pages that
    /// will be rendered and recognized.
    fn on_recognition_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called when one question has passed through every stage.
    ///
    /// # Arguments
    /// * `id`     — the question's stable identifier
    /// * `images` — number of figures attached to it
    fn on_question_complete(&self, id: &str, images: usize) {
        let _ = (id, images);
    }

    /// Called once at the end of the run.
    ///
    /// # Arguments
    /// * `emitted`  — questions in the final output
    /// * `excluded` — questions dropped by the language-section filter
    fn on_extraction_complete(&self, emitted: usize, excluded: usize) {
        let _ = (emitted, excluded);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgress;

impl ExtractionProgress for NoopProgress {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressHandle = Arc<dyn ExtractionProgress>;
