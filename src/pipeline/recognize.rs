//! Recognition: derive text from rasterised pages and figures.
//!
//! The engine sits behind the [`Recognizer`] trait so the pipeline never
//! depends on a particular OCR backend. The bundled implementation shells
//! out to the `tesseract` executable, a single call per image with no
//! retries: a page that fails recognition simply contributes no text.
//!
//! Recognition is read-only with respect to document state and has no
//! ordering dependency between pages, so [`collect_page_text`] runs the
//! calls in a bounded concurrent pool and collates results back into a
//! page-number-keyed map before the merge stage reads it.

use crate::pipeline::normalize::clean;
use futures::stream::{self, StreamExt};
use image::DynamicImage;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// A failed recognition call. Never fatal to a document run.
#[derive(Debug, Error)]
#[error("recognition failed: {0}")]
pub struct RecognizeError(pub String);

/// The OCR collaborator boundary: an image in, recognized text out.
///
/// Implementations must be `Send + Sync`; page recognition runs them from a
/// concurrent pool of blocking tasks.
pub trait Recognizer: Send + Sync {
    /// Recognize the text content of one image. Empty output is a valid
    /// result (a figure with no text).
    fn recognize(&self, image: &DynamicImage) -> Result<String, RecognizeError>;

    /// Human-readable engine name, for logs.
    fn name(&self) -> &str {
        "recognizer"
    }
}

/// [`Recognizer`] backed by the `tesseract` command-line executable.
///
/// The image is written to a temporary PNG and `tesseract <file> stdout -l
/// <languages>` is invoked once. Defaults to the `por+eng` language pack —
/// the exams mix Portuguese instructions with English passages.
pub struct TesseractRecognizer {
    binary: PathBuf,
    languages: String,
}

impl TesseractRecognizer {
    pub fn new() -> Self {
        TesseractRecognizer {
            binary: PathBuf::from("tesseract"),
            languages: "por+eng".to_string(),
        }
    }

    /// Use a non-default tesseract binary (e.g. a pinned build).
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Override the language packs, e.g. `"por"` or `"eng"`.
    pub fn with_languages(mut self, languages: impl Into<String>) -> Self {
        self.languages = languages.into();
        self
    }

    /// Probe for a working `tesseract` on PATH. Returns `None` (rather than
    /// erroring) when absent so the pipeline can run text-layer-only.
    pub fn detect() -> Option<Self> {
        let candidate = Self::new();
        match Command::new(&candidate.binary).arg("--version").output() {
            Ok(output) if output.status.success() => {
                let version = String::from_utf8_lossy(&output.stdout);
                debug!(
                    "Detected tesseract: {}",
                    version.lines().next().unwrap_or("unknown version")
                );
                Some(candidate)
            }
            _ => None,
        }
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Recognizer for TesseractRecognizer {
    fn recognize(&self, image: &DynamicImage) -> Result<String, RecognizeError> {
        let tmp = tempfile::Builder::new()
            .prefix("pdf2bank-ocr-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| RecognizeError(format!("temp file: {}", e)))?;

        image
            .save_with_format(tmp.path(), image::ImageFormat::Png)
            .map_err(|e| RecognizeError(format!("image encode: {}", e)))?;

        let output = Command::new(&self.binary)
            .arg(tmp.path())
            .arg("stdout")
            .args(["-l", &self.languages])
            .output()
            .map_err(|e| RecognizeError(format!("spawn {}: {}", self.binary.display(), e)))?;

        if !output.status.success() {
            return Err(RecognizeError(format!(
                "tesseract exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn name(&self) -> &str {
        "tesseract"
    }
}

/// Run the recognizer over rendered pages and collate non-empty cleaned
/// text into a `page → text` map.
///
/// Calls run on `spawn_blocking` threads, at most `concurrency` in flight.
/// A page whose call fails or yields only whitespace is dropped from the
/// map with a warning.
pub async fn collect_page_text(
    recognizer: Arc<dyn Recognizer>,
    rendered: Vec<(usize, DynamicImage)>,
    concurrency: usize,
) -> HashMap<usize, String> {
    let results: Vec<(usize, Result<Result<String, RecognizeError>, tokio::task::JoinError>)> =
        stream::iter(rendered.into_iter().map(|(page, image)| {
            let recognizer = Arc::clone(&recognizer);
            async move {
                let result =
                    tokio::task::spawn_blocking(move || recognizer.recognize(&image)).await;
                (page, result)
            }
        }))
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut recognized = HashMap::new();
    for (page, result) in results {
        match result {
            Ok(Ok(text)) => {
                let cleaned = clean(&text);
                if cleaned.is_empty() {
                    debug!("Page {}: recognition produced no usable text", page + 1);
                } else {
                    debug!("Page {}: recognized {} bytes", page + 1, cleaned.len());
                    recognized.insert(page, cleaned);
                }
            }
            Ok(Err(e)) => warn!("Page {}: {}", page + 1, e),
            Err(e) => warn!("Page {}: recognition task panicked: {}", page + 1, e),
        }
    }
    recognized
}
