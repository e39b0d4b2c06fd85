//! Page index: from per-page text to one offset-addressable stream.
//!
//! Question markers are found in the concatenated full-document text, but
//! provenance (which physical pages a question touches) matters for the
//! recognition and figure stages. [`PageMap`] records where each page's text
//! landed in the concatenation so byte offsets can be mapped back to pages.
//!
//! Invariant: spans are contiguous, non-overlapping, in page order, and
//! together cover `[0, text.len())` exactly — each page contributes its text
//! plus one `\n` separator (so even an empty page occupies one byte and the
//! coverage invariant holds).

use crate::config::ExtractionConfig;
use crate::error::Pdf2BankError;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

/// Where one page's text sits in the concatenated document stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpan {
    /// Zero-based page index.
    pub page: usize,
    /// Inclusive start offset.
    pub start: usize,
    /// Exclusive end offset.
    pub end: usize,
}

/// Ordered page spans over the concatenated document text. Built once per
/// document, immutable, discarded after segmentation.
#[derive(Debug, Clone)]
pub struct PageMap {
    spans: Vec<PageSpan>,
    text_len: usize,
}

impl PageMap {
    /// Concatenate page texts (each followed by one `\n`) and record the
    /// cumulative offsets. Returns the full stream alongside its map.
    pub fn from_page_texts<I, S>(page_texts: I) -> (String, PageMap)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut full_text = String::new();
        let mut spans = Vec::new();
        for (page, text) in page_texts.into_iter().enumerate() {
            let start = full_text.len();
            full_text.push_str(text.as_ref());
            full_text.push('\n');
            spans.push(PageSpan {
                page,
                start,
                end: full_text.len(),
            });
        }
        let text_len = full_text.len();
        (full_text, PageMap { spans, text_len })
    }

    /// Pages whose `[start, end)` span intersects the half-open offset range
    /// `[start, end)`. A page entirely before `start` or entirely at/after
    /// `end` is excluded; an empty query range matches nothing.
    pub fn pages_overlapping(&self, start: usize, end: usize) -> Vec<usize> {
        self.spans
            .iter()
            .filter(|span| span.end > start && span.start < end)
            .map(|span| span.page)
            .collect()
    }

    pub fn spans(&self) -> &[PageSpan] {
        &self.spans
    }

    pub fn page_count(&self) -> usize {
        self.spans.len()
    }

    pub fn text_len(&self) -> usize {
        self.text_len
    }
}

/// Extract the native text layer of every page, in page order.
///
/// Runs inside `spawn_blocking` since pdfium is not async-safe. A page whose
/// text layer fails to load contributes an empty string (with a warning)
/// rather than aborting the document — the coverage invariant must hold for
/// segmentation to proceed.
pub async fn extract_page_texts(
    pdf_path: &Path,
    config: &ExtractionConfig,
) -> Result<Vec<String>, Pdf2BankError> {
    let path = pdf_path.to_path_buf();
    let password = config.password.clone();

    tokio::task::spawn_blocking(move || extract_page_texts_blocking(&path, password.as_deref()))
        .await
        .map_err(|e| Pdf2BankError::Internal(format!("Text extraction task panicked: {}", e)))?
}

fn extract_page_texts_blocking(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<Vec<String>, Pdf2BankError> {
    let pdfium = Pdfium::default();
    let document = super::open_document(&pdfium, pdf_path, password)?;

    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    let mut texts = Vec::with_capacity(pages.len() as usize);
    for (index, page) in pages.iter().enumerate() {
        match page.text() {
            Ok(text) => {
                let all = text.all();
                debug!("Page {}: {} bytes of native text", index + 1, all.len());
                texts.push(all);
            }
            Err(e) => {
                warn!("Page {}: text layer unavailable: {:?}", index + 1, e);
                texts.push(String::new());
            }
        }
    }

    if texts.iter().all(|t| t.trim().is_empty()) {
        debug!("No native text on any page; relying on recognition only");
    }

    Ok(texts)
}
