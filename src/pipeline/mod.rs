//! Pipeline stages for question-bank extraction.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets us swap
//! implementations (e.g. a different recognition engine) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ pages ──▶ segment ──▶ parse ──▶ merge ──▶ figures
//! (path/URL) (text+map) (raw spans) (content)  (OCR)    (images)
//!                          ▲                    ▲
//!                     normalize          render+recognize
//! ```
//!
//! 1. [`input`]     — canonicalise the user-supplied path or URL to a local file
//! 2. [`pages`]     — extract per-page text and build the offset→page map;
//!    runs in `spawn_blocking` because pdfium is not async-safe
//! 3. [`segment`]   — slice the full text into one raw question per marker
//! 4. [`normalize`] — artefact cleanup shared by every text-bearing stage
//! 5. [`parse`]     — split each span into passage / stem / alternatives
//! 6. [`render`]    — rasterise the pages touched by any question
//! 7. [`recognize`] — OCR those renders in a bounded concurrent pool
//! 8. [`merge`]     — fold recognized text in, apply the language filter
//! 9. [`figures`]   — persist embedded images and their recognized text

pub mod figures;
pub mod input;
pub mod merge;
pub mod normalize;
pub mod pages;
pub mod parse;
pub mod recognize;
pub mod render;
pub mod segment;

use crate::error::Pdf2BankError;
use pdfium_render::prelude::*;
use std::path::Path;

/// Open a document, mapping pdfium's opaque load failure onto the
/// password/corruption error taxonomy. Shared by every stage that needs its
/// own document handle (text extraction, rendering, figure enumeration).
pub(crate) fn open_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, Pdf2BankError> {
    pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                Pdf2BankError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                Pdf2BankError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            Pdf2BankError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}
