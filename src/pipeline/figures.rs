//! Figure extraction: persist embedded raster images and fold their
//! recognized text into the question.
//!
//! Charts, cartoons, and scanned passages are often the entire substance of
//! a language question, so every embedded image on a question's pages is
//! saved under the exam's deterministic image directory and referenced from
//! the question by a root-relative path. Image-sourced recognized text is
//! appended to the passage unconditionally — raster content never appears
//! in the native text layer, so there is no substring check to make.
//!
//! Every per-image failure (decode, save, recognize) is logged and skipped;
//! only a document that cannot be reopened at all is fatal.

use crate::error::Pdf2BankError;
use crate::pipeline::normalize::clean;
use crate::pipeline::recognize::Recognizer;
use crate::progress::ProgressHandle;
use crate::question::Question;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Attach embedded figures to each question.
///
/// Blocking pdfium work; runs the whole batch inside one `spawn_blocking`
/// so the document is opened exactly once. Returns the enriched questions
/// and the number of images saved.
pub async fn attach_figures(
    pdf_path: &Path,
    questions: Vec<Question>,
    image_root: &Path,
    password: Option<String>,
    recognizer: Option<Arc<dyn Recognizer>>,
    progress: Option<ProgressHandle>,
) -> Result<(Vec<Question>, usize), Pdf2BankError> {
    let path = pdf_path.to_path_buf();
    let root = image_root.to_path_buf();

    tokio::task::spawn_blocking(move || {
        attach_figures_blocking(
            &path,
            questions,
            &root,
            password.as_deref(),
            recognizer.as_ref(),
            progress.as_ref(),
        )
    })
    .await
    .map_err(|e| Pdf2BankError::Internal(format!("Figure task panicked: {}", e)))?
}

fn attach_figures_blocking(
    pdf_path: &Path,
    questions: Vec<Question>,
    image_root: &Path,
    password: Option<&str>,
    recognizer: Option<&Arc<dyn Recognizer>>,
    progress: Option<&ProgressHandle>,
) -> Result<(Vec<Question>, usize), Pdf2BankError> {
    let pdfium = Pdfium::default();
    let document = super::open_document(&pdfium, pdf_path, password)?;
    let pages = document.pages();

    let mut saved_total = 0usize;
    let mut enriched = Vec::with_capacity(questions.len());

    for mut question in questions {
        let exam_dir = image_root.join(question.exam_code.image_subdir());
        if let Err(e) = std::fs::create_dir_all(&exam_dir) {
            warn!(
                "Cannot create image directory {}: {} — skipping figures for {}",
                exam_dir.display(),
                e,
                question.id()
            );
            if let Some(cb) = progress {
                cb.on_question_complete(&question.id(), 0);
            }
            enriched.push(question);
            continue;
        }

        let mut sequence = 1usize;
        let question_pages = question.pages.clone();
        for &page_index in &question_pages {
            let page = match pages.get(page_index as u16) {
                Ok(page) => page,
                Err(e) => {
                    warn!("Page {}: load failed, skipping its figures: {:?}", page_index + 1, e);
                    continue;
                }
            };

            for object in page.objects().iter() {
                let PdfPageObject::Image(ref image_object) = object else {
                    continue;
                };
                match extract_one(image_object) {
                    Ok(image) => {
                        let filename =
                            format!("{}_{}.png", question.id().to_lowercase(), sequence);
                        let file_path = exam_dir.join(&filename);
                        if let Err(e) = image.save_with_format(&file_path, image::ImageFormat::Png)
                        {
                            warn!("Failed to save figure {}: {}", file_path.display(), e);
                            continue;
                        }
                        let rel_path = question.exam_code.relative_image_path(&filename);
                        info!("Saved figure {} for question {}", rel_path, question.id());
                        question.images.push(rel_path);
                        sequence += 1;
                        saved_total += 1;

                        if let Some(recognizer) = recognizer {
                            append_recognized(&mut question, recognizer.as_ref(), &image);
                        }
                    }
                    Err(e) => {
                        warn!(
                            "Failed to extract figure from page {}: {}",
                            page_index + 1,
                            e
                        );
                    }
                }
            }
        }

        if let Some(cb) = progress {
            cb.on_question_complete(&question.id(), question.images.len());
        }
        enriched.push(question);
    }

    Ok((enriched, saved_total))
}

/// Decode one embedded image, flattening alpha/CMYK-like channel layouts
/// down to plain RGB so the PNG on disk is display-ready.
fn extract_one(image_object: &PdfPageImageObject) -> Result<DynamicImage, String> {
    let image = image_object
        .get_raw_image()
        .map_err(|e| format!("decode: {:?}", e))?;
    if image.color().channel_count() >= 4 {
        Ok(DynamicImage::ImageRgb8(image.to_rgb8()))
    } else {
        Ok(image)
    }
}

/// Image text goes straight into the passage — blank-line joined, same as
/// the page-level merge.
fn append_recognized(question: &mut Question, recognizer: &dyn Recognizer, image: &DynamicImage) {
    match recognizer.recognize(image) {
        Ok(text) => {
            let cleaned = clean(&text);
            if cleaned.is_empty() {
                return;
            }
            debug!(
                "Figure text ({} bytes) appended to {}",
                cleaned.len(),
                question.id()
            );
            if question.passage.is_empty() {
                question.passage = cleaned;
            } else {
                question.passage.push_str("\n\n");
                question.passage.push_str(&cleaned);
            }
        }
        Err(e) => warn!("Figure recognition failed for {}: {}", question.id(), e),
    }
}
