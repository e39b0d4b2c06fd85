//! Page rasterisation: render pages to `DynamicImage` via pdfium, feeding
//! the recognition stage.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async
//! contexts. `tokio::task::spawn_blocking` moves the work onto the blocking
//! thread pool so Tokio workers never stall on CPU-heavy rendering.
//!
//! ## Why cap pixels, not DPI?
//!
//! Page sizes vary; capping the longest rendered edge keeps memory bounded
//! regardless of physical page size while staying well inside what the
//! recognition engine needs for sharp glyphs.

use crate::config::ExtractionConfig;
use crate::error::Pdf2BankError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, warn};

/// Rasterise the given pages of a PDF into images.
///
/// Returns `(page_index_0based, DynamicImage)` pairs for the pages that
/// rendered. A single page failing to render is skipped with a warning —
/// it merely contributes no recognized text downstream.
pub async fn render_pages(
    pdf_path: &Path,
    config: &ExtractionConfig,
    page_indices: &[usize],
) -> Result<Vec<(usize, DynamicImage)>, Pdf2BankError> {
    let path = pdf_path.to_path_buf();
    let max_pixels = config.max_rendered_pixels;
    let password = config.password.clone();
    let indices = page_indices.to_vec();

    tokio::task::spawn_blocking(move || {
        render_pages_blocking(&path, max_pixels, password.as_deref(), &indices)
    })
    .await
    .map_err(|e| Pdf2BankError::Internal(format!("Render task panicked: {}", e)))?
}

fn render_pages_blocking(
    pdf_path: &Path,
    max_pixels: u32,
    password: Option<&str>,
    page_indices: &[usize],
) -> Result<Vec<(usize, DynamicImage)>, Pdf2BankError> {
    let pdfium = Pdfium::default();
    let document = super::open_document(&pdfium, pdf_path, password)?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;

    let render_config = PdfRenderConfig::new()
        .set_target_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let mut results = Vec::with_capacity(page_indices.len());

    for &idx in page_indices {
        if idx >= total_pages {
            warn!("Skipping page {} (out of range, total={})", idx + 1, total_pages);
            continue;
        }

        let page = match pages.get(idx as u16) {
            Ok(page) => page,
            Err(e) => {
                warn!("Page {}: load failed, skipping render: {:?}", idx + 1, e);
                continue;
            }
        };

        match page.render_with_config(&render_config) {
            Ok(bitmap) => {
                let image = bitmap.as_image();
                debug!("Rendered page {} → {}x{} px", idx + 1, image.width(), image.height());
                results.push((idx, image));
            }
            Err(e) => {
                warn!("Page {}: rasterisation failed, skipping: {:?}", idx + 1, e);
            }
        };
    }

    Ok(results)
}
