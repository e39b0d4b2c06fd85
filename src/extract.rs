//! Top-level extraction orchestration.
//!
//! [`extract`] is the core entry point: resolve the input, pull the native
//! text layer, segment and parse the questions, fold in recognized text,
//! filter the unwanted language section, and attach figures. It returns the
//! final records plus run statistics; it never writes the bank —
//! [`extract_to_bank`] composes it with [`BankStore`] for callers that want
//! the persisted merge in one call.
//!
//! ## Stage ordering
//!
//! Parsing runs before recognition on purpose: the passage/stem/alternative
//! split is computed from the native text layer only, so a noisy
//! recognition result can never corrupt the structure of a question — it
//! only appends to the passage. The language-section filter runs after the
//! recognition merge and before figure extraction, so excluded questions
//! never cost a figure decode.

use crate::config::ExtractionConfig;
use crate::error::Pdf2BankError;
use crate::exam::ExamCode;
use crate::output::{ExtractionOutput, ExtractionStats};
use crate::pipeline::{figures, input, merge, pages, parse, recognize, render, segment};
use crate::store::BankStore;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Extract the question records from a PDF given as a local path or URL.
///
/// Returns the reconstructed questions in document order together with the
/// run's counters and timings. Document-level failures (missing file, bad
/// download, wrong password, corrupt PDF) are errors; page- and
/// question-level failures degrade to warnings and reduced output.
pub async fn extract(
    input: &str,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, Pdf2BankError> {
    let run_start = Instant::now();
    let mut stats = ExtractionStats::default();

    // Keeps a downloaded temp file alive for the whole run.
    let resolved = input::resolve_input(input, config.download_timeout_secs).await?;
    let pdf_path = resolved.path();

    let exam_code = match config.exam_code.as_deref() {
        Some(code) => ExamCode::new(code),
        None => ExamCode::from_file_name(&resolved.file_name()),
    };
    info!("Extracting {} as exam {}", input, exam_code);

    let page_texts = pages::extract_page_texts(pdf_path, config).await?;
    let (full_text, page_map) = pages::PageMap::from_page_texts(page_texts);
    stats.total_pages = page_map.page_count();
    debug!(
        "Native text layer: {} pages, {} bytes",
        stats.total_pages,
        page_map.text_len()
    );

    let mut questions = segment::segment_questions(&full_text, &page_map, &exam_code);
    stats.questions_detected = questions.len();
    if let Some(progress) = &config.progress {
        progress.on_extraction_start(questions.len());
    }

    questions = questions.into_iter().map(parse::parse_content).collect();

    if let Some(recognizer) = &config.recognizer {
        if !questions.is_empty() {
            let recognition_start = Instant::now();
            let recognized =
                recognize_question_pages(pdf_path, config, Arc::clone(recognizer), &questions)
                    .await?;
            stats.recognized_pages = recognized.len();
            questions = questions
                .into_iter()
                .map(|q| merge::merge_recognized(q, &recognized))
                .collect();
            stats.recognition_duration_ms = recognition_start.elapsed().as_millis() as u64;
        }
    }

    let (mut questions, excluded) = merge::filter_language_sections(questions);
    stats.questions_excluded = excluded;

    if config.extract_figures && !questions.is_empty() {
        let figure_start = Instant::now();
        let (enriched, saved) = figures::attach_figures(
            pdf_path,
            questions,
            &config.image_root,
            config.password.clone(),
            config.recognizer.clone(),
            config.progress.clone(),
        )
        .await?;
        questions = enriched;
        stats.images_saved = saved;
        stats.figure_duration_ms = figure_start.elapsed().as_millis() as u64;
    } else if let Some(progress) = &config.progress {
        // Figure extraction is where per-question completion is normally
        // reported; without it the questions are already final here.
        for question in &questions {
            progress.on_question_complete(&question.id(), question.images.len());
        }
    }

    stats.questions_emitted = questions.len();
    stats.total_duration_ms = run_start.elapsed().as_millis() as u64;
    if let Some(progress) = &config.progress {
        progress.on_extraction_complete(stats.questions_emitted, stats.questions_excluded);
    }
    info!(
        "Extracted {}/{} questions from {} pages in {} ms ({} excluded, {} figures)",
        stats.questions_emitted,
        stats.questions_detected,
        stats.total_pages,
        stats.total_duration_ms,
        stats.questions_excluded,
        stats.images_saved
    );

    Ok(ExtractionOutput {
        exam_code,
        questions,
        stats,
    })
}

/// Render and recognize every page any surviving question touches.
async fn recognize_question_pages(
    pdf_path: &Path,
    config: &ExtractionConfig,
    recognizer: Arc<dyn recognize::Recognizer>,
    questions: &[crate::question::Question],
) -> Result<std::collections::HashMap<usize, String>, Pdf2BankError> {
    let page_union: BTreeSet<usize> = questions
        .iter()
        .flat_map(|q| q.pages.iter().copied())
        .collect();
    let page_indices: Vec<usize> = page_union.into_iter().collect();
    if let Some(progress) = &config.progress {
        progress.on_recognition_start(page_indices.len());
    }
    debug!(
        "Recognizing {} pages with {}",
        page_indices.len(),
        recognizer.name()
    );

    let rendered = render::render_pages(pdf_path, config, &page_indices).await?;
    Ok(recognize::collect_page_text(recognizer, rendered, config.concurrency).await)
}

/// Blocking wrapper around [`extract`] for synchronous callers.
///
/// Spins up a private multi-threaded runtime for the duration of the call.
/// Must not be called from within an async context.
pub fn extract_sync(input: &str, config: &ExtractionConfig) -> Result<ExtractionOutput, Pdf2BankError> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| Pdf2BankError::Internal(format!("Failed to create Tokio runtime: {}", e)))?;
    runtime.block_on(extract(input, config))
}

/// Extract and merge the results into the bank file at `bank_path`.
///
/// Returns the extraction output and the total number of records in the
/// bank after the merge. The bank is only touched after the extraction has
/// fully succeeded; a failed run leaves it exactly as it was.
pub async fn extract_to_bank(
    input: &str,
    bank_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<(ExtractionOutput, usize), Pdf2BankError> {
    let output = extract(input, config).await?;
    let store = BankStore::open(bank_path.as_ref());
    let bank_size = store.upsert(&output.questions)?;
    Ok((output, bank_size))
}
