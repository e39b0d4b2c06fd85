//! # pdf2bank
//!
//! Extract structured question records from multi-page exam PDFs and merge
//! them into a persisted question bank.
//!
//! ## Why this crate?
//!
//! Exam booklets put everything a question needs — reading passage, prompt,
//! lettered alternatives, supporting figures — into free-flowing print
//! layout. Flat text extraction leaves that structure on the floor. This
//! crate reads the native text layer page by page, slices it into questions
//! at the in-document numbered markers, reconstructs each question's
//! passage/stem/alternatives, optionally folds in OCR text for content the
//! text layer misses, and merges the records into a JSON bank keyed by a
//! stable per-question id so repeated runs converge instead of duplicating.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input      resolve local file or download from URL
//!  ├─ 2. Pages      native text layer + char-offset→page map (pdfium, spawn_blocking)
//!  ├─ 3. Segment    slice text at question markers → raw questions
//!  ├─ 4. Parse      passage / stem / A–E alternatives per question
//!  ├─ 5. Recognize  render question pages, OCR them concurrently (optional)
//!  ├─ 6. Merge      append recognized text, drop the Spanish-section block
//!  ├─ 7. Figures    save embedded images under the image root (optional)
//!  └─ 8. Bank       upsert records into QuestionBank.json by id
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2bank::{extract_to_bank, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::default();
//!     let (output, bank_size) =
//!         extract_to_bank("ENEM23_F2.pdf", "data/QuestionBank.json", &config).await?;
//!     for question in &output.questions {
//!         println!("{}: {} alternatives", question.id(), question.alternatives.len());
//!     }
//!     eprintln!("bank now holds {} records", bank_size);
//!     Ok(())
//! }
//! ```
//!
//! OCR is opt-in; wire up the system tesseract binary when it is installed:
//!
//! ```rust,no_run
//! use pdf2bank::{ExtractionConfig, TesseractRecognizer};
//! use std::sync::Arc;
//!
//! let mut config = ExtractionConfig::default();
//! config.recognizer = TesseractRecognizer::detect()
//!     .map(|t| Arc::new(t) as Arc<dyn pdf2bank::Recognizer>);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2bank` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! pdf2bank = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod exam;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod question;
pub mod store;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder};
pub use error::Pdf2BankError;
pub use exam::ExamCode;
pub use extract::{extract, extract_sync, extract_to_bank};
pub use output::{ExtractionOutput, ExtractionStats};
pub use pipeline::recognize::{RecognizeError, Recognizer, TesseractRecognizer};
pub use progress::{ExtractionProgress, NoopProgress, ProgressHandle};
pub use question::{BankRecord, Question, DEFAULT_SUBJECT};
pub use store::BankStore;
