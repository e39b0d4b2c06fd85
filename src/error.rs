//! Error types for the pdf2bank library.
//!
//! Only genuinely fatal conditions surface as [`Pdf2BankError`] from the
//! top-level `extract*` functions: an unusable input document, an unwritable
//! bank file, or an invalid configuration. Everything else in the pipeline —
//! a page that fails recognition, an embedded image that fails to decode, a
//! corrupt existing bank file — is recovered locally: the offending page or
//! image is skipped with a `tracing::warn!` and the run continues.
//!
//! That split keeps the contract simple for callers: an `Err` means "no
//! usable result at all"; a successful run may still have skipped work, and
//! the [`crate::output::ExtractionStats`] counters say how much.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2bank library.
#[derive(Debug, Error)]
pub enum Pdf2BankError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// The document opened but its text layer could not be read at all.
    #[error("Could not extract any text from '{path}': {detail}")]
    TextExtractionFailed { path: PathBuf, detail: String },

    // ── Store errors ──────────────────────────────────────────────────────
    /// Could not read the persisted bank file (I/O, not corruption — a
    /// corrupt file is tolerated and treated as an empty bank).
    #[error("Failed to read question bank '{path}': {source}")]
    StoreReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or atomically replace the bank file.
    #[error("Failed to write question bank '{path}': {source}")]
    StoreWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
