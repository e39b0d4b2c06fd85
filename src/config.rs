//! Configuration for a question-bank extraction run.
//!
//! Every knob lives in [`ExtractionConfig`], built via its builder. Keeping
//! them in one struct makes it trivial to share a config across threads and
//! to diff two runs to understand why their outputs differ.

use crate::error::Pdf2BankError;
use crate::pipeline::recognize::Recognizer;
use crate::progress::ProgressHandle;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for one extraction run.
///
/// Built via [`ExtractionConfig::builder()`] or [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2bank::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .dpi(200)
///     .concurrency(4)
///     .exam_code("ENEM23_F2")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Rasterisation DPI for recognition renders. Range: 72–400. Default: 200.
    ///
    /// 200 DPI keeps small print legible to the recognition engine without
    /// producing renders too large to process quickly.
    pub dpi: u32,

    /// Maximum rendered image dimension (width or height) in pixels.
    /// Default: 2000. A safety cap independent of DPI so an oversized page
    /// cannot exhaust memory.
    pub max_rendered_pixels: u32,

    /// Number of concurrent recognition calls. Default: 4.
    ///
    /// Recognition is CPU-bound per page and has no ordering dependency
    /// between pages; results are collated back into a page-keyed map
    /// before the merge stage reads them.
    pub concurrency: usize,

    /// Explicit exam code. When `None`, derived from the input file name.
    pub exam_code: Option<String>,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Root directory under which figures are persisted. Recorded image
    /// paths are relative to this root. Default: `static/img`.
    pub image_root: PathBuf,

    /// Recognition engine. `None` skips both page- and figure-level
    /// recognition (native text layer only).
    pub recognizer: Option<Arc<dyn Recognizer>>,

    /// Extract embedded figures. Default: true.
    pub extract_figures: bool,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Per-question progress callbacks (used by the CLI progress bar).
    pub progress: Option<ProgressHandle>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            dpi: 200,
            max_rendered_pixels: 2000,
            concurrency: 4,
            exam_code: None,
            password: None,
            image_root: PathBuf::from("static/img"),
            recognizer: None,
            extract_figures: true,
            download_timeout_secs: 120,
            progress: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("concurrency", &self.concurrency)
            .field("exam_code", &self.exam_code)
            .field("image_root", &self.image_root)
            .field("recognizer", &self.recognizer.as_ref().map(|r| r.name()))
            .field("extract_figures", &self.extract_figures)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 400);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn exam_code(mut self, code: impl Into<String>) -> Self {
        self.config.exam_code = Some(code.into());
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn image_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.image_root = root.into();
        self
    }

    pub fn recognizer(mut self, recognizer: Arc<dyn Recognizer>) -> Self {
        self.config.recognizer = Some(recognizer);
        self
    }

    pub fn extract_figures(mut self, v: bool) -> Self {
        self.config.extract_figures = v;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress(mut self, progress: ProgressHandle) -> Self {
        self.config.progress = Some(progress);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, Pdf2BankError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 400 {
            return Err(Pdf2BankError::InvalidConfig(format!(
                "DPI must be 72–400, got {}",
                c.dpi
            )));
        }
        if c.concurrency == 0 {
            return Err(Pdf2BankError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        if let Some(ref code) = c.exam_code {
            if code.trim().is_empty() {
                return Err(Pdf2BankError::InvalidConfig(
                    "Exam code override must not be empty".into(),
                ));
            }
        }
        Ok(self.config)
    }
}
