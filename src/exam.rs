//! Exam codes: the stable identifier tying questions, figures, and bank
//! records back to one source exam.
//!
//! A code is a normalized uppercase `[A-Z0-9_]` token guaranteed to carry a
//! phase marker (`_F1` is appended when the raw token contains no `F`), e.g.
//! `ENEM23_F2` or `VESTIBULAR_2019_F1`. The code also determines where
//! figures land on disk: codes shaped like `[letters][2-digit year]_F[phase]`
//! get a `letters/fullyear_fphase` directory (`ENEM23_F2` → `enem/2023_f2/`),
//! anything else falls back to the lowercased code itself.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

static RE_NON_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]+").unwrap());

/// `[letters][2-digit year]_F[phase]`, anchored at the start only — a code
/// like `ENEM23_F2_REAPPLICATION` still maps to the year directory.
static RE_YEAR_PHASE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Z]+)(\d{2})_F(\d+)").unwrap());

/// Normalized identifier for one source exam.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExamCode(String);

impl ExamCode {
    /// Normalize an arbitrary token into an exam code: every run of
    /// non-alphanumeric/underscore characters becomes a single underscore,
    /// the result is uppercased, and `_F1` is appended when no `F` is
    /// present anywhere (every code must encode a phase).
    pub fn new(raw: &str) -> Self {
        let mut cleaned = RE_NON_TOKEN.replace_all(raw, "_").to_uppercase();
        if !cleaned.contains('F') {
            cleaned.push_str("_F1");
        }
        ExamCode(cleaned)
    }

    /// Derive a code from an uploaded file name, e.g.
    /// `provas/enem23_f2.pdf` → `ENEM23_F2`.
    pub fn from_file_name(name: &str) -> Self {
        let stem = Path::new(name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.to_string());
        Self::new(&stem)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Directory for this exam's figures, relative to the image root.
    pub fn image_subdir(&self) -> PathBuf {
        PathBuf::from(self.subdir())
    }

    /// Path recorded on a question for a figure file: the image-root-relative
    /// location, forward-slash separated on every platform.
    pub fn relative_image_path(&self, filename: &str) -> String {
        format!("{}/{}", self.subdir(), filename)
    }

    fn subdir(&self) -> String {
        if let Some(caps) = RE_YEAR_PHASE.captures(&self.0) {
            let exam = caps[1].to_lowercase();
            let year: u32 = caps[2].parse().unwrap_or(0);
            // Two-digit years pivot at 30: 00–29 → 2000s, 30–99 → 1900s.
            let full_year = if year < 30 { year + 2000 } else { year + 1900 };
            format!("{}/{}_f{}", exam, full_year, &caps[3])
        } else {
            self.0.to_lowercase()
        }
    }
}

impl fmt::Display for ExamCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
