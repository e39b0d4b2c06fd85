//! CLI binary for pdf2bank.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ExtractionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2bank::{
    extract, extract_to_bank, ExtractionConfig, ExtractionProgress, ProgressHandle, Recognizer,
    TesseractRecognizer,
};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar tracking questions through the
/// pipeline plus per-question log lines. Completion events can arrive from
/// a blocking worker thread, hence the atomics.
struct CliProgress {
    /// The single progress bar anchored at the bottom of the terminal.
    bar: ProgressBar,
    /// Figures attached so far, summed across completed questions.
    images: AtomicUsize,
}

impl CliProgress {
    /// Create a callback whose bar length is set dynamically by
    /// `on_extraction_start` (called once segmentation knows the total).
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_extraction_start

        // Initial style: spinner only (no counter until we know the total).
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            images: AtomicUsize::new(0),
        })
    }

    /// Switch to the full progress-bar style once we know `total`.
    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} questions  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Extracting");
    }
}

impl ExtractionProgress for CliProgress {
    fn on_extraction_start(&self, total_questions: usize) {
        self.activate_bar(total_questions);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Found {total_questions} question markers…"))
        ));
    }

    fn on_recognition_start(&self, total_pages: usize) {
        self.bar.set_message(format!("OCR on {total_pages} pages"));
    }

    fn on_question_complete(&self, id: &str, images: usize) {
        self.images.fetch_add(images, Ordering::SeqCst);
        let note = match images {
            0 => String::new(),
            1 => dim("1 figure"),
            n => dim(&format!("{n} figures")),
        };
        self.bar
            .println(format!("  {} {:<20} {}", green("✓"), id, note));
        self.bar.inc(1);
    }

    fn on_extraction_complete(&self, emitted: usize, excluded: usize) {
        self.bar.finish_and_clear();
        if excluded == 0 {
            eprintln!(
                "{} {} questions extracted",
                green("✔"),
                bold(&emitted.to_string())
            );
        } else {
            eprintln!(
                "{} {} questions extracted  ({} excluded as Spanish-section)",
                green("✔"),
                bold(&emitted.to_string()),
                excluded
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract an exam into the default bank (data/QuestionBank.json)
  pdf2bank ENEM23_F2.pdf

  # Explicit bank and image directory
  pdf2bank ENEM23_F2.pdf --bank banks/enem.json --images-dir static/img

  # The exam code normally comes from the file name; override it
  pdf2bank scan-final.pdf --exam-code ENEM19_F1

  # Extract from a URL
  pdf2bank https://example.org/provas/ENEM23_F2.pdf

  # Text layer only: skip OCR and figure extraction
  pdf2bank ENEM23_F2.pdf --no-ocr --no-images

  # Print the records as JSON without touching the bank
  pdf2bank ENEM23_F2.pdf --dry-run --json > questions.json

EXAM CODES:
  The code identifies one exam per run and prefixes every question id
  (ENEM23_F2 → ENEM23_F2_Q001). It is derived from the input file name:
  non-alphanumeric runs become underscores, letters are uppercased, and
  a phase suffix (_F1) is appended when the name carries none.

OCR:
  Page- and figure-level OCR uses the system `tesseract` binary when it is
  on PATH (languages por+eng). Without it, extraction falls back to the
  PDF's native text layer only — structure is still reconstructed, but
  text printed inside images is not recovered.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to an existing libpdfium shared library
  RUST_LOG          Override the tracing filter (e.g. pdf2bank=debug)
"#;

/// Extract exam questions from PDF files and URLs into a question bank.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2bank",
    version,
    about = "Extract exam questions from PDF files and URLs into a JSON question bank",
    long_about = "Extract structured question records (passage, stem, alternatives, figures) \
from multi-page exam PDFs and merge them into a persisted JSON question bank keyed by a \
stable per-question id. Re-running on the same exam updates records in place.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    input: String,

    /// Bank file to merge records into.
    #[arg(short, long, env = "PDF2BANK_BANK", default_value = "data/QuestionBank.json")]
    bank: PathBuf,

    /// Root directory for extracted figures.
    #[arg(long, env = "PDF2BANK_IMAGES_DIR", default_value = "static/img")]
    images_dir: PathBuf,

    /// Exam code override (default: derived from the input file name).
    #[arg(
        long,
        env = "PDF2BANK_EXAM_CODE",
        long_help = "Exam code for this run, e.g. ENEM23_F2. When omitted it is derived \
          from the input file name. The code prefixes every question id and picks the \
          per-exam figure subdirectory."
    )]
    exam_code: Option<String>,

    /// Rendering DPI for OCR (72–400).
    #[arg(long, env = "PDF2BANK_DPI", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(72..=400))]
    dpi: u32,

    /// Number of concurrent OCR calls.
    #[arg(short, long, env = "PDF2BANK_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2BANK_PASSWORD")]
    password: Option<String>,

    /// Skip OCR entirely (native text layer only).
    #[arg(long, env = "PDF2BANK_NO_OCR")]
    no_ocr: bool,

    /// Skip embedded-figure extraction.
    #[arg(long, env = "PDF2BANK_NO_IMAGES")]
    no_images: bool,

    /// Print the extraction output as JSON to stdout.
    #[arg(long, env = "PDF2BANK_JSON")]
    json: bool,

    /// Extract without writing the bank file.
    #[arg(long)]
    dry_run: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2BANK_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2BANK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2BANK_QUIET")]
    quiet: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "PDF2BANK_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let recognizer: Option<Arc<dyn Recognizer>> = if cli.no_ocr {
        None
    } else {
        match TesseractRecognizer::detect() {
            Some(t) => Some(Arc::new(t)),
            None => {
                if !cli.quiet {
                    eprintln!(
                        "{} tesseract not found on PATH — extracting from the native text layer only",
                        cyan("⚠")
                    );
                }
                None
            }
        }
    };

    let progress: Option<ProgressHandle> = if show_progress {
        Some(CliProgress::new_dynamic() as Arc<dyn ExtractionProgress>)
    } else {
        None
    };

    let config = build_config(&cli, recognizer, progress)?;

    // ── Run extraction ───────────────────────────────────────────────────
    let (output, bank_size) = if cli.dry_run {
        let output = extract(&cli.input, &config)
            .await
            .context("Extraction failed")?;
        (output, None)
    } else {
        let (output, size) = extract_to_bank(&cli.input, &cli.bank, &config)
            .await
            .context("Extraction failed")?;
        (output, Some(size))
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    }

    // Summary (the callback already printed the final green tick).
    if !cli.quiet {
        let stats = &output.stats;
        match bank_size {
            Some(size) => eprintln!(
                "{}  {} {}/{} questions  {}ms  →  {} ({} records)",
                green("✔"),
                output.exam_code,
                stats.questions_emitted,
                stats.questions_detected,
                stats.total_duration_ms,
                bold(&cli.bank.display().to_string()),
                size,
            ),
            None => eprintln!(
                "{}  {} {}/{} questions  {}ms  {}",
                green("✔"),
                output.exam_code,
                stats.questions_emitted,
                stats.questions_detected,
                stats.total_duration_ms,
                dim("(dry run, bank untouched)"),
            ),
        }
        if stats.images_saved > 0 {
            eprintln!(
                "   {} figures saved under {}",
                dim(&stats.images_saved.to_string()),
                dim(&cli.images_dir.display().to_string()),
            );
        }
    }

    Ok(())
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(
    cli: &Cli,
    recognizer: Option<Arc<dyn Recognizer>>,
    progress: Option<ProgressHandle>,
) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .dpi(cli.dpi)
        .concurrency(cli.concurrency)
        .image_root(&cli.images_dir)
        .extract_figures(!cli.no_images)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref code) = cli.exam_code {
        builder = builder.exam_code(code);
    }
    if let Some(r) = recognizer {
        builder = builder.recognizer(r);
    }
    if let Some(p) = progress {
        builder = builder.progress(p);
    }

    let mut config = builder.build().context("Invalid configuration")?;
    config.password = cli.password.clone();
    Ok(config)
}
