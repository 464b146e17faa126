//! CLI binary for doc2text.
//!
//! A thin shim over the library crate: it turns local files into uploads,
//! maps CLI flags to `BatchConfig`, and renders the queue status, previews,
//! size metrics and download artifacts.

use anyhow::{Context, Result};
use clap::Parser;
use doc2text::{
    convert_batch_async, is_accepted, resolve_engine, write_artifacts, BatchConfig,
    BatchOutcome, BatchProgressCallback, Doc2TextError, EngineKind, ItemOutcome,
    ProgressCallback, UploadedItem, ACCEPTED_EXTENSIONS,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
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

/// Terminal queue view: one progress bar plus a status line per file.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Wall-clock start of the item currently being converted.
    item_start: Mutex<Option<Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            item_start: Mutex::new(None),
            errors: AtomicUsize::new(0),
        })
    }

    fn elapsed_secs(&self) -> f64 {
        self.item_start
            .lock()
            .ok()
            .and_then(|mut s| s.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_items: usize) {
        self.bar.set_length(total_items as u64);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Processing queue: {total_items} files"))
        ));
    }

    fn on_item_start(&self, _index: usize, _total: usize, name: &str) {
        if let Ok(mut start) = self.item_start.lock() {
            *start = Some(Instant::now());
        }
        self.bar.set_message(name.to_string());
    }

    fn on_item_complete(&self, index: usize, total: usize, name: &str, converted_bytes: usize) {
        let secs = self.elapsed_secs();
        self.bar.println(format!(
            "  {} Ready:  {:>3}/{:<3} {}  {}  {}",
            green("✓"),
            index + 1,
            total,
            name,
            dim(&format!("{converted_bytes} bytes")),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_item_error(&self, index: usize, total: usize, name: &str, message: &str) {
        let secs = self.elapsed_secs();
        self.errors.fetch_add(1, Ordering::SeqCst);
        self.bar.println(format!(
            "  {} Failed: {:>3}/{:<3} {}  {}  {}",
            red("✗"),
            index + 1,
            total,
            name,
            red(message),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_items: usize, success_count: usize) {
        self.bar.finish_and_clear();
        let failed = self.errors.load(Ordering::SeqCst);
        if failed == 0 {
            eprintln!(
                "{} {} files converted successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} files converted  ({} failed)",
                if failed == total_items { red("✘") } else { cyan("⚠") },
                bold(&success_count.to_string()),
                total_items,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Preview the Markdown of a few documents
  doc2text report.docx budget.xlsx slides.pptx

  # Write <name>_converted.md and <name>_converted.txt for each file
  doc2text *.pdf -o converted/

  # Machine-readable results
  doc2text --json --no-preview page.html data.csv > results.json

  # Use the in-process engine (text, CSV and HTML only)
  doc2text --engine native notes.txt table.csv

ENGINES:
  auto        markitdown if found on PATH, native otherwise (default)
  markitdown  Microsoft MarkItDown CLI: docx, xlsx, pptx, pdf, html, csv, txt
  native      built in: txt, md, csv, html, htm

ACCEPTED EXTENSIONS:
  docx, xlsx, pptx, pdf, html, htm, csv, txt
  Other files are skipped unless --allow-any-extension is given.

ENVIRONMENT VARIABLES:
  DOC2TEXT_OUTPUT_DIR     Default for --output-dir
  DOC2TEXT_ENGINE         Default for --engine
  DOC2TEXT_ENGINE_PATH    Converter program to run instead of markitdown
  DOC2TEXT_STAGING_DIR    Directory for temporary staged uploads
  RUST_LOG                Log filter, e.g. RUST_LOG=doc2text=debug
"#;

/// Convert documents to Markdown and plain text.
#[derive(Parser, Debug)]
#[command(
    name = "doc2text",
    version,
    about = "Convert Word, Excel, PowerPoint, PDF and HTML files to Markdown and plain text",
    long_about = "Convert a batch of documents to clean, portable Markdown and plain text. \
Each file is converted independently: a file that fails never stops the rest of the batch.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Files to convert, processed in the given order.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Write <name>_converted.md and <name>_converted.txt into this directory.
    #[arg(short, long, env = "DOC2TEXT_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Conversion engine: auto, native, markitdown.
    #[arg(long, env = "DOC2TEXT_ENGINE", value_enum, default_value = "auto")]
    engine: EngineArg,

    /// Converter program to run instead of markitdown.
    #[arg(long, env = "DOC2TEXT_ENGINE_PATH")]
    engine_path: Option<PathBuf>,

    /// Extra argument passed to the converter program before the file path (repeatable).
    #[arg(long = "engine-arg", allow_hyphen_values = true)]
    engine_args: Vec<String>,

    /// Directory for temporary staged uploads (default: system temp dir).
    #[arg(long, env = "DOC2TEXT_STAGING_DIR")]
    staging_dir: Option<PathBuf>,

    /// Convert files whatever their extension.
    #[arg(long, env = "DOC2TEXT_ALLOW_ANY_EXTENSION")]
    allow_any_extension: bool,

    /// Output structured JSON (BatchOutcome) instead of previews.
    #[arg(long, env = "DOC2TEXT_JSON")]
    json: bool,

    /// Do not print the converted Markdown.
    #[arg(long, env = "DOC2TEXT_NO_PREVIEW")]
    no_preview: bool,

    /// Disable progress bar.
    #[arg(long, env = "DOC2TEXT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOC2TEXT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors (implies --no-preview).
    #[arg(short, long, env = "DOC2TEXT_QUIET")]
    quiet: bool,
}

impl Cli {
    /// Whether converted Markdown is echoed to stdout.
    fn show_preview(&self) -> bool {
        !self.no_preview && !self.quiet && !self.json
    }
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum EngineArg {
    Auto,
    Native,
    Markitdown,
}

impl From<EngineArg> for EngineKind {
    fn from(v: EngineArg) -> Self {
        match v {
            EngineArg::Auto => EngineKind::Auto,
            EngineArg::Native => EngineKind::Native,
            EngineArg::Markitdown => EngineKind::MarkItDown,
        }
    }
}

/// JSON document printed by `--json`.
#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    outcome: &'a BatchOutcome,
    succeeded: usize,
    failed: usize,
    artifacts: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar carries the per-file feedback, so library INFO logs
    // are hidden while it is shown.
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

    // ── Engine: built once, shared by the whole batch ────────────────────
    let engine = resolve_engine(
        cli.engine.clone().into(),
        cli.engine_path.clone(),
        cli.engine_args.clone(),
    )
    .context("Failed to set up the conversion engine")?;

    // ── Uploads ──────────────────────────────────────────────────────────
    let items = load_uploads(&cli).await?;
    if items.is_empty() {
        anyhow::bail!(
            "No files to convert. Accepted extensions: {}",
            ACCEPTED_EXTENSIONS.join(", ")
        );
    }

    // ── Build config ─────────────────────────────────────────────────────
    let mut builder = BatchConfig::builder().engine(engine);
    if let Some(ref dir) = cli.staging_dir {
        builder = builder.staging_dir(dir);
    }
    if show_progress {
        let cb: ProgressCallback = CliProgressCallback::new();
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run batch ────────────────────────────────────────────────────────
    let outcome = convert_batch_async(items, config)
        .await
        .context("Conversion failed")?;

    let artifacts = match cli.output_dir {
        Some(ref dir) => write_artifacts(&outcome, dir)
            .await
            .context("Failed to write converted files")?,
        None => Vec::new(),
    };

    // ── Render ───────────────────────────────────────────────────────────
    if cli.json {
        let report = JsonReport {
            outcome: &outcome,
            succeeded: outcome.succeeded(),
            failed: outcome.failed(),
            artifacts,
        };
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        render_outcome(&cli, &outcome, show_progress)?;
        if !cli.quiet && !artifacts.is_empty() {
            if let Some(ref dir) = cli.output_dir {
                eprintln!(
                    "{}  {} files  →  {}",
                    green("✔"),
                    artifacts.len(),
                    bold(&dir.display().to_string())
                );
            }
        }
    }

    Ok(if outcome.failed() == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Read every input into an upload, skipping files with unaccepted extensions.
async fn load_uploads(cli: &Cli) -> Result<Vec<UploadedItem>> {
    let mut items = Vec::with_capacity(cli.inputs.len());
    for path in &cli.inputs {
        let name = upload_name(path);
        if !cli.allow_any_extension && !is_accepted(&name) {
            if !cli.quiet {
                eprintln!(
                    "{} Skipping {}: unsupported extension (use --allow-any-extension)",
                    cyan("⚠"),
                    name
                );
            }
            continue;
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Doc2TextError::from_read(path, e))
            .with_context(|| format!("Failed to load {}", path.display()))?;
        let declared_size = tokio::fs::metadata(path)
            .await
            .map(|m| m.len())
            .unwrap_or(bytes.len() as u64);
        items.push(UploadedItem::with_declared_size(name, bytes, declared_size));
    }
    Ok(items)
}

fn upload_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Print per-file status, preview and size metrics.
fn render_outcome(cli: &Cli, outcome: &BatchOutcome, show_progress: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for item in outcome {
        // The progress callback already printed the status lines.
        if !cli.quiet && !show_progress {
            print_status(item);
        }
        let Some(markdown) = item.markdown() else {
            continue;
        };

        if cli.show_preview() {
            writeln!(out, "{}", bold(&format!("── Preview: {} ──", item.base_name())))
                .context("Failed to write to stdout")?;
            out.write_all(markdown.as_bytes())
                .context("Failed to write to stdout")?;
            if !markdown.ends_with('\n') {
                out.write_all(b"\n").ok();
            }
            writeln!(out).ok();
        }

        if !cli.quiet {
            if let Some(ref report) = item.size_report {
                eprintln!(
                    "   {}  {} → {}  (reduction {})",
                    dim(&item.name),
                    report.original_display,
                    report.converted_display,
                    report.reduction_display(),
                );
                if cli.verbose {
                    eprint!("{}", report.to_markdown_table());
                }
            }
        }
    }
    Ok(())
}

fn print_status(item: &ItemOutcome) {
    match item.result.message() {
        None => eprintln!("{} Ready: {}", green("✅"), item.name),
        Some(message) => {
            eprintln!("{} Failed: {}", red("❌"), item.name);
            eprintln!("   {}", red(&message));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("doc2text").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn preview_is_on_by_default() {
        assert!(parse(&["a.docx"]).show_preview());
    }

    #[test]
    fn quiet_suppresses_preview() {
        assert!(!parse(&["-q", "a.docx"]).show_preview());
        assert!(!parse(&["--no-preview", "a.docx"]).show_preview());
    }

    #[test]
    fn engine_flag_maps_to_kind() {
        let cli = parse(&["--engine", "markitdown", "a.docx"]);
        assert_eq!(EngineKind::from(cli.engine), EngineKind::MarkItDown);
    }
}
