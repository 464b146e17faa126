//! # doc2text
//!
//! Batch-convert uploaded documents (Word, Excel, PowerPoint, PDF, HTML,
//! CSV, text) into portable Markdown and plain text, with a size report per
//! file.
//!
//! The crate does not parse documents itself. Parsing is delegated to a
//! [`ConversionEngine`], normally the `markitdown` CLI, and the crate owns
//! everything around that call: staging each upload to a temporary file the
//! engine can open, turning engine failures into per-item results, deleting
//! the temporary file whatever happened, and measuring the result.
//!
//! ## Pipeline Overview
//!
//! ```text
//! uploads
//!  │
//!  ├─ for each item, in order:
//!  │   ├─ 1. Stage    write bytes to a suffixed temp file
//!  │   ├─ 2. Convert  engine(path) → text | failure
//!  │   ├─ 3. Release  delete the temp file (best-effort)
//!  │   └─ 4. Report   size comparison on success
//!  └─ BatchOutcome   one ItemOutcome per upload, input order
//! ```
//!
//! A failure on one item never stops the batch.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doc2text::{convert_batch, resolve_engine, BatchConfig, EngineKind, UploadedItem};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Build the engine once and reuse it for every batch.
//!     let engine = resolve_engine(EngineKind::Auto, None, vec![])?;
//!     let config = BatchConfig::builder().engine(engine).build()?;
//!
//!     let items = vec![UploadedItem::new("report.docx", std::fs::read("report.docx")?)];
//!     for item in &convert_batch(&items, &config) {
//!         match item.markdown() {
//!             Some(md) => println!("{}", md),
//!             None => eprintln!("{}: {}", item.name, item.result.message().unwrap_or_default()),
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `doc2text` binary (clap + anyhow + indicatif + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{convert_batch, convert_batch_async};
pub use config::{is_accepted, BatchConfig, BatchConfigBuilder, EngineKind, ACCEPTED_EXTENSIONS};
pub use engine::{resolve_engine, CommandEngine, ConversionEngine, EngineOutput, NativeEngine};
pub use error::{Doc2TextError, EngineError, ItemError, StagingError};
pub use export::{write_artifacts, Artifact};
pub use output::{BatchOutcome, ConversionResult, ItemOutcome, UploadedItem};
pub use pipeline::metrics::{format_size, SizeReport};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
