//! Batch orchestration: stage → convert → release → report, one item at a time.
//!
//! Items are processed strictly in input order and never overlap. Every item
//! ends as an [`ItemOutcome`], whatever went wrong with it, so a batch
//! always returns exactly one outcome per upload and a failure on one item
//! never stops the next.

use crate::config::BatchConfig;
use crate::error::{Doc2TextError, ItemError};
use crate::output::{BatchOutcome, ConversionResult, ItemOutcome, UploadedItem};
use crate::pipeline::adapter::ConversionAdapter;
use crate::pipeline::metrics::SizeReport;
use crate::pipeline::stage::StagingStore;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert a batch of uploads.
///
/// Blocks the calling thread for the whole batch; there is no timeout on the
/// engine call. Use [`convert_batch_async`] from async code.
///
/// # Example
/// ```rust
/// use doc2text::{convert_batch, BatchConfig, UploadedItem};
///
/// let items = vec![UploadedItem::new("notes.txt", b"hello".to_vec())];
/// let outcome = convert_batch(&items, &BatchConfig::default());
/// assert_eq!(outcome.items[0].markdown(), Some("hello"));
/// ```
pub fn convert_batch(items: &[UploadedItem], config: &BatchConfig) -> BatchOutcome {
    let start = Instant::now();
    let total = items.len();
    let store = StagingStore::new(config.staging_dir.clone());
    let adapter = ConversionAdapter::new(Arc::clone(&config.engine));
    info!(
        "Starting batch of {} items with engine '{}'",
        total,
        adapter.engine_name()
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let mut outcomes = Vec::with_capacity(total);
    for (index, item) in items.iter().enumerate() {
        if let Some(ref cb) = config.progress_callback {
            cb.on_item_start(index, total, &item.name);
        }

        let outcome = process_item(item, &store, &adapter);

        if let Some(ref cb) = config.progress_callback {
            match &outcome.result {
                ConversionResult::Success { text } => {
                    cb.on_item_complete(index, total, &item.name, text.len())
                }
                ConversionResult::Failure(e) => {
                    cb.on_item_error(index, total, &item.name, &e.to_string())
                }
            }
        }
        outcomes.push(outcome);
    }

    let outcome = BatchOutcome { items: outcomes };
    info!(
        "Batch complete: {}/{} converted in {}ms",
        outcome.succeeded(),
        total,
        start.elapsed().as_millis()
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, outcome.succeeded());
    }
    outcome
}

/// Async wrapper around [`convert_batch`].
///
/// The batch runs on tokio's blocking pool because staging and the engine
/// call are blocking I/O. The only error is a panic inside that task.
pub async fn convert_batch_async(
    items: Vec<UploadedItem>,
    config: BatchConfig,
) -> Result<BatchOutcome, Doc2TextError> {
    tokio::task::spawn_blocking(move || convert_batch(&items, &config))
        .await
        .map_err(|e| Doc2TextError::Internal(format!("Batch task panicked: {}", e)))
}

/// Run one item through the per-item state machine.
fn process_item(
    item: &UploadedItem,
    store: &StagingStore,
    adapter: &ConversionAdapter,
) -> ItemOutcome {
    // ── Staged ───────────────────────────────────────────────────────────
    let staged = match store.stage(item) {
        Ok(staged) => staged,
        Err(e) => {
            warn!("{}", e);
            return ItemOutcome {
                name: item.name.clone(),
                result: ConversionResult::Failure(ItemError::from(e)),
                size_report: None,
            };
        }
    };

    // ── Converted ────────────────────────────────────────────────────────
    let result = adapter.convert(staged.path());

    // ── Cleaned ──────────────────────────────────────────────────────────
    staged.release();

    // ── Reported ─────────────────────────────────────────────────────────
    let size_report = match &result {
        ConversionResult::Success { text } => {
            let report = SizeReport::compare(item.declared_size, text);
            debug!(
                "'{}': {} → {} ({})",
                item.name,
                report.original_display,
                report.converted_display,
                report.reduction_display()
            );
            Some(report)
        }
        ConversionResult::Failure(e) => {
            warn!("'{}' failed: {}", item.name, e);
            None
        }
    };

    ItemOutcome {
        name: item.name.clone(),
        result,
        size_report,
    }
}
