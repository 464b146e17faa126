//! Progress-callback trait for per-item batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::BatchConfigBuilder::progress_callback`] to follow a batch
//! as the orchestrator works through it: a terminal progress bar, a log
//! sink, or a UI queue can all be driven from the same events.
//!
//! # Example
//!
//! ```rust
//! use doc2text::{BatchConfig, BatchProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct FailureCounter {
//!     failed: AtomicUsize,
//! }
//!
//! impl BatchProgressCallback for FailureCounter {
//!     fn on_item_error(&self, _index: usize, _total: usize, name: &str, message: &str) {
//!         self.failed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{name}: {message}");
//!     }
//! }
//!
//! let counter = Arc::new(FailureCounter { failed: AtomicUsize::new(0) });
//!
//! let config = BatchConfig::builder()
//!     .progress_callback(counter as Arc<dyn BatchProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the orchestrator as it processes each upload.
///
/// Items are processed one at a time, so events arrive in input order and
/// never overlap. Implementations must still be `Send + Sync` because the
/// batch may run on a blocking worker thread. All methods default to no-ops.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once before the first item is staged.
    fn on_batch_start(&self, total_items: usize) {
        let _ = total_items;
    }

    /// Called before an item is staged.
    ///
    /// # Arguments
    /// * `index`: 0-indexed position in the batch
    /// * `total`: number of items in the batch
    /// * `name`: declared upload name
    fn on_item_start(&self, index: usize, total: usize, name: &str) {
        let _ = (index, total, name);
    }

    /// Called when an item converted successfully.
    ///
    /// `converted_bytes` is the UTF-8 byte length of the produced text.
    fn on_item_complete(&self, index: usize, total: usize, name: &str, converted_bytes: usize) {
        let _ = (index, total, name, converted_bytes);
    }

    /// Called when an item failed; `message` is what the operator sees.
    fn on_item_error(&self, index: usize, total: usize, name: &str, message: &str) {
        let _ = (index, total, name, message);
    }

    /// Called once after every item has been attempted.
    fn on_batch_complete(&self, total_items: usize, success_count: usize) {
        let _ = (total_items, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::BatchConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;
