//! Configuration types for batch conversion.
//!
//! Everything the orchestrator needs lives in [`BatchConfig`], built through
//! [`BatchConfigBuilder`]. The conversion engine is part of the config: it is
//! constructed once at startup (see [`crate::engine::resolve_engine`]) and the
//! same handle is reused by every batch.

use crate::engine::{ConversionEngine, NativeEngine};
use crate::error::Doc2TextError;
use crate::pipeline::stage::split_extension;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Extensions the presentation layer accepts by default.
///
/// Advisory only: the orchestrator converts whatever it is given.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["docx", "xlsx", "pptx", "pdf", "html", "htm", "csv", "txt"];

/// `true` when `name` ends in one of [`ACCEPTED_EXTENSIONS`] (case-insensitive).
pub fn is_accepted(name: &str) -> bool {
    let (_, suffix) = split_extension(name);
    let ext = suffix.trim_start_matches('.');
    ACCEPTED_EXTENSIONS
        .iter()
        .any(|accepted| accepted.eq_ignore_ascii_case(ext))
}

/// Configuration for a batch conversion.
///
/// # Example
/// ```rust
/// use doc2text::{BatchConfig, NativeEngine};
/// use std::sync::Arc;
///
/// let config = BatchConfig::builder()
///     .engine(Arc::new(NativeEngine::new()))
///     .build()
///     .unwrap();
/// assert_eq!(config.engine.name(), "native");
/// ```
#[derive(Clone)]
pub struct BatchConfig {
    /// The conversion engine shared by every item. Default: [`NativeEngine`].
    pub engine: Arc<dyn ConversionEngine>,

    /// Directory for staged uploads. If None, uses the system temp directory.
    pub staging_dir: Option<PathBuf>,

    /// Per-item progress events. If None, no events are sent.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            engine: Arc::new(NativeEngine::new()),
            staging_dir: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchConfig")
            .field("engine", &self.engine.name())
            .field("staging_dir", &self.staging_dir)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl BatchConfig {
    /// Create a new builder for `BatchConfig`.
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`BatchConfig`].
#[derive(Debug)]
pub struct BatchConfigBuilder {
    config: BatchConfig,
}

impl BatchConfigBuilder {
    pub fn engine(mut self, engine: Arc<dyn ConversionEngine>) -> Self {
        self.config.engine = engine;
        self
    }

    pub fn staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.staging_dir = Some(dir.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<BatchConfig, Doc2TextError> {
        if let Some(ref dir) = self.config.staging_dir {
            if !dir.is_dir() {
                return Err(Doc2TextError::InvalidConfig(format!(
                    "staging directory '{}' does not exist or is not a directory",
                    dir.display()
                )));
            }
        }
        Ok(self.config)
    }
}

/// Which conversion engine to build at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// `markitdown` if it is on `PATH`, the native engine otherwise. (default)
    #[default]
    Auto,
    /// In-process text/CSV/HTML engine only.
    Native,
    /// The `markitdown` CLI; fails at startup when it is missing.
    MarkItDown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_native_engine() {
        let config = BatchConfig::default();
        assert_eq!(config.engine.name(), "native");
        assert!(config.staging_dir.is_none());
        assert!(config.progress_callback.is_none());
    }

    #[test]
    fn missing_staging_dir_is_rejected() {
        let err = BatchConfig::builder()
            .staging_dir("/nonexistent/doc2text-staging")
            .build()
            .unwrap_err();
        assert!(matches!(err, Doc2TextError::InvalidConfig(_)));
    }

    #[test]
    fn existing_staging_dir_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let config = BatchConfig::builder()
            .staging_dir(dir.path())
            .build()
            .unwrap();
        assert_eq!(config.staging_dir.as_deref(), Some(dir.path()));
    }

    #[test]
    fn accepted_extensions() {
        assert!(is_accepted("report.docx"));
        assert!(is_accepted("Slides.PPTX"));
        assert!(is_accepted("page.htm"));
        assert!(!is_accepted("notes.md"));
        assert!(!is_accepted("README"));
        assert!(!is_accepted(".txt"));
    }

    #[test]
    fn debug_hides_engine_internals() {
        let s = format!("{:?}", BatchConfig::default());
        assert!(s.contains("native"));
    }
}
