//! Error types for the doc2text library.
//!
//! Two tiers of error mirror two failure scopes:
//!
//! * [`Doc2TextError`] is **fatal**: the batch cannot start or its results
//!   cannot be delivered (unreadable input, missing converter, unwritable
//!   output directory). Returned as `Err(Doc2TextError)`.
//!
//! * [`ItemError`] is **per item**: one upload failed to stage or convert,
//!   every other upload in the batch is unaffected. Stored inside
//!   [`crate::output::ConversionResult::Failure`] and rendered to the operator
//!   verbatim through its `Display` impl.
//!
//! [`StagingError`] and [`EngineError`] sit at the component seams and are
//! folded into [`ItemError`] by the orchestrator and the adapter.

use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::path::PathBuf;
use thiserror::Error;

/// Message shown when an upload could not be written to a temporary file.
pub const STAGING_FAILED_MESSAGE: &str = "System error: could not save temporary file.";

/// Message shown when the converter finished but produced no text.
pub const EMPTY_RESULT_MESSAGE: &str =
    "The converter returned no text. The file might be empty or image-only.";

/// All fatal errors returned by the doc2text library.
#[derive(Debug, Error)]
pub enum Doc2TextError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input exists but could not be read.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Engine errors ─────────────────────────────────────────────────────
    /// The requested conversion engine could not be located.
    #[error("Conversion engine '{program}' was not found.\n{hint}")]
    EngineNotFound { program: String, hint: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output artifact.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
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

impl Doc2TextError {
    /// Map an I/O error raised while reading `path` to the closest variant.
    pub fn from_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Doc2TextError::FileNotFound { path },
            std::io::ErrorKind::PermissionDenied => Doc2TextError::PermissionDenied { path },
            _ => Doc2TextError::ReadFailed { path, source },
        }
    }
}

/// Persisting an upload to the staging area failed.
///
/// No file is left behind when this is returned.
#[derive(Debug, Error)]
#[error("could not stage '{name}': {source}")]
pub struct StagingError {
    pub name: String,
    #[source]
    pub source: std::io::Error,
}

/// The conversion engine reported a failure.
///
/// `message` is the engine's own wording and reaches the operator unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EngineError {
    pub message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A non-fatal failure for a single upload.
///
/// The `Display` output is exactly what the operator sees for the item.
/// Serialises as `{"kind": .., "message": ..}` plus any variant fields, so
/// JSON consumers get the same message as the terminal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemError {
    /// The upload could not be written to a temporary file.
    ///
    /// `detail` keeps the underlying I/O message for logs; the operator sees
    /// the fixed [`STAGING_FAILED_MESSAGE`].
    #[error("{}", STAGING_FAILED_MESSAGE)]
    Staging { detail: String },

    /// The engine failed; its message is passed through verbatim.
    #[error("{message}")]
    Engine { message: String },

    /// The engine completed but produced no usable text.
    #[error("{}", EMPTY_RESULT_MESSAGE)]
    EmptyResult,
}

impl ItemError {
    /// Stable snake_case name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            ItemError::Staging { .. } => "staging",
            ItemError::Engine { .. } => "engine",
            ItemError::EmptyResult => "empty_result",
        }
    }
}

impl Serialize for ItemError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = if matches!(self, ItemError::Staging { .. }) { 3 } else { 2 };
        let mut state = serializer.serialize_struct("ItemError", fields)?;
        state.serialize_field("kind", self.kind())?;
        state.serialize_field("message", &self.to_string())?;
        if let ItemError::Staging { detail } = self {
            state.serialize_field("detail", detail)?;
        }
        state.end()
    }
}

impl From<StagingError> for ItemError {
    fn from(e: StagingError) -> Self {
        ItemError::Staging {
            detail: e.source.to_string(),
        }
    }
}

impl From<EngineError> for ItemError {
    fn from(e: EngineError) -> Self {
        ItemError::Engine { message: e.message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_message_is_not_wrapped() {
        let e = ItemError::from(EngineError::new("corrupt archive"));
        assert_eq!(e.to_string(), "corrupt archive");
    }

    #[test]
    fn staging_display_hides_io_detail() {
        let e = ItemError::from(StagingError {
            name: "a.docx".into(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        });
        assert_eq!(e.to_string(), STAGING_FAILED_MESSAGE);
        match e {
            ItemError::Staging { detail } => assert!(detail.contains("disk full")),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn empty_result_differs_from_engine_failure() {
        let empty = ItemError::EmptyResult.to_string();
        let engine = ItemError::Engine {
            message: String::new(),
        }
        .to_string();
        assert_eq!(empty, EMPTY_RESULT_MESSAGE);
        assert_ne!(empty, engine);
    }

    #[test]
    fn read_error_maps_not_found() {
        let e = Doc2TextError::from_read(
            "missing.docx",
            std::io::Error::new(std::io::ErrorKind::NotFound, "nope"),
        );
        assert!(matches!(e, Doc2TextError::FileNotFound { .. }));
        assert!(e.to_string().contains("missing.docx"));
    }

    #[test]
    fn engine_not_found_display() {
        let e = Doc2TextError::EngineNotFound {
            program: "markitdown".into(),
            hint: "pip install markitdown".into(),
        };
        assert!(e.to_string().contains("markitdown"));
        assert!(e.to_string().contains("pip install"));
    }
}
