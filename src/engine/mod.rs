//! Conversion engines: the opaque `path → text` capability.
//!
//! The orchestrator never parses documents itself. It hands a staged file
//! path to a [`ConversionEngine`] and gets back either text or an
//! [`EngineError`]. Two engines ship with the crate:
//!
//! * [`CommandEngine`] runs an external converter program (by default
//!   `markitdown`) and reads its stdout. This is the engine that understands
//!   Office formats and PDF.
//! * [`NativeEngine`] converts plain text, CSV and HTML in-process, for hosts
//!   that do not have a converter installed.
//!
//! An engine is built once at startup by [`resolve_engine`] and shared as an
//! `Arc<dyn ConversionEngine>` for the rest of the process.

pub mod command;
pub mod native;

pub use command::CommandEngine;
pub use native::NativeEngine;

use crate::config::EngineKind;
use crate::error::{Doc2TextError, EngineError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Default external converter program looked up on `PATH`.
pub const DEFAULT_PROGRAM: &str = "markitdown";

/// What an engine hands back after a completed conversion.
///
/// `text_content` is `None` when the engine ran but found nothing to emit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOutput {
    pub text_content: Option<String>,
}

impl EngineOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text_content: Some(text.into()),
        }
    }

    pub fn empty() -> Self {
        Self { text_content: None }
    }
}

/// A document-to-text converter.
///
/// Implementations must be `Send + Sync`: one instance is shared by every
/// batch for the lifetime of the process. A call must not depend on earlier
/// calls.
pub trait ConversionEngine: Send + Sync {
    /// Short name for logs, e.g. `"markitdown"`.
    fn name(&self) -> &str;

    /// Convert the file at `path`. The file extension is the format hint.
    fn convert(&self, path: &Path) -> Result<EngineOutput, EngineError>;
}

/// Build the engine for this process.
///
/// Resolution order, most specific first:
///
/// 1. **Explicit program** (`program`): run that converter, whatever `kind`
///    says.
/// 2. **`EngineKind::Native`**: the in-process engine.
/// 3. **`EngineKind::MarkItDown`**: `markitdown` must be on `PATH`, otherwise
///    [`Doc2TextError::EngineNotFound`].
/// 4. **`EngineKind::Auto`**: `markitdown` when it is on `PATH`, the native
///    engine otherwise.
pub fn resolve_engine(
    kind: EngineKind,
    program: Option<PathBuf>,
    args: Vec<String>,
) -> Result<Arc<dyn ConversionEngine>, Doc2TextError> {
    if let Some(program) = program {
        debug!("Using explicit converter program: {}", program.display());
        return Ok(Arc::new(CommandEngine::new(program).with_args(args)));
    }

    match kind {
        EngineKind::Native => Ok(Arc::new(NativeEngine::new())),
        EngineKind::MarkItDown => {
            let engine = CommandEngine::discover(DEFAULT_PROGRAM).ok_or_else(|| {
                Doc2TextError::EngineNotFound {
                    program: DEFAULT_PROGRAM.to_string(),
                    hint: "Install it with: pip install 'markitdown[all]'\n\
                           or point --engine-path at an existing converter."
                        .to_string(),
                }
            })?;
            Ok(Arc::new(engine.with_args(args)))
        }
        EngineKind::Auto => match CommandEngine::discover(DEFAULT_PROGRAM) {
            Some(engine) => {
                info!("Using converter found on PATH: {}", engine.program().display());
                Ok(Arc::new(engine.with_args(args)))
            }
            None => {
                info!("{} not found on PATH; using the native engine", DEFAULT_PROGRAM);
                Ok(Arc::new(NativeEngine::new()))
            }
        },
    }
}
