//! Engine adapter: fold every engine outcome into a [`ConversionResult`].
//!
//! Engines can fail in two ways that the operator must be able to tell
//! apart: the engine raised an error (its message is shown verbatim), or it
//! ran fine but produced nothing (a fixed explanatory message is shown).
//! Callers only ever see the two-variant result, so an empty string can
//! never masquerade as a successful conversion.
//!
//! A panic inside the engine is caught here and reported as an engine
//! failure for that item, so the rest of the batch still runs and the staged
//! file is still released.

use crate::engine::ConversionEngine;
use crate::error::{EngineError, ItemError};
use crate::output::ConversionResult;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Wraps a shared engine handle. Cheap to clone; holds no per-call state.
#[derive(Clone)]
pub struct ConversionAdapter {
    engine: Arc<dyn ConversionEngine>,
}

impl ConversionAdapter {
    pub fn new(engine: Arc<dyn ConversionEngine>) -> Self {
        Self { engine }
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Run the engine once on `path`. No retries.
    pub fn convert(&self, path: &Path) -> ConversionResult {
        let start = Instant::now();
        let outcome = catch_unwind(AssertUnwindSafe(|| self.engine.convert(path)))
            .unwrap_or_else(|payload| {
                let message = format!(
                    "{} crashed: {}",
                    self.engine.name(),
                    panic_message(payload.as_ref())
                );
                warn!("{}", message);
                Err(EngineError::new(message))
            });
        debug!(
            "{}: {} in {:?}",
            self.engine.name(),
            path.display(),
            start.elapsed()
        );

        match outcome {
            Err(e) => ConversionResult::Failure(ItemError::from(e)),
            Ok(output) => match output.text_content {
                Some(text) if !text.trim().is_empty() => ConversionResult::Success { text },
                _ => ConversionResult::Failure(ItemError::EmptyResult),
            },
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineOutput;
    use crate::error::EMPTY_RESULT_MESSAGE;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedEngine {
        reply: Result<EngineOutput, EngineError>,
        calls: AtomicUsize,
    }

    impl FixedEngine {
        fn adapter(reply: Result<EngineOutput, EngineError>) -> (ConversionAdapter, Arc<Self>) {
            let engine = Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
            });
            (ConversionAdapter::new(engine.clone()), engine)
        }
    }

    impl ConversionEngine for FixedEngine {
        fn name(&self) -> &str {
            "fixed"
        }

        fn convert(&self, _path: &Path) -> Result<EngineOutput, EngineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone()
        }
    }

    #[test]
    fn text_is_success() {
        let (adapter, _) = FixedEngine::adapter(Ok(EngineOutput::text("# Title")));
        assert_eq!(
            adapter.convert(Path::new("x.docx")),
            ConversionResult::Success {
                text: "# Title".into()
            }
        );
    }

    #[test]
    fn engine_error_passes_through_verbatim() {
        let (adapter, engine) = FixedEngine::adapter(Err(EngineError::new("corrupt archive")));
        let result = adapter.convert(Path::new("x.docx"));
        assert_eq!(result.message().as_deref(), Some("corrupt archive"));
        assert_eq!(engine.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn missing_text_is_empty_result() {
        let (adapter, _) = FixedEngine::adapter(Ok(EngineOutput::empty()));
        let result = adapter.convert(Path::new("scan.pdf"));
        assert_eq!(result, ConversionResult::Failure(ItemError::EmptyResult));
        assert_eq!(result.message().as_deref(), Some(EMPTY_RESULT_MESSAGE));
    }

    #[test]
    fn blank_text_is_empty_result() {
        for blank in ["", "\n\n", "   \t"] {
            let (adapter, _) = FixedEngine::adapter(Ok(EngineOutput::text(blank)));
            assert_eq!(
                adapter.convert(Path::new("x.txt")),
                ConversionResult::Failure(ItemError::EmptyResult),
                "input: {blank:?}"
            );
        }
    }

    #[test]
    fn empty_result_differs_from_empty_engine_message() {
        let (thrown, _) = FixedEngine::adapter(Err(EngineError::new("")));
        let (empty, _) = FixedEngine::adapter(Ok(EngineOutput::empty()));
        assert_ne!(
            thrown.convert(Path::new("a")).message(),
            empty.convert(Path::new("a")).message()
        );
    }

    struct PanickingEngine;

    impl ConversionEngine for PanickingEngine {
        fn name(&self) -> &str {
            "panicky"
        }

        fn convert(&self, path: &Path) -> Result<EngineOutput, EngineError> {
            panic!("cannot parse {}", path.display());
        }
    }

    #[test]
    fn engine_panic_becomes_engine_failure() {
        let adapter = ConversionAdapter::new(Arc::new(PanickingEngine));
        let result = adapter.convert(Path::new("deck.pptx"));
        assert!(matches!(
            result,
            ConversionResult::Failure(ItemError::Engine { .. })
        ));
        assert_eq!(
            result.message().as_deref(),
            Some("panicky crashed: cannot parse deck.pptx")
        );
    }
}
