//! External converter engine: run a program, read Markdown from stdout.
//!
//! The default program is Microsoft's `markitdown`, which prints the
//! converted document to stdout and, on failure, exits non-zero with a
//! traceback on stderr whose last line carries the actual error. That last
//! line is what the operator gets to see.

use crate::engine::{ConversionEngine, EngineOutput};
use crate::error::EngineError;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// A [`ConversionEngine`] backed by an external converter CLI.
///
/// The program path is resolved once when the engine is built; every
/// conversion then spawns `program [args..] <path>` and blocks until it exits.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: PathBuf,
    args: Vec<String>,
    name: String,
}

impl CommandEngine {
    /// Create an engine for the given converter program.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        let program = program.into();
        let name = program
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| program.to_string_lossy().into_owned());
        Self {
            program,
            args: Vec::new(),
            name,
        }
    }

    /// Create an engine for `program` found on `PATH`.
    pub fn discover(program: &str) -> Option<Self> {
        which::which(program).ok().map(Self::new)
    }

    /// Extra arguments placed before the file path.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl ConversionEngine for CommandEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn convert(&self, path: &Path) -> Result<EngineOutput, EngineError> {
        debug!(
            "Running {} {:?} {}",
            self.program.display(),
            self.args,
            path.display()
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .output()
            .map_err(|e| {
                EngineError::new(format!("failed to run {}: {e}", self.program.display()))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = last_error_line(&stderr)
                .map(str::to_string)
                .unwrap_or_else(|| format!("{} exited with {}", self.name, output.status));
            return Err(EngineError::new(message));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        if text.is_empty() {
            return Ok(EngineOutput::empty());
        }
        Ok(EngineOutput::text(text))
    }
}

/// The last non-blank line of a converter's stderr.
fn last_error_line(stderr: &str) -> Option<&str> {
    stderr.lines().map(str::trim).rfind(|l| !l.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_program_stem() {
        let engine = CommandEngine::new("/usr/local/bin/markitdown");
        assert_eq!(engine.name(), "markitdown");
        assert_eq!(engine.program(), Path::new("/usr/local/bin/markitdown"));
    }

    #[test]
    fn last_error_line_skips_trailing_blanks() {
        let stderr = "Traceback (most recent call last):\n  File \"x.py\"\n\
                      zipfile.BadZipFile: File is not a zip file\n\n";
        assert_eq!(
            last_error_line(stderr),
            Some("zipfile.BadZipFile: File is not a zip file")
        );
        assert_eq!(last_error_line("  \n\n"), None);
    }

    #[test]
    fn missing_program_is_an_engine_error() {
        let engine = CommandEngine::new("/nonexistent/doc2text-test-converter");
        let err = engine.convert(Path::new("a.txt")).unwrap_err();
        assert!(err.message.contains("failed to run"), "got: {}", err.message);
    }

    #[cfg(unix)]
    #[test]
    fn stdout_becomes_text() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("hello.txt");
        std::fs::write(&file, "hello").unwrap();

        let out = CommandEngine::new("cat").convert(&file).unwrap();
        assert_eq!(out.text_content.as_deref(), Some("hello"));
    }

    #[cfg(unix)]
    #[test]
    fn empty_stdout_is_no_content() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("empty.txt");
        std::fs::write(&file, "").unwrap();

        let out = CommandEngine::new("cat").convert(&file).unwrap();
        assert_eq!(out.text_content, None);
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_reports_stderr() {
        let engine = CommandEngine::new("sh").with_args(vec![
            "-c".into(),
            "echo 'ValueError: corrupt archive' >&2; exit 1".into(),
        ]);
        let err = engine.convert(Path::new("ignored.docx")).unwrap_err();
        assert_eq!(err.message, "ValueError: corrupt archive");
    }
}
