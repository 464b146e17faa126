//! Staging: persist an upload to a temporary file the engine can open.
//!
//! Engines sniff the format from the file extension, so the staged file keeps
//! the upload's suffix. Every staged file is unique (`tempfile` creates it
//! with `O_EXCL`) and is owned by a [`StagedFile`] guard: the file is deleted
//! on [`StagedFile::release`] or, failing that, when the guard is dropped.
//! Deletion errors are swallowed in both paths.

use crate::error::StagingError;
use crate::output::UploadedItem;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tracing::debug;

const STAGED_PREFIX: &str = "doc2text-";

/// Split a declared name into `(stem, suffix)`.
///
/// The suffix starts at the last `.` of the final path component and keeps
/// the dot. Names without a dot, or whose only dot leads the name
/// (`.bashrc`), have an empty suffix.
///
/// ```rust
/// use doc2text::pipeline::stage::split_extension;
///
/// assert_eq!(split_extension("report.final.docx"), ("report.final", ".docx"));
/// assert_eq!(split_extension("README"), ("README", ""));
/// assert_eq!(split_extension(".bashrc"), (".bashrc", ""));
/// ```
pub fn split_extension(name: &str) -> (&str, &str) {
    let file_start = name.rfind(['/', '\\']).map(|i| i + 1).unwrap_or(0);
    let file_name = &name[file_start..];
    match file_name.rfind('.') {
        Some(dot) if file_name[..dot].chars().any(|c| c != '.') => {
            name.split_at(file_start + dot)
        }
        _ => (name, ""),
    }
}

/// Writes uploads into a staging directory.
#[derive(Debug, Clone, Default)]
pub struct StagingStore {
    dir: Option<PathBuf>,
}

impl StagingStore {
    /// Stage into `dir`, or the system temp directory when `None`.
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    /// Write `item` to a new, uniquely named temporary file.
    ///
    /// On error nothing is left on disk: a file that was created but could not
    /// be written is removed before returning.
    pub fn stage(&self, item: &UploadedItem) -> Result<StagedFile, StagingError> {
        let (_, suffix) = split_extension(&item.name);
        let wrap = |source| StagingError {
            name: item.name.clone(),
            source,
        };

        let mut builder = tempfile::Builder::new();
        builder.prefix(STAGED_PREFIX).suffix(suffix);
        let mut file = match self.dir {
            Some(ref dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(wrap)?;

        file.write_all(&item.bytes).map_err(wrap)?;
        file.flush().map_err(wrap)?;

        // Close the handle so the engine sees a finished file; the path guard
        // keeps ownership of the deletion.
        let path = file.into_temp_path();
        debug!(
            "Staged '{}' ({} bytes) at {}",
            item.name,
            item.bytes.len(),
            path.display()
        );
        Ok(StagedFile { path })
    }
}

/// A staged upload on disk, deleted when released or dropped.
#[derive(Debug)]
pub struct StagedFile {
    path: TempPath,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the staged file. Best-effort: a failed delete is ignored.
    pub fn release(self) {
        let _ = self.path.close();
    }
}
