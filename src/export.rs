//! Download artifacts: the `.md` and `.txt` files produced per item.
//!
//! Artifacts are built in memory from an [`ItemOutcome`]; writing them is a
//! separate step so a host can stream them elsewhere (an HTTP response, an
//! archive) instead of the local disk.

use crate::error::Doc2TextError;
use crate::output::BatchOutcome;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const MARKDOWN_MIME: &str = "text/markdown";
pub const PLAIN_TEXT_MIME: &str = "text/plain";

/// One downloadable file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    /// `<basename>_converted.md` or `<basename>_converted.txt`.
    pub file_name: String,
    pub mime: &'static str,
    #[serde(skip)]
    pub contents: String,
}

impl Artifact {
    /// The Markdown and plain-text downloads for one converted item.
    pub fn for_item(base_name: &str, text: &str) -> Vec<Artifact> {
        let stem = format!("{base_name}_converted");
        vec![
            Artifact {
                file_name: format!("{stem}.md"),
                mime: MARKDOWN_MIME,
                contents: text.to_string(),
            },
            Artifact {
                file_name: format!("{stem}.txt"),
                mime: PLAIN_TEXT_MIME,
                contents: text.to_string(),
            },
        ]
    }
}

/// Write every successful item's artifacts into `dir`.
///
/// Uses atomic writes (temp file + rename) so a reader never sees a partial
/// file. Upload names containing path separators are flattened to their
/// final component. When two items map to the same file names (`report.txt`
/// and `report.csv`), later ones get a numeric suffix
/// (`report_converted-2.md`) so nothing is overwritten. Returns the written
/// paths in batch order.
pub async fn write_artifacts(
    outcome: &BatchOutcome,
    dir: impl AsRef<Path>,
) -> Result<Vec<PathBuf>, Doc2TextError> {
    let dir = dir.as_ref();
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| Doc2TextError::OutputWriteFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;

    let mut written = Vec::new();
    let mut taken = HashSet::new();
    for item in outcome {
        let artifacts = item.artifacts();
        if artifacts.is_empty() {
            continue;
        }
        let names = claim_names(&artifacts, &mut taken);
        if names[0] != file_component(&artifacts[0].file_name) {
            warn!("'{}': output name in use, writing {}", item.name, names[0]);
        }

        for (artifact, name) in artifacts.iter().zip(names) {
            let path = dir.join(name);
            write_atomic(&path, &artifact.contents).await?;
            debug!("Wrote {} ({})", path.display(), artifact.mime);
            written.push(path);
        }
    }

    info!("Wrote {} artifacts to {}", written.len(), dir.display());
    Ok(written)
}

async fn write_atomic(path: &Path, contents: &str) -> Result<(), Doc2TextError> {
    let write_err = |source| Doc2TextError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, contents).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)
}

/// Pick file names for one item's artifacts that no earlier item in this
/// call has used. All of an item's artifacts share the same counter.
fn claim_names(artifacts: &[Artifact], taken: &mut HashSet<String>) -> Vec<String> {
    let mut n = 1;
    loop {
        let names: Vec<String> = artifacts
            .iter()
            .map(|a| numbered(file_component(&a.file_name), n))
            .collect();
        if names.iter().all(|name| !taken.contains(name)) {
            taken.extend(names.iter().cloned());
            return names;
        }
        n += 1;
    }
}

fn numbered(name: &str, n: usize) -> String {
    if n == 1 {
        return name.to_string();
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}-{n}.{ext}"),
        None => format!("{name}-{n}"),
    }
}

fn file_component(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}
