//! Batch input and output types.

use crate::error::ItemError;
use crate::export::Artifact;
use crate::pipeline::metrics::SizeReport;
use crate::pipeline::stage::split_extension;
use serde::Serialize;

/// One uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedItem {
    /// Declared file name; its extension is the engine's format hint.
    pub name: String,
    pub bytes: Vec<u8>,
    /// Size reported by the uploader. Used as the "original" size in
    /// [`SizeReport`].
    pub declared_size: u64,
}

impl UploadedItem {
    /// An upload whose declared size is its byte length.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let declared_size = bytes.len() as u64;
        Self {
            name: name.into(),
            bytes,
            declared_size,
        }
    }

    /// An upload with an explicitly declared size.
    pub fn with_declared_size(name: impl Into<String>, bytes: Vec<u8>, declared_size: u64) -> Self {
        Self {
            name: name.into(),
            bytes,
            declared_size,
        }
    }
}

/// The outcome of converting one upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConversionResult {
    /// Non-empty converted text.
    Success { text: String },
    /// Why the item failed; `Display` is the operator-facing message.
    Failure(ItemError),
}

impl ConversionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ConversionResult::Success { .. })
    }

    /// The converted text, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            ConversionResult::Success { text } => Some(text),
            ConversionResult::Failure(_) => None,
        }
    }

    /// The failure message shown to the operator, if any.
    pub fn message(&self) -> Option<String> {
        match self {
            ConversionResult::Success { .. } => None,
            ConversionResult::Failure(e) => Some(e.to_string()),
        }
    }
}

/// One entry of a [`BatchOutcome`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemOutcome {
    pub name: String,
    pub result: ConversionResult,
    /// Present only when `result` is a success.
    pub size_report: Option<SizeReport>,
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_success()
    }

    /// The upload name with its final extension stripped.
    pub fn base_name(&self) -> &str {
        split_extension(&self.name).0
    }

    /// Rendered Markdown preview.
    pub fn markdown(&self) -> Option<&str> {
        self.result.text()
    }

    /// Raw text view. The engine output is already plain text with Markdown
    /// markup, so it is the same string as [`Self::markdown`].
    pub fn plain_text(&self) -> Option<&str> {
        self.result.text()
    }

    /// The `.md` and `.txt` downloads; empty for a failed item.
    pub fn artifacts(&self) -> Vec<Artifact> {
        match self.result.text() {
            Some(text) => Artifact::for_item(self.base_name(), text),
            None => Vec::new(),
        }
    }
}

/// Per-item results of one batch, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchOutcome {
    pub items: Vec<ItemOutcome>,
}

impl BatchOutcome {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ItemOutcome> {
        self.items.iter()
    }

    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }
}

impl<'a> IntoIterator for &'a BatchOutcome {
    type Item = &'a ItemOutcome;
    type IntoIter = std::slice::Iter<'a, ItemOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn success(name: &str, text: &str) -> ItemOutcome {
        ItemOutcome {
            name: name.into(),
            result: ConversionResult::Success { text: text.into() },
            size_report: Some(SizeReport::compare(10, text)),
        }
    }

    #[test]
    fn new_uses_byte_length_as_declared_size() {
        let item = UploadedItem::new("a.txt", b"hello".to_vec());
        assert_eq!(item.declared_size, 5);
        let item = UploadedItem::with_declared_size("a.txt", b"hello".to_vec(), 99);
        assert_eq!(item.declared_size, 99);
    }

    #[test]
    fn base_name_strips_final_extension() {
        assert_eq!(success("report.v2.docx", "x").base_name(), "report.v2");
        assert_eq!(success("README", "x").base_name(), "README");
    }

    #[test]
    fn previews_and_artifacts_for_success() {
        let item = success("notes.txt", "hello");
        assert_eq!(item.markdown(), Some("hello"));
        assert_eq!(item.plain_text(), Some("hello"));
        let names: Vec<_> = item.artifacts().into_iter().map(|a| a.file_name).collect();
        assert_eq!(names, ["notes_converted.md", "notes_converted.txt"]);
    }

    #[test]
    fn failure_has_no_artifacts() {
        let item = ItemOutcome {
            name: "bad.pdf".into(),
            result: ConversionResult::Failure(ItemError::EmptyResult),
            size_report: None,
        };
        assert!(item.artifacts().is_empty());
        assert!(item.markdown().is_none());
    }

    #[test]
    fn batch_counts() {
        let outcome = BatchOutcome {
            items: vec![
                success("a.txt", "a"),
                ItemOutcome {
                    name: "b.pdf".into(),
                    result: ConversionResult::Failure(ItemError::Engine {
                        message: "boom".into(),
                    }),
                    size_report: None,
                },
            ],
        };
        assert_eq!(outcome.len(), 2);
        assert_eq!(outcome.succeeded(), 1);
        assert_eq!(outcome.failed(), 1);
    }

    #[test]
    fn serialises_with_status_tag() {
        let json = serde_json::to_value(success("a.txt", "hi")).unwrap();
        assert_eq!(json["result"]["status"], "success");
        assert_eq!(json["result"]["text"], "hi");

        let failure = ConversionResult::Failure(ItemError::Engine {
            message: "boom".into(),
        });
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["kind"], "engine");
        assert_eq!(json["message"], "boom");
    }

    #[test]
    fn every_failure_serialises_its_message() {
        let cases = [
            (
                ItemError::Staging {
                    detail: "disk full".into(),
                },
                "staging",
                crate::error::STAGING_FAILED_MESSAGE,
            ),
            (
                ItemError::Engine {
                    message: "corrupt archive".into(),
                },
                "engine",
                "corrupt archive",
            ),
            (
                ItemError::EmptyResult,
                "empty_result",
                crate::error::EMPTY_RESULT_MESSAGE,
            ),
        ];
        for (error, kind, message) in cases {
            let item = ItemOutcome {
                name: "scan.pdf".into(),
                result: ConversionResult::Failure(error),
                size_report: None,
            };
            let json = serde_json::to_value(&item).unwrap();
            assert_eq!(json["result"]["status"], "failure");
            assert_eq!(json["result"]["kind"], kind);
            assert_eq!(json["result"]["message"], message);
        }

        let staging = serde_json::to_value(ConversionResult::Failure(ItemError::Staging {
            detail: "disk full".into(),
        }))
        .unwrap();
        assert_eq!(staging["detail"], "disk full");
    }
}
