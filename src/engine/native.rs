//! In-process engine for text-based formats.
//!
//! Covers the formats that need no document parser: plain text and Markdown
//! pass through, CSV becomes a GFM table, HTML is rewritten to Markdown.
//! Office formats and PDF are reported as unsupported; install `markitdown`
//! and use [`crate::engine::CommandEngine`] for those.

use crate::engine::{ConversionEngine, EngineOutput};
use crate::error::EngineError;
use std::path::Path;
use tracing::debug;

/// A [`ConversionEngine`] for `txt`, `md`, `csv`, `html` and `htm` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeEngine;

impl NativeEngine {
    pub fn new() -> Self {
        Self
    }
}

impl ConversionEngine for NativeEngine {
    fn name(&self) -> &str {
        "native"
    }

    fn convert(&self, path: &Path) -> Result<EngineOutput, EngineError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        let convert: fn(&str) -> String = match ext.as_str() {
            "txt" | "md" | "markdown" => str::to_string,
            "csv" => csv_to_markdown,
            "html" | "htm" => |html: &str| html2md::rewrite_html(html, true),
            "" => return Err(EngineError::new("unsupported format: file has no extension")),
            other => return Err(EngineError::new(format!("unsupported format: .{other}"))),
        };

        let bytes = std::fs::read(path).map_err(|e| EngineError::new(e.to_string()))?;
        let source = String::from_utf8(bytes)
            .map_err(|e| EngineError::new(format!("file is not valid UTF-8 text: {e}")))?;
        let source = source.strip_prefix('\u{FEFF}').unwrap_or(&source);

        debug!("native: converting {} bytes of .{}", source.len(), ext);
        let text = convert(source);
        if text.trim().is_empty() {
            return Ok(EngineOutput::empty());
        }
        Ok(EngineOutput::text(text))
    }
}

/// Render CSV as a GFM table; the first record is the header row.
fn csv_to_markdown(input: &str) -> String {
    let rows = parse_csv(input);
    let Some(width) = rows.iter().map(Vec::len).max() else {
        return String::new();
    };

    let mut out = String::new();
    for (i, row) in rows.iter().enumerate() {
        out.push('|');
        for col in 0..width {
            let cell = row.get(col).map(String::as_str).unwrap_or("");
            out.push(' ');
            out.push_str(&escape_cell(cell));
            out.push_str(" |");
        }
        out.push('\n');
        if i == 0 {
            out.push('|');
            out.push_str(&" --- |".repeat(width));
            out.push('\n');
        }
    }
    out
}

fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// Split CSV into records, honouring double-quoted fields with `""` escapes
/// and embedded newlines. Blank lines are dropped.
fn parse_csv(input: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => row.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                row.push(std::mem::take(&mut field));
                if !(row.len() == 1 && row[0].is_empty()) {
                    rows.push(std::mem::take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.push(c),
        }
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn text_passes_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "a.txt", "hello");
        let out = NativeEngine.convert(&path).unwrap();
        assert_eq!(out.text_content.as_deref(), Some("hello"));
    }

    #[test]
    fn bom_is_stripped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "a.txt", "\u{FEFF}hi");
        let out = NativeEngine.convert(&path).unwrap();
        assert_eq!(out.text_content.as_deref(), Some("hi"));
    }

    #[test]
    fn empty_file_has_no_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "blank.txt", "  \n");
        assert_eq!(NativeEngine.convert(&path).unwrap(), EngineOutput::empty());
    }

    #[test]
    fn unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "report.docx", "PK");
        let err = NativeEngine.convert(&path).unwrap_err();
        assert_eq!(err.message, "unsupported format: .docx");
    }

    #[test]
    fn invalid_utf8_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bin.txt");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        let err = NativeEngine.convert(&path).unwrap_err();
        assert!(err.message.starts_with("file is not valid UTF-8"));
    }

    #[test]
    fn csv_becomes_table() {
        let md = csv_to_markdown("name,qty\nwidget,3\n\"a, b\",\"say \"\"hi\"\"\"\n");
        assert_eq!(
            md,
            "| name | qty |\n| --- | --- |\n| widget | 3 |\n| a, b | say \"hi\" |\n"
        );
    }

    #[test]
    fn csv_ragged_rows_are_padded() {
        let md = csv_to_markdown("a,b,c\r\n1\r\n\r\n");
        assert_eq!(md, "| a | b | c |\n| --- | --- | --- |\n| 1 |  |  |\n");
    }

    #[test]
    fn csv_pipes_are_escaped() {
        assert_eq!(escape_cell("x|y"), "x\\|y");
    }

    #[test]
    fn html_becomes_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "page.HTML", "<h1>Title</h1><p>Body text</p>");
        let text = NativeEngine.convert(&path).unwrap().text_content.unwrap();
        assert!(text.contains("Title"), "got: {text}");
        assert!(text.contains("Body text"), "got: {text}");
    }
}
