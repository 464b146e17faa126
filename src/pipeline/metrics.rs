//! Size analytics: how much smaller (or larger) the text is than the upload.

use serde::Serialize;

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Format a byte count with two decimals in the largest unit below 1024.
///
/// TB is the last unit; larger values keep counting in TB.
///
/// ```rust
/// use doc2text::format_size;
///
/// assert_eq!(format_size(0), "0.00 B");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    for unit in &UNITS[..UNITS.len() - 1] {
        if value < 1024.0 {
            return format!("{value:.2} {unit}");
        }
        value /= 1024.0;
    }
    format!("{value:.2} {}", UNITS[UNITS.len() - 1])
}

/// Size comparison between an upload and its converted text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeReport {
    pub original_bytes: u64,
    /// UTF-8 byte length of the converted text.
    pub converted_bytes: u64,
    pub original_display: String,
    pub converted_display: String,
    /// `(original - converted) / original * 100`; `0` for an empty original.
    /// Negative when the text is larger than the upload.
    pub reduction_pct: f64,
}

impl SizeReport {
    /// Compare an upload's declared size against its converted text.
    pub fn compare(original_bytes: u64, converted_text: &str) -> Self {
        let converted_bytes = converted_text.len() as u64;
        let reduction_pct = if original_bytes == 0 {
            0.0
        } else {
            (original_bytes as f64 - converted_bytes as f64) / original_bytes as f64 * 100.0
        };
        Self {
            original_bytes,
            converted_bytes,
            original_display: format_size(original_bytes),
            converted_display: format_size(converted_bytes),
            reduction_pct,
        }
    }

    /// The reduction with one decimal place, e.g. `80.0%` or `-12.5%`.
    pub fn reduction_display(&self) -> String {
        // Avoid rendering `-0.0%` for a rounded-away negative.
        let pct = if self.reduction_pct.abs() < 0.05 {
            0.0
        } else {
            self.reduction_pct
        };
        format!("{pct:.1}%")
    }

    /// The two-row summary: original then converted size.
    pub fn summary_rows(&self) -> [(&'static str, &str); 2] {
        [
            ("Original", self.original_display.as_str()),
            ("Converted", self.converted_display.as_str()),
        ]
    }

    /// [`Self::summary_rows`] as a GFM table.
    pub fn to_markdown_table(&self) -> String {
        let mut table = String::from("| Version | Size |\n| --- | --- |\n");
        for (label, size) in self.summary_rows() {
            table.push_str(&format!("| {label} | {size} |\n"));
        }
        table
    }
}
