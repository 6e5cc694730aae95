//! Trait definitions for export format implementations.

use chrono::{NaiveDate, Utc};

use crate::format::error::FormatError;
use crate::format::session::SessionData;

/// Trait for annotation export (and optionally import) formats.
///
/// Formats produce an in-memory [`ExportFile`]; writing it to disk (native)
/// or handing it to the browser as a download (wasm) is up to the caller.
pub trait AnnotationFormat: Send + Sync {
    /// Unique identifier for this format (e.g., "csv", "session").
    fn id(&self) -> &'static str;

    /// Human-readable name for UI display.
    fn display_name(&self) -> &'static str;

    /// File extension without the dot.
    fn extension(&self) -> &'static str;

    /// MIME type used for downloads.
    fn mime_type(&self) -> &'static str;

    /// Whether [`AnnotationFormat::import`] is implemented.
    fn supports_import(&self) -> bool {
        false
    }

    /// Serialize the session.
    fn export(&self, data: &SessionData, options: &ExportOptions) -> Result<ExportFile, FormatError>;

    /// Parse a previously exported file.
    fn import(&self, _bytes: &[u8]) -> Result<SessionData, FormatError> {
        Err(FormatError::UnsupportedOperation(format!(
            "{} cannot be imported",
            self.display_name()
        )))
    }
}

/// Options for export operations.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Date stamped into the file name.
    pub date: NaiveDate,
}

impl ExportOptions {
    /// Options stamped with today's date (UTC).
    pub fn new() -> Self {
        Self {
            date: Utc::now().date_naive(),
        }
    }

    /// Use a fixed date instead of today.
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// An exported file held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    /// Suggested file name.
    pub filename: String,

    /// MIME type for downloads.
    pub mime_type: &'static str,

    /// File contents.
    pub contents: Vec<u8>,

    /// Number of annotation items written.
    pub items_exported: usize,
}

impl ExportFile {
    /// Contents as UTF-8 text (every built-in format is text).
    pub fn text(&self) -> Result<&str, FormatError> {
        std::str::from_utf8(&self.contents)
            .map_err(|e| FormatError::invalid_format(format!("export is not UTF-8: {e}")))
    }

    /// Write the file into `dir` under its suggested name.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn write_to_dir(&self, dir: &std::path::Path) -> Result<std::path::PathBuf, FormatError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.contents)?;
        log::info!("💾 Wrote {} ({} items)", path.display(), self.items_exported);
        Ok(path)
    }
}
