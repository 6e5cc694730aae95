//! Format registry for discovering and accessing export formats.

use std::collections::HashMap;

use crate::format::error::FormatError;
use crate::format::formats::{CsvFormat, SessionJsonFormat};
use crate::format::traits::AnnotationFormat;

/// Registry of available export formats, keyed by format id.
///
/// All built-in formats are registered automatically on creation.
pub struct FormatRegistry {
    formats: HashMap<&'static str, Box<dyn AnnotationFormat>>,
}

impl FormatRegistry {
    /// Create a new registry with all built-in formats registered.
    pub fn new() -> Self {
        let mut registry = Self {
            formats: HashMap::new(),
        };

        registry.register(Box::new(CsvFormat));
        registry.register(Box::new(SessionJsonFormat));

        registry
    }

    /// Register a format implementation.
    pub fn register(&mut self, format: Box<dyn AnnotationFormat>) {
        self.formats.insert(format.id(), format);
    }

    /// Get a format by its ID.
    pub fn get(&self, id: &str) -> Option<&dyn AnnotationFormat> {
        self.formats.get(id).map(|f| f.as_ref())
    }

    /// Get a format by its ID, or an [`FormatError::UnknownFormat`].
    pub fn require(&self, id: &str) -> Result<&dyn AnnotationFormat, FormatError> {
        self.get(id)
            .ok_or_else(|| FormatError::UnknownFormat(id.to_string()))
    }

    /// Find the format that writes files with extension `ext`.
    pub fn by_extension(&self, ext: &str) -> Option<&dyn AnnotationFormat> {
        let ext = ext.trim_start_matches('.');
        self.formats
            .values()
            .find(|f| f.extension().eq_ignore_ascii_case(ext))
            .map(|f| f.as_ref())
    }

    /// Get all format IDs, sorted.
    pub fn ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.formats.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Formats that can be read back.
    pub fn importable(&self) -> Vec<&dyn AnnotationFormat> {
        self.formats
            .values()
            .filter(|f| f.supports_import())
            .map(|f| f.as_ref())
            .collect()
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}
