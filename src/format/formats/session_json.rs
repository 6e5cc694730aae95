//! Session JSON format.
//!
//! Full-fidelity save of one image's annotations and landmarks, readable
//! back with [`AnnotationFormat::import`]. See [`SessionData`] for the
//! versioning rules.

use crate::format::error::FormatError;
use crate::format::session::SessionData;
use crate::format::traits::{AnnotationFormat, ExportFile, ExportOptions};

/// Versioned JSON snapshot of a review session.
pub struct SessionJsonFormat;

impl AnnotationFormat for SessionJsonFormat {
    fn id(&self) -> &'static str {
        "session"
    }

    fn display_name(&self) -> &'static str {
        "Review session (JSON)"
    }

    fn extension(&self) -> &'static str {
        "json"
    }

    fn mime_type(&self) -> &'static str {
        "application/json"
    }

    fn supports_import(&self) -> bool {
        true
    }

    fn export(&self, data: &SessionData, options: &ExportOptions) -> Result<ExportFile, FormatError> {
        // Pretty printed for readability
        let json = serde_json::to_string_pretty(data)?;
        let items = data.annotations.len();
        log::info!(
            "📄 Exported session with {} annotations and {} landmarks",
            items,
            data.landmarks.len()
        );

        Ok(ExportFile {
            filename: format!(
                "sesion_{}_{}.json",
                data.display_name(),
                options.date.format("%Y-%m-%d")
            ),
            mime_type: self.mime_type(),
            contents: json.into_bytes(),
            items_exported: items,
        })
    }

    fn import(&self, bytes: &[u8]) -> Result<SessionData, FormatError> {
        let data: SessionData = serde_json::from_slice(bytes)?;

        if !SessionData::is_version_readable(&data.version) {
            return Err(FormatError::VersionMismatch {
                expected: SessionData::CURRENT_VERSION.to_string(),
                found: data.version,
            });
        }
        if !SessionData::is_version_compatible(&data.version) {
            log::warn!(
                "Session version {} is newer than {}; unknown fields were ignored",
                data.version,
                SessionData::CURRENT_VERSION
            );
        }

        log::info!(
            "📂 Imported session with {} annotations and {} landmarks",
            data.annotations.len(),
            data.landmarks.len()
        );
        Ok(data)
    }
}
