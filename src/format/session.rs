//! Session data shared by every export format.
//!
//! `SessionData` is a snapshot of one image's review state: the annotation
//! store, the backend landmarks and enough image metadata to name files.
//!
//! # Versioning
//!
//! Session files use semantic versioning (MAJOR.MINOR.PATCH). Any file with
//! the current major version can be read; newer minor versions load with a
//! warning because unknown fields are ignored.

use serde::{Deserialize, Serialize};

use crate::annotation::{AnnotationStore, Landmark};
use crate::constants::DEFAULT_IMAGE_NAME;
use crate::transform::Size;

/// Snapshot of one image's annotations for export/import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    /// Format version for compatibility checking.
    pub version: String,

    /// Name of the reviewed image, if known.
    #[serde(default)]
    pub image_name: Option<String>,

    /// Natural image size the coordinates refer to.
    #[serde(default)]
    pub natural_size: Option<Size>,

    /// User annotations, in native image pixels.
    #[serde(default)]
    pub annotations: AnnotationStore,

    /// Backend landmarks, in native image pixels.
    #[serde(default)]
    pub landmarks: Vec<Landmark>,
}

impl SessionData {
    /// Current version of the session format.
    pub const CURRENT_VERSION: &'static str = "1.0.0";

    /// Major version number for compatibility checking.
    pub const VERSION_MAJOR: u32 = 1;

    /// Minor version number.
    pub const VERSION_MINOR: u32 = 0;

    pub fn new(annotations: AnnotationStore) -> Self {
        Self {
            version: Self::CURRENT_VERSION.to_string(),
            image_name: None,
            natural_size: None,
            annotations,
            landmarks: Vec::new(),
        }
    }

    pub fn with_image_name(mut self, name: impl Into<String>) -> Self {
        self.image_name = Some(name.into());
        self
    }

    pub fn with_natural_size(mut self, size: Size) -> Self {
        self.natural_size = Some(size);
        self
    }

    pub fn with_landmarks(mut self, landmarks: Vec<Landmark>) -> Self {
        self.landmarks = landmarks;
        self
    }

    /// Image name used in export file names; `imagen` when unknown or blank.
    pub fn display_name(&self) -> &str {
        match self.image_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => DEFAULT_IMAGE_NAME,
        }
    }

    /// Parse a version string into (major, minor, patch) components.
    ///
    /// Returns None if the version string is invalid.
    pub fn parse_version(version: &str) -> Option<(u32, u32, u32)> {
        let mut parts = version.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        let patch = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some((major, minor, patch))
    }

    /// Same major version: the file can be read.
    pub fn is_version_readable(file_version: &str) -> bool {
        Self::parse_version(file_version).is_some_and(|(major, _, _)| major == Self::VERSION_MAJOR)
    }

    /// Same major and no newer minor: the file is read without loss.
    pub fn is_version_compatible(file_version: &str) -> bool {
        Self::parse_version(file_version).is_some_and(|(major, minor, _)| {
            major == Self::VERSION_MAJOR && minor <= Self::VERSION_MINOR
        })
    }
}

impl Default for SessionData {
    fn default() -> Self {
        Self::new(AnnotationStore::new())
    }
}
