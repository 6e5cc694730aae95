//! Image source classification.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_IMAGE_NAME;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    /// Browser-decodable raster (PNG, JPEG, ...)
    Standard,
    /// Rendered by the external DICOM library
    Dicom,
}

/// The image currently shown by a viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSource {
    url: String,
    kind: ImageKind,
}

impl ImageSource {
    /// Classify `url`: DICOM when it ends in `.dcm` (any case, query and
    /// fragment ignored) or uses the `wadouri:` scheme.
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let kind = if is_dicom_url(&url) {
            ImageKind::Dicom
        } else {
            ImageKind::Standard
        };
        Self { url, kind }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn kind(&self) -> ImageKind {
        self.kind
    }

    pub fn is_dicom(&self) -> bool {
        self.kind == ImageKind::Dicom
    }

    /// Last path segment, used to name exports.
    pub fn name(&self) -> &str {
        let path = strip_query(&self.url);
        path.rsplit(['/', '\\'])
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_IMAGE_NAME)
    }
}

fn strip_query(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}

fn is_dicom_url(url: &str) -> bool {
    let url = url.trim();
    let scheme = url.get(..7).is_some_and(|s| s.eq_ignore_ascii_case("wadouri"))
        && url[7..].starts_with(':');
    scheme || strip_query(url).to_ascii_lowercase().ends_with(".dcm")
}
