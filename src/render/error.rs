//! Error types for overlay rendering.

use thiserror::Error;

/// Errors that can occur while painting a scene onto a surface.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Surface dimensions are zero, negative or not finite
    #[error("Invalid surface size {width}x{height}")]
    InvalidSize {
        /// Requested width in pixels
        width: f32,
        /// Requested height in pixels
        height: f32,
    },

    /// Overlay and base image disagree on size
    #[error("Overlay is {overlay_width}x{overlay_height} but image is {image_width}x{image_height}")]
    SizeMismatch {
        overlay_width: u32,
        overlay_height: u32,
        image_width: u32,
        image_height: u32,
    },

    /// The generated SVG could not be parsed for rasterization
    #[error("SVG error: {0}")]
    Svg(String),

    /// SVG document could not be written
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Browser canvas call failed
    #[error("Canvas error: {0}")]
    Canvas(String),

    /// Image decoding or encoding failed
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl RenderError {
    /// Create an invalid size error.
    pub fn invalid_size(width: f32, height: f32) -> Self {
        Self::InvalidSize { width, height }
    }
}
