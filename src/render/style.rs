//! Overlay styling constants.
//!
//! Sizes are in display pixels. Colours follow the conventions used by the
//! review dashboards so exported overlays match what clinicians see on screen.

use super::scene::Color;

/// Stroke widths and marker sizes.
pub mod stroke {
    /// Outline width for lines, arcs and annotation frames
    pub const LINE_WIDTH: f32 = 2.0;
    /// Endpoint marker radius for measurements and angles
    pub const MARKER_RADIUS: f32 = 4.0;
    /// Anchor dot radius under text annotations
    pub const ANCHOR_RADIUS: f32 = 3.0;
    /// Landmark dot radius
    pub const LANDMARK_RADIUS: f32 = 4.0;
    /// White ring around landmark dots
    pub const LANDMARK_RING_WIDTH: f32 = 2.0;
}

/// Font sizes.
pub mod font {
    /// Distance / degree labels and badges
    pub const LABEL: f32 = 12.0;
    /// Text annotation body
    pub const ANNOTATION: f32 = 14.0;
    /// Text annotation badge (`T1`)
    pub const ANNOTATION_BADGE: f32 = 11.0;
    /// Landmark names
    pub const LANDMARK: f32 = 12.0;
    /// Average glyph advance as a fraction of the font size
    pub const CHAR_WIDTH_RATIO: f32 = 0.6;
}

/// Measurement layout.
pub mod measurement {
    /// Distance label box size
    pub const LABEL_WIDTH: f32 = 70.0;
    pub const LABEL_HEIGHT: f32 = 20.0;
    /// Label baseline sits this far above the midpoint
    pub const LABEL_RAISE: f32 = 10.0;
    /// Badge box size
    pub const BADGE_WIDTH: f32 = 30.0;
    pub const BADGE_HEIGHT: f32 = 20.0;
    /// Badge box top, relative to the start point
    pub const BADGE_OFFSET_Y: f32 = -28.0;
    /// Badge baseline, relative to the start point
    pub const BADGE_BASELINE_Y: f32 = -14.0;
}

/// Angle layout.
pub mod angle {
    /// Radius of the arc drawn at the vertex
    pub const ARC_RADIUS: f32 = 30.0;
    /// Extra distance past the arc for the degree label
    pub const LABEL_DISTANCE: f32 = 20.0;
    /// Degree label box size
    pub const LABEL_WIDTH: f32 = 50.0;
    pub const LABEL_HEIGHT: f32 = 20.0;
    /// Badge box size
    pub const BADGE_WIDTH: f32 = 30.0;
    pub const BADGE_HEIGHT: f32 = 20.0;
    /// Badge box top, relative to the vertex
    pub const BADGE_OFFSET_Y: f32 = 10.0;
    /// Badge baseline, relative to the vertex
    pub const BADGE_BASELINE_Y: f32 = 24.0;
}

/// Text annotation layout.
pub mod annotation {
    /// Horizontal padding added to the measured text width
    pub const PADDING_X: f32 = 8.0;
    /// Frame height
    pub const HEIGHT: f32 = 24.0;
    /// Frame top, relative to the baseline
    pub const OFFSET_Y: f32 = -18.0;
    /// Anchor dot, below the baseline
    pub const ANCHOR_OFFSET_Y: f32 = 10.0;
    /// Badge box
    pub const BADGE_WIDTH: f32 = 24.0;
    pub const BADGE_HEIGHT: f32 = 18.0;
    pub const BADGE_OFFSET_Y: f32 = 15.0;
    pub const BADGE_BASELINE_Y: f32 = 28.0;
}

/// Landmark layout.
pub mod landmark {
    /// Name box offset from the dot
    pub const LABEL_OFFSET_X: f32 = 8.0;
    pub const LABEL_OFFSET_Y: f32 = -10.0;
    pub const LABEL_HEIGHT: f32 = 18.0;
    pub const LABEL_PADDING: f32 = 6.0;
    /// Text offset from the dot
    pub const TEXT_OFFSET_X: f32 = 11.0;
    pub const TEXT_OFFSET_Y: f32 = 3.0;
}

/// Overlay palette.
pub mod colors {
    use super::Color;

    pub const MEASUREMENT: Color = Color::rgb(0x00, 0xd4, 0xff);
    pub const MEASUREMENT_ACTIVE: Color = Color::rgb(0x00, 0xff, 0x00);
    pub const ANGLE: Color = Color::rgb(0xff, 0xaa, 0x00);
    pub const ANGLE_ACTIVE: Color = Color::rgb(0xff, 0x00, 0xff);
    pub const ANNOTATION: Color = Color::rgb(0xff, 0xff, 0x00);
    pub const LANDMARK: Color = Color::rgb(0x00, 0xff, 0x00);
    pub const LANDMARK_RING: Color = Color::WHITE;
    pub const SEGMENTATION: Color = Color::rgb(0xff, 0x4d, 0x4d);
    pub const SEGMENTATION_FILL: Color = Color::rgba(0xff, 0x4d, 0x4d, 0.25);

    /// Background behind measurement and angle labels
    pub const LABEL_BACKGROUND: Color = Color::BLACK;
    pub const ANNOTATION_BACKGROUND: Color = Color::rgba(0, 0, 0, 0.8);
    pub const LANDMARK_BACKGROUND: Color = Color::rgba(0, 0, 0, 0.6);
}

/// Estimated rendered width of `text` at `font_size`.
///
/// Backends without text metrics (SVG export, headless raster) all use this,
/// so label boxes are sized the same on every target.
pub fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * font::CHAR_WIDTH_RATIO
}
