//! Coordinate mapping between client, display and native image space.
//!
//! Pointer events arrive in client coordinates. The overlay element sits at
//! some bounding box on screen and shows the image at a displayed size that
//! usually differs from the image's natural resolution:
//!
//! ```text
//! native = (client - box_origin) * (natural_size / displayed_size)
//! ```
//!
//! The bounding box goes stale whenever the image reloads, the window resizes
//! or the zoom changes. Hosts must call [`CoordinateMapper::update`] after each
//! of those events; [`CoordinateMapper::invalidate`] drops the cached values
//! when a new image starts loading.

use serde::{Deserialize, Serialize};

use crate::annotation::Point;
use crate::constants::{DEFAULT_ZOOM_PERCENT, MIN_ZOOM_PERCENT, PAN_SCROLL_DIVISOR, ZOOM_STEP_PERCENT};

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Both dimensions are finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Bounding box of the overlay element in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ElementRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Natural versus displayed image size.
///
/// Stored geometry is always native; this transform is applied only when
/// building a scene, so resizing never touches the stored coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayTransform {
    pub natural: Size,
    pub displayed: Size,
}

impl DisplayTransform {
    pub fn new(natural: Size, displayed: Size) -> Self {
        Self { natural, displayed }
    }

    /// A transform that draws the image at its natural size.
    pub fn identity(natural: Size) -> Self {
        Self::new(natural, natural)
    }

    /// Both sizes are usable (non-zero, finite).
    pub fn is_valid(&self) -> bool {
        self.natural.is_valid() && self.displayed.is_valid()
    }

    /// Horizontal display scale (`displayed / natural`).
    pub fn scale_x(&self) -> f32 {
        self.displayed.width / self.natural.width
    }

    /// Vertical display scale (`displayed / natural`).
    pub fn scale_y(&self) -> f32 {
        self.displayed.height / self.natural.height
    }

    /// Map a native point into display pixels.
    pub fn to_display(&self, p: &Point) -> Point {
        Point::new(p.x * self.scale_x(), p.y * self.scale_y())
    }

    /// Map a display point back into native pixels.
    pub fn to_native(&self, p: &Point) -> Point {
        Point::new(p.x / self.scale_x(), p.y / self.scale_y())
    }
}

/// Converts pointer positions into native image coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CoordinateMapper {
    rect: Option<ElementRect>,
    natural: Option<Size>,
}

impl CoordinateMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh the cached bounding box and natural size.
    /// Call on every image load, resize and zoom change.
    pub fn update(&mut self, rect: ElementRect, natural: Size) {
        self.rect = Some(rect);
        self.natural = Some(natural);
    }

    /// Refresh only the bounding box (resize, zoom), keeping the natural size.
    pub fn set_rect(&mut self, rect: ElementRect) {
        self.rect = Some(rect);
    }

    /// Drop the cached layout, e.g. when a new image starts loading.
    pub fn invalidate(&mut self) {
        self.rect = None;
        self.natural = None;
    }

    /// The image is mounted and has a usable layout.
    pub fn is_mounted(&self) -> bool {
        self.transform().is_some()
    }

    pub fn natural(&self) -> Option<Size> {
        self.natural
    }

    pub fn rect(&self) -> Option<ElementRect> {
        self.rect
    }

    /// Current display transform, if both the box and the natural size are known.
    pub fn transform(&self) -> Option<DisplayTransform> {
        let rect = self.rect?;
        let natural = self.natural?;
        let t = DisplayTransform::new(natural, rect.size());
        t.is_valid().then_some(t)
    }

    /// Map a client-space pointer position to native image coordinates.
    /// Returns the zero point while the image is not mounted.
    pub fn client_to_native(&self, client_x: f32, client_y: f32) -> Point {
        match (self.rect, self.transform()) {
            (Some(rect), Some(t)) => t.to_native(&Point::new(client_x - rect.left, client_y - rect.top)),
            _ => Point::zero(),
        }
    }

    /// Map a native point back to client coordinates.
    pub fn native_to_client(&self, p: &Point) -> Option<Point> {
        let rect = self.rect?;
        let t = self.transform()?;
        let d = t.to_display(p);
        Some(Point::new(d.x + rect.left, d.y + rect.top))
    }
}

/// Scale polygons expressed at `reference` resolution to the `displayed` size.
pub fn scale_polygons(polygons: &[Vec<Point>], reference: Size, displayed: Size) -> Vec<Vec<Point>> {
    if !reference.is_valid() {
        return polygons.to_vec();
    }
    let t = DisplayTransform::new(reference, displayed);
    polygons
        .iter()
        .map(|poly| poly.iter().map(|p| t.to_display(p)).collect())
        .collect()
}

/// Zoom level of the standard-image viewport, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zoom {
    percent: u32,
}

impl Zoom {
    pub fn new(percent: u32) -> Self {
        Self {
            percent: percent.max(MIN_ZOOM_PERCENT),
        }
    }

    pub fn percent(&self) -> u32 {
        self.percent
    }

    /// Scale factor applied to the viewport (1.0 = 100%).
    pub fn factor(&self) -> f32 {
        self.percent as f32 / 100.0
    }

    pub fn zoom_in(&self) -> Zoom {
        Zoom::new(self.percent + ZOOM_STEP_PERCENT)
    }

    pub fn zoom_out(&self) -> Zoom {
        Zoom::new(self.percent.saturating_sub(ZOOM_STEP_PERCENT))
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self::new(DEFAULT_ZOOM_PERCENT)
    }
}

/// Scroll position of the viewport container, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollOffset {
    pub left: f32,
    pub top: f32,
}

impl ScrollOffset {
    pub fn new(left: f32, top: f32) -> Self {
        Self { left, top }
    }

    /// Apply a pan drag delta. The scroll moves against the drag, scaled down
    /// by [`PAN_SCROLL_DIVISOR`], and never goes negative.
    pub fn pan_by(&self, dx: f32, dy: f32) -> ScrollOffset {
        ScrollOffset {
            left: (self.left - dx / PAN_SCROLL_DIVISOR).max(0.0),
            top: (self.top - dy / PAN_SCROLL_DIVISOR).max(0.0),
        }
    }
}
