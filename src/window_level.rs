//! Window/level (contrast/brightness) display mapping.
//!
//! Standard images are remapped on the client: the red channel of each
//! pixel is treated as the intensity and mapped through a linear ramp
//! `[center - width/2, center + width/2] -> [0, 255]`. The result is written
//! as gray to R, G and B; alpha is preserved. DICOM images hand the same two
//! values to the external renderer instead.

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_WINDOW_CENTER, DEFAULT_WINDOW_WIDTH, WINDOW_CENTER_RANGE, WINDOW_WIDTH_RANGE,
};

/// Window width and center, kept within their slider ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowLevel {
    width: f32,
    center: f32,
}

impl WindowLevel {
    /// Create a window, clamping both values into range.
    pub fn new(width: f32, center: f32) -> Self {
        Self {
            width: clamp_width(width),
            center: clamp_center(center),
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn center(&self) -> f32 {
        self.center
    }

    pub fn set_width(&mut self, width: f32) {
        self.width = clamp_width(width);
    }

    pub fn set_center(&mut self, center: f32) {
        self.center = clamp_center(center);
    }

    /// Lower edge of the window.
    pub fn min(&self) -> f32 {
        self.center - self.width / 2.0
    }

    /// Upper edge of the window.
    pub fn max(&self) -> f32 {
        self.center + self.width / 2.0
    }

    /// Still at the default values (no remapping needed).
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Map one intensity value.
    pub fn map(&self, value: u8) -> u8 {
        let v = f32::from(value);
        if v <= self.min() {
            0
        } else if v >= self.max() {
            255
        } else {
            ((v - self.min()) / self.width * 255.0).round().clamp(0.0, 255.0) as u8
        }
    }

    /// Apply to packed RGBA bytes in place (e.g. canvas `ImageData`).
    pub fn apply_rgba(&self, pixels: &mut [u8]) {
        let lut = self.lookup_table();
        for px in pixels.chunks_exact_mut(4) {
            let gray = lut[usize::from(px[0])];
            px[0] = gray;
            px[1] = gray;
            px[2] = gray;
        }
    }

    /// Apply to an image buffer in place.
    pub fn apply(&self, image: &mut RgbaImage) {
        self.apply_rgba(image);
        log::debug!(
            "🎚️ Applied window/level W={} C={} to {}x{}",
            self.width,
            self.center,
            image.width(),
            image.height()
        );
    }

    fn lookup_table(&self) -> [u8; 256] {
        let mut lut = [0u8; 256];
        for (i, slot) in lut.iter_mut().enumerate() {
            *slot = self.map(i as u8);
        }
        lut
    }
}

impl Default for WindowLevel {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_WIDTH, DEFAULT_WINDOW_CENTER)
    }
}

fn clamp_width(width: f32) -> f32 {
    if width.is_finite() {
        width.clamp(WINDOW_WIDTH_RANGE.0, WINDOW_WIDTH_RANGE.1)
    } else {
        DEFAULT_WINDOW_WIDTH
    }
}

fn clamp_center(center: f32) -> f32 {
    if center.is_finite() {
        center.clamp(WINDOW_CENTER_RANGE.0, WINDOW_CENTER_RANGE.1)
    } else {
        DEFAULT_WINDOW_CENTER
    }
}
