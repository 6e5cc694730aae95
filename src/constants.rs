//! Global constants for the clinview overlay.

/// Minimum native-space drag length (exclusive) for a measurement to be kept.
pub const MIN_MEASUREMENT_DISTANCE: f32 = 5.0;

/// Maximum number of characters in a text annotation.
pub const MAX_ANNOTATION_CHARS: usize = 50;

/// Number of pointer-down events needed to build an angle.
pub const ANGLE_CLICKS: u8 = 3;

/// Divisor applied to the pan drag delta before it is added to the scroll offset.
pub const PAN_SCROLL_DIVISOR: f32 = 10.0;

/// Default zoom level in percent
pub const DEFAULT_ZOOM_PERCENT: u32 = 100;

/// Zoom step for zoom in/out in percent
pub const ZOOM_STEP_PERCENT: u32 = 10;

/// Lowest zoom level in percent
pub const MIN_ZOOM_PERCENT: u32 = 10;

/// Default window width for window/level
pub const DEFAULT_WINDOW_WIDTH: f32 = 400.0;

/// Default window center for window/level
pub const DEFAULT_WINDOW_CENTER: f32 = 40.0;

/// Allowed window width range (inclusive)
pub const WINDOW_WIDTH_RANGE: (f32, f32) = (1.0, 2000.0);

/// Allowed window center range (inclusive)
pub const WINDOW_CENTER_RANGE: (f32, f32) = (-1024.0, 3071.0);

/// Resolution that backend segmentation polygons are expressed in.
pub const SEGMENTATION_REFERENCE_SIZE: f32 = 512.0;

/// Backend base URL used when nothing is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Image name used in export file names when the image has none.
pub const DEFAULT_IMAGE_NAME: &str = "imagen";
