//! Overlay rendering.
//!
//! [`build_scene`] turns the annotation store, the in-progress gesture and
//! the landmark set into a [`Scene`] of draw commands in display pixels.
//! A [`Canvas`] backend then replays the scene:
//!
//! - [`SvgCanvas`]: standalone SVG document (all targets)
//! - `raster`: SVG rasterized with `resvg` and composited onto an image (native)
//! - `web::WebCanvas`: browser `CanvasRenderingContext2d` (wasm32)

mod canvas;
mod error;
mod scene;
pub mod style;
mod svg;

#[cfg(not(target_arch = "wasm32"))]
pub mod raster;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use canvas::{paint, surface_size, Canvas};
pub use error::RenderError;
pub use scene::{build_scene, Color, DrawCommand, Scene, SceneInput, Stroke, TextAlign};
pub use svg::{to_svg, SvgCanvas};
