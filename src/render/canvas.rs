//! Drawing backend abstraction.

use super::error::RenderError;
use super::scene::{DrawCommand, Scene};
use crate::transform::Size;

/// A surface that can replay scene draw commands.
///
/// Implemented by the SVG writer (all targets), the raster compositor
/// (native) and the browser 2D context (wasm32).
pub trait Canvas {
    /// Resize and clear the surface before a full redraw.
    fn begin(&mut self, size: Size) -> Result<(), RenderError>;

    /// Draw one primitive.
    fn draw(&mut self, command: &DrawCommand) -> Result<(), RenderError>;
}

/// Clear `canvas` and replay every command of `scene` in order.
pub fn paint<C: Canvas + ?Sized>(scene: &Scene, canvas: &mut C) -> Result<(), RenderError> {
    canvas.begin(scene.size)?;
    for command in scene.iter() {
        canvas.draw(command)?;
    }
    log::trace!("Painted {} overlay commands", scene.len());
    Ok(())
}

/// Backing-store size for a surface laid out at `element` size.
///
/// The element's own layout wins; the scene size is only used while the
/// element has no usable size yet, so an empty scene never collapses it.
pub fn surface_size(element: Size, scene: Size) -> Size {
    if element.is_valid() {
        element
    } else {
        scene
    }
}
