//! Native raster backend.
//!
//! Scenes are written as SVG and rasterized with `resvg`, then alpha-blended
//! onto an `image` buffer. Text uses the system fonts.

use image::{Rgba, RgbaImage};
use resvg::{tiny_skia, usvg};

use super::error::RenderError;
use super::scene::Scene;
use super::svg::to_svg;

/// Rasterize a scene into a transparent RGBA image of the scene's size.
pub fn rasterize(scene: &Scene) -> Result<RgbaImage, RenderError> {
    let size = scene.size;
    if !size.is_valid() {
        return Err(RenderError::invalid_size(size.width, size.height));
    }
    let width = size.width.round() as u32;
    let height = size.height.round() as u32;

    let svg = to_svg(scene)?;
    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree = usvg::Tree::from_str(&svg, &options).map_err(|e| RenderError::Svg(e.to_string()))?;

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| RenderError::invalid_size(size.width, size.height))?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    let mut out = RgbaImage::new(width, height);
    for (dst, src) in out.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    log::debug!("🖼️ Rasterized overlay {}x{} ({} commands)", width, height, scene.len());
    Ok(out)
}

/// Draw a scene on top of `base`. The scene must be laid out at the image size.
pub fn composite(base: &mut RgbaImage, scene: &Scene) -> Result<(), RenderError> {
    if scene.is_empty() {
        return Ok(());
    }
    let overlay = rasterize(scene)?;
    if overlay.dimensions() != base.dimensions() {
        return Err(RenderError::SizeMismatch {
            overlay_width: overlay.width(),
            overlay_height: overlay.height(),
            image_width: base.width(),
            image_height: base.height(),
        });
    }
    image::imageops::overlay(base, &overlay, 0, 0);
    Ok(())
}
