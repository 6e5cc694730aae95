//! Browser backend drawing onto a `CanvasRenderingContext2d`.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::canvas::{surface_size, Canvas};
use super::error::RenderError;
use super::scene::{DrawCommand, Stroke, TextAlign};
use crate::transform::Size;

const FONT_FAMILY: &str = "Arial";

fn js_err(e: JsValue) -> RenderError {
    RenderError::Canvas(e.as_string().unwrap_or_else(|| format!("{:?}", e)))
}

/// Overlay canvas element plus its 2D context.
pub struct WebCanvas {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl WebCanvas {
    /// Wrap an overlay `<canvas>` element.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, RenderError> {
        let ctx = canvas
            .get_context("2d")
            .map_err(js_err)?
            .ok_or_else(|| RenderError::Canvas("2d context unavailable".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| RenderError::Canvas("unexpected context type".to_string()))?;
        Ok(Self { canvas, ctx })
    }

    fn apply_stroke(&self, stroke: &Stroke) {
        self.ctx.set_stroke_style_str(&stroke.color.css());
        self.ctx.set_line_width(f64::from(stroke.width));
    }
}

impl Canvas for WebCanvas {
    fn begin(&mut self, size: Size) -> Result<(), RenderError> {
        let element = Size::new(
            self.canvas.client_width() as f32,
            self.canvas.client_height() as f32,
        );
        let size = surface_size(element, size);
        // Resizing the backing store also clears it
        self.canvas.set_width(size.width.max(0.0).round() as u32);
        self.canvas.set_height(size.height.max(0.0).round() as u32);
        self.ctx
            .clear_rect(0.0, 0.0, f64::from(size.width), f64::from(size.height));
        Ok(())
    }

    fn draw(&mut self, command: &DrawCommand) -> Result<(), RenderError> {
        let ctx = &self.ctx;
        match command {
            DrawCommand::Line { from, to, stroke } => {
                self.apply_stroke(stroke);
                ctx.begin_path();
                ctx.move_to(f64::from(from.x), f64::from(from.y));
                ctx.line_to(f64::from(to.x), f64::from(to.y));
                ctx.stroke();
            }
            DrawCommand::Circle {
                center,
                radius,
                fill,
                stroke,
            } => {
                ctx.begin_path();
                ctx.arc(
                    f64::from(center.x),
                    f64::from(center.y),
                    f64::from(*radius),
                    0.0,
                    std::f64::consts::TAU,
                )
                .map_err(js_err)?;
                if let Some(fill) = fill {
                    ctx.set_fill_style_str(&fill.css());
                    ctx.fill();
                }
                if let Some(stroke) = stroke {
                    self.apply_stroke(stroke);
                    ctx.stroke();
                }
            }
            DrawCommand::Rect {
                origin,
                width,
                height,
                fill,
                stroke,
            } => {
                let (x, y, w, h) = (
                    f64::from(origin.x),
                    f64::from(origin.y),
                    f64::from(*width),
                    f64::from(*height),
                );
                if let Some(fill) = fill {
                    ctx.set_fill_style_str(&fill.css());
                    ctx.fill_rect(x, y, w, h);
                }
                if let Some(stroke) = stroke {
                    self.apply_stroke(stroke);
                    ctx.stroke_rect(x, y, w, h);
                }
            }
            DrawCommand::Arc {
                center,
                radius,
                start_angle,
                sweep,
                stroke,
            } => {
                self.apply_stroke(stroke);
                ctx.begin_path();
                ctx.arc_with_anticlockwise(
                    f64::from(center.x),
                    f64::from(center.y),
                    f64::from(*radius),
                    f64::from(*start_angle),
                    f64::from(start_angle + sweep),
                    *sweep < 0.0,
                )
                .map_err(js_err)?;
                ctx.stroke();
            }
            DrawCommand::Polygon {
                points,
                fill,
                stroke,
            } => {
                let Some((first, rest)) = points.split_first() else {
                    return Ok(());
                };
                ctx.begin_path();
                ctx.move_to(f64::from(first.x), f64::from(first.y));
                for p in rest {
                    ctx.line_to(f64::from(p.x), f64::from(p.y));
                }
                ctx.close_path();
                if let Some(fill) = fill {
                    ctx.set_fill_style_str(&fill.css());
                    ctx.fill();
                }
                if let Some(stroke) = stroke {
                    self.apply_stroke(stroke);
                    ctx.stroke();
                }
            }
            DrawCommand::Text {
                position,
                text,
                color,
                size,
                bold,
                align,
            } => {
                let weight = if *bold { "bold " } else { "" };
                ctx.set_font(&format!("{weight}{size}px {FONT_FAMILY}"));
                ctx.set_text_align(match align {
                    TextAlign::Left => "left",
                    TextAlign::Center => "center",
                });
                ctx.set_fill_style_str(&color.css());
                ctx.fill_text(text, f64::from(position.x), f64::from(position.y))
                    .map_err(js_err)?;
            }
        }
        Ok(())
    }
}
