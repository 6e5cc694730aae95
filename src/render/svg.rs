//! SVG backend.
//!
//! Produces a standalone SVG document. Used for file export and, on native
//! targets, as the input to the raster compositor.

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use super::canvas::{paint, Canvas};
use super::error::RenderError;
use super::scene::{Color, DrawCommand, Scene, Stroke, TextAlign};
use crate::transform::Size;

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const FONT_FAMILY: &str = "Arial, Helvetica, sans-serif";

type Attrs = Vec<(&'static str, String)>;

/// Writes scene commands as SVG elements.
pub struct SvgCanvas {
    writer: Writer<Vec<u8>>,
    open: bool,
}

impl Default for SvgCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl SvgCanvas {
    pub fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
            open: false,
        }
    }

    /// Close the document and return it.
    pub fn finish(mut self) -> Result<String, RenderError> {
        if !self.open {
            self.begin(Size::default())?;
        }
        self.write(Event::End(BytesEnd::new("svg")))?;
        let bytes = self.writer.into_inner();
        String::from_utf8(bytes).map_err(|e| RenderError::Svg(e.to_string()))
    }

    fn write(&mut self, event: Event<'_>) -> Result<(), RenderError> {
        self.writer
            .write_event(event)
            .map_err(|e| RenderError::Xml(e.into()))
    }

    fn element(&mut self, name: &str, attrs: Attrs) -> Result<(), RenderError> {
        self.write(Event::Empty(start_tag(name, &attrs)))
    }

    fn text_element(&mut self, name: &str, attrs: Attrs, text: &str) -> Result<(), RenderError> {
        self.write(Event::Start(start_tag(name, &attrs)))?;
        self.write(Event::Text(BytesText::new(text)))?;
        self.write(Event::End(BytesEnd::new(name)))
    }
}

/// Render a scene to an SVG document.
pub fn to_svg(scene: &Scene) -> Result<String, RenderError> {
    let mut canvas = SvgCanvas::new();
    paint(scene, &mut canvas)?;
    canvas.finish()
}

impl Canvas for SvgCanvas {
    fn begin(&mut self, size: Size) -> Result<(), RenderError> {
        self.writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        let (w, h) = (fmt_num(size.width), fmt_num(size.height));
        let view_box = format!("0 0 {w} {h}");
        self.write(Event::Start(start_tag(
            "svg",
            &vec![
                ("xmlns", SVG_NS.to_string()),
                ("width", w),
                ("height", h),
                ("viewBox", view_box),
            ],
        )))?;
        self.open = true;
        Ok(())
    }

    fn draw(&mut self, command: &DrawCommand) -> Result<(), RenderError> {
        match command {
            DrawCommand::Line { from, to, stroke } => {
                let mut attrs = vec![
                    ("x1", fmt_num(from.x)),
                    ("y1", fmt_num(from.y)),
                    ("x2", fmt_num(to.x)),
                    ("y2", fmt_num(to.y)),
                ];
                push_stroke(&mut attrs, stroke);
                self.element("line", attrs)
            }
            DrawCommand::Circle {
                center,
                radius,
                fill,
                stroke,
            } => {
                let mut attrs = vec![
                    ("cx", fmt_num(center.x)),
                    ("cy", fmt_num(center.y)),
                    ("r", fmt_num(*radius)),
                ];
                push_fill(&mut attrs, fill.as_ref());
                if let Some(stroke) = stroke {
                    push_stroke(&mut attrs, stroke);
                }
                self.element("circle", attrs)
            }
            DrawCommand::Rect {
                origin,
                width,
                height,
                fill,
                stroke,
            } => {
                let mut attrs = vec![
                    ("x", fmt_num(origin.x)),
                    ("y", fmt_num(origin.y)),
                    ("width", fmt_num(*width)),
                    ("height", fmt_num(*height)),
                ];
                push_fill(&mut attrs, fill.as_ref());
                if let Some(stroke) = stroke {
                    push_stroke(&mut attrs, stroke);
                }
                self.element("rect", attrs)
            }
            DrawCommand::Arc {
                center,
                radius,
                start_angle,
                sweep,
                stroke,
            } => {
                let end_angle = start_angle + sweep;
                let (sx, sy) = (
                    center.x + radius * start_angle.cos(),
                    center.y + radius * start_angle.sin(),
                );
                let (ex, ey) = (
                    center.x + radius * end_angle.cos(),
                    center.y + radius * end_angle.sin(),
                );
                let large_arc = u8::from(sweep.abs() > std::f32::consts::PI);
                let clockwise = u8::from(*sweep > 0.0);
                let r = fmt_num(*radius);
                let d = format!(
                    "M {} {} A {r} {r} 0 {large_arc} {clockwise} {} {}",
                    fmt_num(sx),
                    fmt_num(sy),
                    fmt_num(ex),
                    fmt_num(ey),
                );
                let mut attrs = vec![("d", d), ("fill", "none".to_string())];
                push_stroke(&mut attrs, stroke);
                self.element("path", attrs)
            }
            DrawCommand::Polygon {
                points,
                fill,
                stroke,
            } => {
                let points = points
                    .iter()
                    .map(|p| format!("{},{}", fmt_num(p.x), fmt_num(p.y)))
                    .collect::<Vec<_>>()
                    .join(" ");
                let mut attrs = vec![("points", points)];
                push_fill(&mut attrs, fill.as_ref());
                if let Some(stroke) = stroke {
                    push_stroke(&mut attrs, stroke);
                }
                self.element("polygon", attrs)
            }
            DrawCommand::Text {
                position,
                text,
                color,
                size,
                bold,
                align,
            } => {
                let anchor = match align {
                    TextAlign::Left => "start",
                    TextAlign::Center => "middle",
                };
                let mut attrs = vec![
                    ("x", fmt_num(position.x)),
                    ("y", fmt_num(position.y)),
                    ("font-family", FONT_FAMILY.to_string()),
                    ("font-size", fmt_num(*size)),
                ];
                if *bold {
                    attrs.push(("font-weight", "bold".to_string()));
                }
                attrs.push(("text-anchor", anchor.to_string()));
                push_fill(&mut attrs, Some(color));
                self.text_element("text", attrs, text)
            }
        }
    }
}

fn start_tag<'a>(name: &'a str, attrs: &'a Attrs) -> BytesStart<'a> {
    let mut tag = BytesStart::new(name);
    for (key, value) in attrs {
        tag.push_attribute((*key, value.as_str()));
    }
    tag
}

/// Format a coordinate with at most two decimals and no trailing zeros.
fn fmt_num(v: f32) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

fn push_fill(attrs: &mut Attrs, fill: Option<&Color>) {
    match fill {
        None => attrs.push(("fill", "none".to_string())),
        Some(c) => {
            attrs.push(("fill", c.hex()));
            if c.a < 1.0 {
                attrs.push(("fill-opacity", c.a.to_string()));
            }
        }
    }
}

fn push_stroke(attrs: &mut Attrs, stroke: &Stroke) {
    attrs.push(("stroke", stroke.color.hex()));
    attrs.push(("stroke-width", fmt_num(stroke.width)));
    if stroke.color.a < 1.0 {
        attrs.push(("stroke-opacity", stroke.color.a.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Point;
    use crate::render::style::colors;

    fn scene_with(commands: Vec<DrawCommand>) -> Scene {
        Scene {
            size: Size::new(200.0, 100.0),
            commands,
        }
    }

    #[test]
    fn test_document_header() {
        let svg = to_svg(&scene_with(Vec::new())).unwrap();
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"200\" height=\"100\""));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_line_and_translucent_rect() {
        let svg = to_svg(&scene_with(vec![
            DrawCommand::Line {
                from: Point::new(0.0, 0.0),
                to: Point::new(10.5, 20.25),
                stroke: Stroke::new(colors::MEASUREMENT, 2.0),
            },
            DrawCommand::Rect {
                origin: Point::new(1.0, 2.0),
                width: 30.0,
                height: 18.0,
                fill: Some(colors::LANDMARK_BACKGROUND),
                stroke: None,
            },
        ]))
        .unwrap();

        assert!(svg.contains(
            "<line x1=\"0\" y1=\"0\" x2=\"10.5\" y2=\"20.25\" stroke=\"#00d4ff\" stroke-width=\"2\"/>"
        ));
        assert!(svg.contains("fill=\"#000000\" fill-opacity=\"0.6\""));
    }

    #[test]
    fn test_text_is_escaped() {
        let svg = to_svg(&scene_with(vec![DrawCommand::Text {
            position: Point::new(5.0, 5.0),
            text: "a<b & \"c\"".to_string(),
            color: colors::ANNOTATION,
            size: 14.0,
            bold: true,
            align: TextAlign::Left,
        }]))
        .unwrap();

        assert!(svg.contains(">a&lt;b &amp; &quot;c&quot;</text>"));
        assert!(svg.contains("text-anchor=\"start\""));
    }

    #[test]
    fn test_arc_flags() {
        let svg = to_svg(&scene_with(vec![DrawCommand::Arc {
            center: Point::new(50.0, 50.0),
            radius: 30.0,
            start_angle: 0.0,
            sweep: std::f32::consts::FRAC_PI_2,
            stroke: Stroke::new(colors::ANGLE, 2.0),
        }]))
        .unwrap();

        // Quarter turn clockwise on screen: (80,50) -> (50,80)
        assert!(svg.contains("M 80 50 A 30 30 0 0 1 50 80"));
    }

    #[test]
    fn test_polygon_points() {
        let svg = to_svg(&scene_with(vec![DrawCommand::Polygon {
            points: vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 7.5)],
            fill: Some(colors::SEGMENTATION_FILL),
            stroke: Some(Stroke::new(colors::SEGMENTATION, 2.0)),
        }]))
        .unwrap();

        assert!(svg.contains("<polygon points=\"0,0 10,0 10,7.5\" fill=\"#ff4d4d\" fill-opacity=\"0.25\""));
    }

    #[test]
    fn test_finish_without_scene_is_valid_document() {
        let svg = SvgCanvas::new().finish().unwrap();
        assert!(svg.starts_with("<svg "));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(3.0), "3");
        assert_eq!(fmt_num(-0.001), "0");
        assert_eq!(fmt_num(1.257), "1.26");
    }
}
