//! Overlay scene construction.
//!
//! A [`Scene`] is an ordered list of draw commands in display pixels. It is
//! rebuilt from scratch on every change; backends only need to replay it.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use super::style::{self, colors};
use crate::annotation::{
    angle_between, AnnotationKind, AnnotationStore, Landmark, Measurement, Point, TextAnnotation,
};
use crate::constants::SEGMENTATION_REFERENCE_SIZE;
use crate::interaction::Preview;
use crate::transform::{scale_polygons, DisplayTransform, Size};

/// An sRGB colour with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// `#rrggbb`, ignoring alpha.
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// CSS colour string: `#rrggbb` when opaque, `rgba(...)` otherwise.
    pub fn css(&self) -> String {
        if self.a >= 1.0 {
            self.hex()
        } else {
            format!("rgba({},{},{},{})", self.r, self.g, self.b, self.a)
        }
    }

    /// Alpha as an 8-bit channel.
    pub fn alpha_u8(&self) -> u8 {
        (self.a.clamp(0.0, 1.0) * 255.0).round() as u8
    }
}

/// Outline style.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
}

impl Stroke {
    pub fn new(color: Color, width: f32) -> Self {
        Self { color, width }
    }
}

/// Horizontal text anchoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
}

/// A single drawing primitive, in display pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    Line {
        from: Point,
        to: Point,
        stroke: Stroke,
    },
    Circle {
        center: Point,
        radius: f32,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    Rect {
        origin: Point,
        width: f32,
        height: f32,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    /// Circular arc from `start_angle` sweeping by `sweep` radians.
    /// Positive sweep is clockwise on screen (y grows downwards).
    Arc {
        center: Point,
        radius: f32,
        start_angle: f32,
        sweep: f32,
        stroke: Stroke,
    },
    /// Closed outline through `points`.
    Polygon {
        points: Vec<Point>,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    /// Text with its baseline at `position.y`.
    Text {
        position: Point,
        text: String,
        color: Color,
        size: f32,
        bold: bool,
        align: TextAlign,
    },
}

/// Ordered draw commands for one overlay frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Display size the commands were laid out for
    pub size: Size,
    pub commands: Vec<DrawCommand>,
}

impl Scene {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    /// A scene with nothing to draw (no image, or no usable layout).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter()
    }

    /// Text of every label in drawing order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn line(&mut self, from: Point, to: Point, color: Color) {
        self.push(DrawCommand::Line {
            from,
            to,
            stroke: Stroke::new(color, style::stroke::LINE_WIDTH),
        });
    }

    fn dot(&mut self, center: Point, radius: f32, color: Color) {
        self.push(DrawCommand::Circle {
            center,
            radius,
            fill: Some(color),
            stroke: None,
        });
    }

    fn filled_rect(&mut self, origin: Point, width: f32, height: f32, color: Color) {
        self.push(DrawCommand::Rect {
            origin,
            width,
            height,
            fill: Some(color),
            stroke: None,
        });
    }

    fn label(&mut self, position: Point, text: String, color: Color, size: f32, align: TextAlign) {
        self.push(DrawCommand::Text {
            position,
            text,
            color,
            size,
            bold: true,
            align,
        });
    }
}

/// Everything the renderer reads to build a frame.
#[derive(Debug, Clone, Copy)]
pub struct SceneInput<'a> {
    /// `None` while no image is mounted
    pub transform: Option<DisplayTransform>,
    pub store: &'a AnnotationStore,
    pub preview: Option<Preview>,
    pub landmarks: &'a [Landmark],
    /// Analysis segmentation, in the backend's reference resolution
    pub segmentation: &'a [Vec<Point>],
}

/// Build the overlay scene.
///
/// Order: segmentation, measurements, angles, text annotations, landmarks.
/// In-progress shapes follow the committed items of their kind. Returns an
/// empty scene when there is no usable display transform.
pub fn build_scene(input: &SceneInput<'_>) -> Scene {
    let Some(t) = input.transform.filter(DisplayTransform::is_valid) else {
        return Scene::empty();
    };
    let mut scene = Scene::new(t.displayed);

    draw_segmentation(&mut scene, &t, input.segmentation);

    for (i, m) in input.store.measurements().iter().enumerate() {
        draw_measurement(&mut scene, &t, m, Some(i));
    }
    if let Some(Preview::Measurement(m)) = &input.preview {
        draw_measurement(&mut scene, &t, m, None);
    }

    for (i, a) in input.store.angles().iter().enumerate() {
        draw_angle(&mut scene, &t, a.p1, Some(a.vertex), Some(a.p2), Some(i));
    }
    if let Some(Preview::Angle { p1, vertex }) = input.preview {
        draw_angle(&mut scene, &t, p1, vertex, None, None);
    }

    for (i, a) in input.store.annotations().iter().enumerate() {
        draw_annotation(&mut scene, &t, a, i);
    }

    for landmark in input.landmarks {
        draw_landmark(&mut scene, &t, landmark);
    }

    scene
}

fn draw_measurement(scene: &mut Scene, t: &DisplayTransform, m: &Measurement, index: Option<usize>) {
    use style::measurement::*;

    let color = if index.is_some() {
        colors::MEASUREMENT
    } else {
        colors::MEASUREMENT_ACTIVE
    };
    let start = t.to_display(&m.start);
    let end = t.to_display(&m.end);

    scene.line(start, end, color);
    for p in [start, end] {
        scene.dot(p, style::stroke::MARKER_RADIUS, color);
    }

    // Distance is reported in native pixels regardless of display scale
    let mid = start.midpoint(&end);
    let text_pos = Point::new(mid.x, mid.y - LABEL_RAISE);
    scene.filled_rect(
        Point::new(text_pos.x - LABEL_WIDTH / 2.0, text_pos.y - 15.0),
        LABEL_WIDTH,
        LABEL_HEIGHT,
        colors::LABEL_BACKGROUND,
    );
    scene.label(
        text_pos,
        format!("{:.1}px", m.distance()),
        color,
        style::font::LABEL,
        TextAlign::Center,
    );

    if let Some(i) = index {
        scene.filled_rect(
            Point::new(start.x - BADGE_WIDTH / 2.0, start.y + BADGE_OFFSET_Y),
            BADGE_WIDTH,
            BADGE_HEIGHT,
            colors::LABEL_BACKGROUND,
        );
        scene.label(
            Point::new(start.x, start.y + BADGE_BASELINE_Y),
            AnnotationKind::Measurement.badge(i),
            colors::MEASUREMENT,
            style::font::LABEL,
            TextAlign::Center,
        );
    }
}

/// Signed sweep from `from` to `to`, in (-PI, PI].
fn shortest_sweep(from: f32, to: f32) -> f32 {
    let mut d = (to - from) % (2.0 * PI);
    if d > PI {
        d -= 2.0 * PI;
    } else if d <= -PI {
        d += 2.0 * PI;
    }
    d
}

fn draw_angle(
    scene: &mut Scene,
    t: &DisplayTransform,
    p1: Point,
    vertex: Option<Point>,
    p2: Option<Point>,
    index: Option<usize>,
) {
    use style::angle::*;

    let color = if index.is_some() {
        colors::ANGLE
    } else {
        colors::ANGLE_ACTIVE
    };
    let d1 = t.to_display(&p1);
    let dv = vertex.map(|v| t.to_display(&v));
    let d2 = p2.map(|p| t.to_display(&p));

    if let Some(dv) = dv {
        scene.line(dv, d1, color);

        if let (Some(d2), Some(v), Some(p2)) = (d2, vertex, p2) {
            scene.line(dv, d2, color);

            // Arc over the interior angle, drawn in display space so it stays
            // circular under anisotropic scaling
            let a1 = dv.direction_to(&d1);
            let sweep = shortest_sweep(a1, dv.direction_to(&d2));
            scene.push(DrawCommand::Arc {
                center: dv,
                radius: ARC_RADIUS,
                start_angle: a1,
                sweep,
                stroke: Stroke::new(color, style::stroke::LINE_WIDTH),
            });

            let mid_angle = a1 + sweep / 2.0;
            let r = ARC_RADIUS + LABEL_DISTANCE;
            let text_pos = Point::new(dv.x + mid_angle.cos() * r, dv.y + mid_angle.sin() * r);
            scene.filled_rect(
                Point::new(text_pos.x - LABEL_WIDTH / 2.0, text_pos.y - 15.0),
                LABEL_WIDTH,
                LABEL_HEIGHT,
                colors::LABEL_BACKGROUND,
            );
            scene.label(
                text_pos,
                format!("{:.1}°", angle_between(&p1, &v, &p2)),
                color,
                style::font::LABEL,
                TextAlign::Center,
            );
        }
    }

    for p in [Some(d1), dv, d2].into_iter().flatten() {
        scene.dot(p, style::stroke::MARKER_RADIUS, color);
    }

    if let (Some(i), Some(dv)) = (index, dv) {
        scene.filled_rect(
            Point::new(dv.x - BADGE_WIDTH / 2.0, dv.y + BADGE_OFFSET_Y),
            BADGE_WIDTH,
            BADGE_HEIGHT,
            colors::LABEL_BACKGROUND,
        );
        scene.label(
            Point::new(dv.x, dv.y + BADGE_BASELINE_Y),
            AnnotationKind::Angle.badge(i),
            color,
            style::font::LABEL,
            TextAlign::Center,
        );
    }
}

fn draw_annotation(scene: &mut Scene, t: &DisplayTransform, a: &TextAnnotation, index: usize) {
    use style::annotation::*;

    let pos = t.to_display(&a.position);
    let width = style::text_width(&a.text, style::font::ANNOTATION) + 2.0 * PADDING_X;
    scene.push(DrawCommand::Rect {
        origin: Point::new(pos.x - PADDING_X, pos.y + OFFSET_Y),
        width,
        height: HEIGHT,
        fill: Some(colors::ANNOTATION_BACKGROUND),
        stroke: Some(Stroke::new(colors::ANNOTATION, style::stroke::LINE_WIDTH)),
    });
    scene.label(
        pos,
        a.text.clone(),
        colors::ANNOTATION,
        style::font::ANNOTATION,
        TextAlign::Left,
    );
    scene.dot(
        Point::new(pos.x, pos.y + ANCHOR_OFFSET_Y),
        style::stroke::ANCHOR_RADIUS,
        colors::ANNOTATION,
    );
    scene.filled_rect(
        Point::new(pos.x - PADDING_X, pos.y + BADGE_OFFSET_Y),
        BADGE_WIDTH,
        BADGE_HEIGHT,
        colors::LABEL_BACKGROUND,
    );
    scene.label(
        Point::new(pos.x - PADDING_X + BADGE_WIDTH / 2.0, pos.y + BADGE_BASELINE_Y),
        AnnotationKind::Text.badge(index),
        colors::ANNOTATION,
        style::font::ANNOTATION_BADGE,
        TextAlign::Center,
    );
}

fn draw_segmentation(scene: &mut Scene, t: &DisplayTransform, polygons: &[Vec<Point>]) {
    let reference = Size::new(SEGMENTATION_REFERENCE_SIZE, SEGMENTATION_REFERENCE_SIZE);
    for points in scale_polygons(polygons, reference, t.displayed) {
        if points.len() < 3 {
            continue;
        }
        scene.push(DrawCommand::Polygon {
            points,
            fill: Some(colors::SEGMENTATION_FILL),
            stroke: Some(Stroke::new(colors::SEGMENTATION, style::stroke::LINE_WIDTH)),
        });
    }
}

fn draw_landmark(scene: &mut Scene, t: &DisplayTransform, landmark: &Landmark) {
    use style::landmark::*;

    let p = t.to_display(&landmark.point);
    scene.push(DrawCommand::Circle {
        center: p,
        radius: style::stroke::LANDMARK_RADIUS,
        fill: Some(colors::LANDMARK),
        stroke: Some(Stroke::new(colors::LANDMARK_RING, style::stroke::LANDMARK_RING_WIDTH)),
    });

    let text_width = style::text_width(&landmark.name, style::font::LANDMARK);
    scene.filled_rect(
        Point::new(p.x + LABEL_OFFSET_X, p.y + LABEL_OFFSET_Y),
        text_width + LABEL_PADDING,
        LABEL_HEIGHT,
        colors::LANDMARK_BACKGROUND,
    );
    scene.label(
        Point::new(p.x + TEXT_OFFSET_X, p.y + TEXT_OFFSET_Y),
        landmark.name.clone(),
        colors::LANDMARK,
        style::font::LANDMARK,
        TextAlign::Left,
    );
}
