//! Annotation data model and storage.
//!
//! This module provides the core types for the measurement overlay:
//! - Geometry (points, measurements, angles)
//! - Free-text annotations and read-only landmarks
//! - The ordered per-kind annotation store
//!
//! All geometry is kept in native image pixels. Display scaling happens only
//! when a scene is built for rendering.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::MAX_ANNOTATION_CHARS;

// ============================================================================
// Core Geometry Types
// ============================================================================

/// A 2D point in native image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// The origin, returned by the coordinate mapper before an image is mounted.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Calculate distance to another point.
    pub fn distance_to(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Midpoint between this point and another.
    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Direction from this point towards another, in radians (y grows downwards).
    pub fn direction_to(&self, other: &Point) -> f32 {
        (other.y - self.y).atan2(other.x - self.x)
    }
}

/// A straight-line distance measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub start: Point,
    pub end: Point,
}

impl Measurement {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Euclidean length in native pixels.
    pub fn distance(&self) -> f32 {
        self.start.distance_to(&self.end)
    }
}

/// A three-point angle measured at `vertex`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Angle {
    pub p1: Point,
    pub vertex: Point,
    pub p2: Point,
}

impl Angle {
    pub fn new(p1: Point, vertex: Point, p2: Point) -> Self {
        Self { p1, vertex, p2 }
    }

    /// Absolute angle between vertex->p1 and vertex->p2, in degrees within [0, 180].
    pub fn degrees(&self) -> f32 {
        angle_between(&self.p1, &self.vertex, &self.p2)
    }
}

/// Angle at `vertex` between the rays to `p1` and `p2`, normalized to [0, 180] degrees.
pub fn angle_between(p1: &Point, vertex: &Point, p2: &Point) -> f32 {
    let a1 = vertex.direction_to(p1);
    let a2 = vertex.direction_to(p2);
    let mut diff = (a2 - a1).abs().to_degrees();
    if diff > 180.0 {
        diff = 360.0 - diff;
    }
    diff
}

/// A short free-text note pinned to a point of the image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnnotation {
    pub position: Point,
    pub text: String,
}

impl TextAnnotation {
    /// Create a text annotation.
    ///
    /// The text is trimmed and truncated to [`MAX_ANNOTATION_CHARS`] characters.
    /// Empty text is rejected.
    pub fn new(position: Point, text: &str) -> Result<Self, AnnotationError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(AnnotationError::EmptyText);
        }
        let text: String = trimmed.chars().take(MAX_ANNOTATION_CHARS).collect();
        Ok(Self {
            position,
            text: text.trim_end().to_string(),
        })
    }
}

/// A backend-supplied anatomical reference point. Never edited by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub name: String,
    pub point: Point,
}

impl Landmark {
    pub fn new(name: impl Into<String>, point: Point) -> Self {
        Self {
            name: name.into(),
            point,
        }
    }
}

// ============================================================================
// Annotation Kinds
// ============================================================================

/// The three user-editable annotation collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    Measurement,
    Angle,
    Text,
}

impl AnnotationKind {
    /// Discriminator used in exported tables.
    pub fn label(&self) -> &'static str {
        match self {
            AnnotationKind::Measurement => "Medición",
            AnnotationKind::Angle => "Ángulo",
            AnnotationKind::Text => "Anotación",
        }
    }

    /// Prefix of the per-kind sequential ID (`M1`, `A1`, `T1`).
    pub fn prefix(&self) -> char {
        match self {
            AnnotationKind::Measurement => 'M',
            AnnotationKind::Angle => 'A',
            AnnotationKind::Text => 'T',
        }
    }

    /// One-based display ID for the item at `index`.
    pub fn badge(&self, index: usize) -> String {
        format!("{}{}", self.prefix(), index + 1)
    }

    pub fn all() -> &'static [AnnotationKind] {
        &[
            AnnotationKind::Measurement,
            AnnotationKind::Angle,
            AnnotationKind::Text,
        ]
    }
}

impl std::fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AnnotationKind::Measurement => "measurement",
            AnnotationKind::Angle => "angle",
            AnnotationKind::Text => "text annotation",
        };
        f.write_str(name)
    }
}

/// Errors raised by annotation construction and store operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnnotationError {
    /// Annotation text was empty after trimming
    #[error("Annotation text is empty")]
    EmptyText,

    /// Delete requested for an index past the end of a collection
    #[error("No {kind} at index {index} (have {len})")]
    IndexOutOfRange {
        kind: AnnotationKind,
        index: usize,
        len: usize,
    },
}

// ============================================================================
// Annotation Store
// ============================================================================

/// Ordered storage for the annotations of one image.
///
/// Insertion order is display order. Deleting shifts later indices down, so
/// callers must not hold on to indices across mutations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationStore {
    #[serde(default)]
    measurements: Vec<Measurement>,
    #[serde(default)]
    angles: Vec<Angle>,
    #[serde(default)]
    annotations: Vec<TextAnnotation>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a measurement and return its index.
    pub fn add_measurement(&mut self, measurement: Measurement) -> usize {
        self.measurements.push(measurement);
        self.measurements.len() - 1
    }

    /// Append an angle and return its index.
    pub fn add_angle(&mut self, angle: Angle) -> usize {
        self.angles.push(angle);
        self.angles.len() - 1
    }

    /// Append a text annotation and return its index.
    pub fn add_annotation(&mut self, annotation: TextAnnotation) -> usize {
        self.annotations.push(annotation);
        self.annotations.len() - 1
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn angles(&self) -> &[Angle] {
        &self.angles
    }

    pub fn annotations(&self) -> &[TextAnnotation] {
        &self.annotations
    }

    /// Number of items of one kind.
    pub fn count(&self, kind: AnnotationKind) -> usize {
        match kind {
            AnnotationKind::Measurement => self.measurements.len(),
            AnnotationKind::Angle => self.angles.len(),
            AnnotationKind::Text => self.annotations.len(),
        }
    }

    /// Total number of items across all kinds.
    pub fn len(&self) -> usize {
        self.measurements.len() + self.angles.len() + self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove the item of `kind` at `index`.
    pub fn remove(&mut self, kind: AnnotationKind, index: usize) -> Result<(), AnnotationError> {
        let len = self.count(kind);
        if index >= len {
            return Err(AnnotationError::IndexOutOfRange { kind, index, len });
        }
        match kind {
            AnnotationKind::Measurement => {
                self.measurements.remove(index);
            }
            AnnotationKind::Angle => {
                self.angles.remove(index);
            }
            AnnotationKind::Text => {
                self.annotations.remove(index);
            }
        }
        Ok(())
    }

    /// Remove every annotation of every kind.
    pub fn clear(&mut self) {
        self.measurements.clear();
        self.angles.clear();
        self.annotations.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_measurement_distance() {
        let m = Measurement::new(Point::new(0.0, 0.0), Point::new(3.0, 4.0));
        assert!(approx_eq(m.distance(), 5.0));
    }

    #[test]
    fn test_right_angle() {
        let a = Angle::new(
            Point::new(10.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(0.0, 10.0),
        );
        assert!(approx_eq(a.degrees(), 90.0));
    }

    #[test]
    fn test_angle_is_normalized_across_the_seam() {
        // Rays just above and just below the negative x axis: raw atan2
        // difference is close to 360 degrees, the real angle is small.
        let a = Angle::new(
            Point::new(-10.0, 1.0),
            Point::new(0.0, 0.0),
            Point::new(-10.0, -1.0),
        );
        let deg = a.degrees();
        assert!(deg < 12.0, "expected a small angle, got {}", deg);
        assert!(deg >= 0.0);
    }

    #[test]
    fn test_straight_angle() {
        let a = Angle::new(
            Point::new(-5.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
        );
        assert!(approx_eq(a.degrees(), 180.0));
    }

    #[test]
    fn test_text_annotation_trims_and_caps() {
        let long = "x".repeat(80);
        let ann = TextAnnotation::new(Point::zero(), &format!("  {}  ", long)).unwrap();
        assert_eq!(ann.text.chars().count(), MAX_ANNOTATION_CHARS);

        let ann = TextAnnotation::new(Point::zero(), "  caries  ").unwrap();
        assert_eq!(ann.text, "caries");
    }

    #[test]
    fn test_text_annotation_cap_counts_characters_not_bytes() {
        let text = "ñ".repeat(60);
        let ann = TextAnnotation::new(Point::zero(), &text).unwrap();
        assert_eq!(ann.text.chars().count(), MAX_ANNOTATION_CHARS);
    }

    #[test]
    fn test_empty_text_rejected() {
        assert_eq!(
            TextAnnotation::new(Point::zero(), "   "),
            Err(AnnotationError::EmptyText)
        );
    }

    #[test]
    fn test_store_append_returns_index() {
        let mut store = AnnotationStore::new();
        let m = Measurement::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        assert_eq!(store.add_measurement(m), 0);
        assert_eq!(store.add_measurement(m), 1);
        assert_eq!(store.count(AnnotationKind::Measurement), 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_store_remove_shifts_indices() {
        let mut store = AnnotationStore::new();
        for i in 0..4 {
            store.add_measurement(Measurement::new(
                Point::new(i as f32, 0.0),
                Point::new(i as f32 + 10.0, 0.0),
            ));
        }

        store.remove(AnnotationKind::Measurement, 1).unwrap();

        assert_eq!(store.measurements().len(), 3);
        let starts: Vec<f32> = store.measurements().iter().map(|m| m.start.x).collect();
        assert_eq!(starts, vec![0.0, 2.0, 3.0]);
    }

    #[test]
    fn test_store_remove_out_of_range() {
        let mut store = AnnotationStore::new();
        store.add_angle(Angle::new(Point::zero(), Point::zero(), Point::zero()));

        let err = store.remove(AnnotationKind::Angle, 3).unwrap_err();
        assert_eq!(
            err,
            AnnotationError::IndexOutOfRange {
                kind: AnnotationKind::Angle,
                index: 3,
                len: 1
            }
        );
        assert_eq!(store.angles().len(), 1);
    }

    #[test]
    fn test_store_allows_duplicates() {
        let mut store = AnnotationStore::new();
        let ann = TextAnnotation::new(Point::new(1.0, 1.0), "dup").unwrap();
        store.add_annotation(ann.clone());
        store.add_annotation(ann);
        assert_eq!(store.annotations().len(), 2);
    }

    #[test]
    fn test_store_clear() {
        let mut store = AnnotationStore::new();
        store.add_measurement(Measurement::new(Point::zero(), Point::new(9.0, 9.0)));
        store.add_annotation(TextAnnotation::new(Point::zero(), "a").unwrap());
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_kind_badges() {
        assert_eq!(AnnotationKind::Measurement.badge(0), "M1");
        assert_eq!(AnnotationKind::Angle.badge(2), "A3");
        assert_eq!(AnnotationKind::Text.badge(9), "T10");
    }
}
