//! Unit tests for export format implementations.

mod csv_tests;
mod session_json_tests;

use crate::annotation::{Angle, AnnotationStore, Measurement, Point, TextAnnotation};

/// Two measurements, one angle and one text annotation.
pub(super) fn sample_store() -> AnnotationStore {
    let mut store = AnnotationStore::new();
    store.add_measurement(Measurement::new(Point::new(10.0, 20.0), Point::new(110.0, 20.0)));
    store.add_angle(Angle::new(
        Point::new(100.0, 50.0),
        Point::new(50.0, 50.0),
        Point::new(50.0, 0.0),
    ));
    store.add_measurement(Measurement::new(Point::new(0.0, 0.0), Point::new(30.0, 40.0)));
    store.add_annotation(
        TextAnnotation::new(Point::new(5.0, 6.5), "fractura").expect("valid text"),
    );
    store
}
