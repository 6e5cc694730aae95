//! Tests for the session JSON format.

use super::sample_store;
use crate::annotation::{AnnotationKind, Landmark, Point};
use crate::format::error::FormatError;
use crate::format::formats::SessionJsonFormat;
use crate::format::session::SessionData;
use crate::format::traits::{AnnotationFormat, ExportOptions};
use crate::transform::Size;

#[test]
fn test_export_then_import_preserves_session() {
    let data = SessionData::new(sample_store())
        .with_image_name("ceph.jpg")
        .with_natural_size(Size::new(1600.0, 1200.0))
        .with_landmarks(vec![Landmark::new("menton", Point::new(400.0, 900.0))]);

    let file = SessionJsonFormat.export(&data, &ExportOptions::new()).unwrap();
    assert!(file.filename.starts_with("sesion_ceph.jpg_"));
    assert_eq!(file.items_exported, 4);

    let back = SessionJsonFormat.import(&file.contents).unwrap();
    assert_eq!(back, data);
    assert_eq!(back.annotations.count(AnnotationKind::Measurement), 2);
}

#[test]
fn test_import_minimal_document() {
    let json = br#"{ "version": "1.0.0" }"#;
    let data = SessionJsonFormat.import(json).unwrap();

    assert!(data.annotations.is_empty());
    assert!(data.landmarks.is_empty());
    assert_eq!(data.image_name, None);
}

#[test]
fn test_import_rejects_other_major_version() {
    let json = br#"{ "version": "2.0.0", "annotations": {} }"#;
    let err = SessionJsonFormat.import(json).unwrap_err();

    assert!(matches!(
        err,
        FormatError::VersionMismatch { ref found, .. } if found == "2.0.0"
    ));
}

#[test]
fn test_import_newer_minor_ignores_unknown_fields() {
    let json = br#"{
        "version": "1.3.0",
        "annotations": {
            "measurements": [ { "start": { "x": 1.0, "y": 2.0 }, "end": { "x": 30.0, "y": 2.0 } } ]
        },
        "review_state": "signed"
    }"#;
    let data = SessionJsonFormat.import(json).unwrap();
    assert_eq!(data.annotations.measurements().len(), 1);
}

#[test]
fn test_import_malformed() {
    let err = SessionJsonFormat.import(b"not json").unwrap_err();
    assert!(matches!(err, FormatError::Json(_)));
}
