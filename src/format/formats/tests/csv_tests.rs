//! Tests for the CSV measurement table.

use chrono::NaiveDate;

use super::sample_store;
use crate::annotation::{AnnotationStore, Point, TextAnnotation};
use crate::format::formats::{CsvFormat, CSV_HEADER};
use crate::format::session::SessionData;
use crate::format::traits::{AnnotationFormat, ExportOptions};

fn options() -> ExportOptions {
    ExportOptions::new().date(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap())
}

#[test]
fn test_rows_follow_kind_order() {
    let data = SessionData::new(sample_store());
    let csv = CsvFormat::to_csv(&data);
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines.len(), 5, "header plus four rows");
    assert_eq!(lines[0], CSV_HEADER);

    let kinds: Vec<&str> = lines[1..]
        .iter()
        .map(|l| l.split(',').next().unwrap())
        .collect();
    assert_eq!(kinds, vec!["Medición", "Medición", "Ángulo", "Anotación"]);
}

#[test]
fn test_row_contents() {
    let data = SessionData::new(sample_store());
    let csv = CsvFormat::to_csv(&data);
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines[1], "Medición,M1,\"(10.0,20.0) → (110.0,20.0)\",100.0px");
    assert_eq!(lines[2], "Medición,M2,\"(0.0,0.0) → (30.0,40.0)\",50.0px");
    assert_eq!(
        lines[3],
        "Ángulo,A1,\"P1(100.0,50.0) V(50.0,50.0) P2(50.0,0.0)\",90.0°"
    );
    assert_eq!(lines[4], "Anotación,T1,\"\"\"fractura\"\" en (5.0,6.5)\",N/A");
}

#[test]
fn test_empty_store_is_header_only() {
    let data = SessionData::new(AnnotationStore::new());
    assert_eq!(CsvFormat::to_csv(&data), format!("{CSV_HEADER}\n"));
}

#[test]
fn test_quotes_in_text_are_doubled() {
    let mut store = AnnotationStore::new();
    store.add_annotation(TextAnnotation::new(Point::new(1.0, 2.0), "lesión \"A\", 2cm").unwrap());
    let csv = CsvFormat::to_csv(&SessionData::new(store));

    assert!(csv.ends_with("Anotación,T1,\"\"\"lesión \"\"A\"\", 2cm\"\" en (1.0,2.0)\",N/A\n"));
}

#[test]
fn test_filename() {
    let data = SessionData::new(AnnotationStore::new());
    assert_eq!(CsvFormat::filename(&data, &options()), "mediciones_imagen_2024-03-09.csv");

    let data = data.with_image_name("panoramica.png");
    assert_eq!(
        CsvFormat::filename(&data, &options()),
        "mediciones_panoramica.png_2024-03-09.csv"
    );
}

#[test]
fn test_export_file() {
    let data = SessionData::new(sample_store());
    let file = CsvFormat.export(&data, &options()).unwrap();

    assert_eq!(file.items_exported, 4);
    assert_eq!(file.mime_type, "text/csv;charset=utf-8");
    assert!(file.text().unwrap().starts_with(CSV_HEADER));
    assert!(!CsvFormat.supports_import());
    assert!(CsvFormat.import(&file.contents).is_err());
}

#[cfg(not(target_arch = "wasm32"))]
#[test]
fn test_write_to_dir() {
    let dir = tempfile::tempdir().unwrap();
    let data = SessionData::new(sample_store());
    let file = CsvFormat.export(&data, &options()).unwrap();

    let path = file.write_to_dir(dir.path()).unwrap();
    assert_eq!(path.file_name().unwrap(), "mediciones_imagen_2024-03-09.csv");
    assert_eq!(std::fs::read(&path).unwrap(), file.contents);
}
