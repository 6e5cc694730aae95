//! Measurement table export (CSV).
//!
//! One row per item with the columns `Tipo,ID,Datos,Valor`:
//!
//! ```text
//! Tipo,ID,Datos,Valor
//! Medición,M1,"(10.0,20.0) → (110.0,20.0)",100.0px
//! Ángulo,A1,"P1(..) V(..) P2(..)",90.0°
//! Anotación,T1,"""fractura"" en (5.0,5.0)",N/A
//! ```
//!
//! The descriptive `Datos` column is always quoted (RFC 4180, inner quotes
//! doubled). Coordinates are native image pixels with one decimal.

use crate::annotation::{AnnotationKind, Point};
use crate::format::error::FormatError;
use crate::format::session::SessionData;
use crate::format::traits::{AnnotationFormat, ExportFile, ExportOptions};

/// Header row of the measurement table.
pub const CSV_HEADER: &str = "Tipo,ID,Datos,Valor";

/// Spreadsheet-friendly measurement table.
pub struct CsvFormat;

impl CsvFormat {
    /// `mediciones_{image}_{YYYY-MM-DD}.csv`
    pub fn filename(data: &SessionData, options: &ExportOptions) -> String {
        format!(
            "mediciones_{}_{}.csv",
            data.display_name(),
            options.date.format("%Y-%m-%d")
        )
    }

    /// Build the table text, header included.
    pub fn to_csv(data: &SessionData) -> String {
        let store = &data.annotations;
        let mut out = String::new();
        out.push_str(CSV_HEADER);
        out.push('\n');

        for (i, m) in store.measurements().iter().enumerate() {
            let datos = format!("{} → {}", coord(&m.start), coord(&m.end));
            push_row(
                &mut out,
                AnnotationKind::Measurement,
                i,
                &datos,
                &format!("{:.1}px", m.distance()),
            );
        }

        for (i, a) in store.angles().iter().enumerate() {
            let datos = format!("P1{} V{} P2{}", coord(&a.p1), coord(&a.vertex), coord(&a.p2));
            push_row(
                &mut out,
                AnnotationKind::Angle,
                i,
                &datos,
                &format!("{:.1}°", a.degrees()),
            );
        }

        for (i, t) in store.annotations().iter().enumerate() {
            let datos = format!("\"{}\" en {}", t.text, coord(&t.position));
            push_row(&mut out, AnnotationKind::Text, i, &datos, "N/A");
        }

        out
    }
}

fn coord(p: &Point) -> String {
    format!("({:.1},{:.1})", p.x, p.y)
}

/// Quote a field, doubling any inner quotes.
fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn push_row(out: &mut String, kind: AnnotationKind, index: usize, datos: &str, valor: &str) {
    out.push_str(&format!(
        "{},{},{},{}\n",
        kind.label(),
        kind.badge(index),
        quote(datos),
        valor
    ));
}

impl AnnotationFormat for CsvFormat {
    fn id(&self) -> &'static str {
        "csv"
    }

    fn display_name(&self) -> &'static str {
        "Measurement table (CSV)"
    }

    fn extension(&self) -> &'static str {
        "csv"
    }

    fn mime_type(&self) -> &'static str {
        "text/csv;charset=utf-8"
    }

    fn export(&self, data: &SessionData, options: &ExportOptions) -> Result<ExportFile, FormatError> {
        let text = Self::to_csv(data);
        let items = data.annotations.len();
        log::info!("📄 Exported {} rows to CSV", items);

        Ok(ExportFile {
            filename: Self::filename(data, options),
            mime_type: self.mime_type(),
            contents: text.into_bytes(),
            items_exported: items,
        })
    }
}
