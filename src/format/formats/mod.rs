//! Export format implementations.

mod csv;
mod session_json;

#[cfg(test)]
mod tests;

pub use csv::{CsvFormat, CSV_HEADER};
pub use session_json::SessionJsonFormat;
