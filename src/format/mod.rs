//! Annotation export/import system.
//!
//! Formats implement [`AnnotationFormat`] and are looked up by id in the
//! [`FormatRegistry`]. Every format works on a [`SessionData`] snapshot and
//! returns an in-memory [`ExportFile`].
//!
//! ## Supported Formats
//!
//! - **CSV** (`csv`): measurement table, one row per measurement, angle and
//!   text annotation
//! - **Session JSON** (`session`): versioned full snapshot including
//!   landmarks; can be imported again
//!
//! ## Usage
//!
//! ```rust,ignore
//! use clinview::format::{ExportOptions, FormatRegistry, SessionData};
//!
//! let registry = FormatRegistry::new();
//! let file = registry.require("csv")?.export(&session, &ExportOptions::new())?;
//! ```

mod error;
pub mod formats;
mod registry;
mod session;
mod traits;

pub use error::FormatError;
pub use formats::{CsvFormat, SessionJsonFormat};
pub use registry::FormatRegistry;
pub use session::SessionData;
pub use traits::{AnnotationFormat, ExportFile, ExportOptions};
