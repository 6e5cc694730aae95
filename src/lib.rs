//! clinview - annotation and measurement overlay for clinical image review.
//!
//! The crate maps pointer input on a displayed image into native-pixel
//! measurements, angles and text notes, renders them as a scene of draw
//! commands, exports them (CSV, session JSON), and talks to the analysis
//! backend for landmarks and diagnoses.
//!
//! - [`viewer::ImageViewer`] ties everything together behind `update(message)`
//! - [`render`] turns state into a [`render::Scene`] and paints it
//! - [`format`] exports and imports annotation sessions
//! - [`api`] builds backend requests and validates responses
//! - [`soap`] parses SOAP clinical notes from generated reports

pub mod annotation;
pub mod api;
pub mod config;
pub mod constants;
pub mod format;
pub mod interaction;
pub mod patient;
pub mod render;
pub mod soap;
pub mod tool;
pub mod transform;
pub mod viewer;
pub mod window_level;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;
