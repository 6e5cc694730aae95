//! Typed boundary to the analysis backend.
//!
//! Requests are plain values ([`ApiRequest`]) so the same builders serve the
//! native client and the browser host. Responses are validated into tagged
//! types before they reach the viewer, and [`RequestSequencer`] tickets make
//! sure a late response never overwrites a newer one.

mod client;
mod error;
mod request;
mod sequence;
mod types;

#[cfg(not(target_arch = "wasm32"))]
mod transport;

pub use client::{ApiClient, Endpoints, Transport};
pub use error::ApiError;
pub use request::{ApiRequest, ApiResponse, ImageUpload, Method, MultipartForm};
pub use sequence::{RequestKind, RequestSequencer, RequestTicket};
pub use types::{
    error_message, parse_analysis, parse_evolution, parse_explanation, parse_landmarks, Analysis,
    AnalysisResult, DetectedPoint, Diagnosis, EnsembleMetrics, Evolution, Explanation,
    FacialMetrics, GeometricMeasure, HealthStatus, InfluentialRegion, LandmarkAnalysis,
    Recommendation, Severity, TimelineEntry, Trend, TrendStatus, KEY_LANDMARKS,
};

#[cfg(not(target_arch = "wasm32"))]
pub use transport::UreqTransport;
