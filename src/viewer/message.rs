//! Messages accepted by the viewer and side effects it asks the host for.

use crate::annotation::{AnnotationKind, Point};
use crate::api::{AnalysisResult, ApiError, LandmarkAnalysis, RequestTicket};
use crate::format::ExportFile;
use crate::patient::PatientDid;
use crate::tool::Tool;
use crate::transform::{ElementRect, ScrollOffset, Size, Zoom};
use crate::window_level::WindowLevel;

/// Everything that can happen to a viewer.
///
/// Pointer positions are client coordinates; the viewer maps them.
#[derive(Debug)]
pub enum ViewerMessage {
    // Image lifecycle
    /// A new image URL is being loaded
    LoadImage(String),
    /// The image decoded and is laid out at `rect`
    ImageLoaded { natural: Size, rect: ElementRect },
    /// The overlay element moved or resized (window resize, zoom)
    Resized(ElementRect),

    // Tools
    ToggleTool(Tool),

    // Pointer
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp { x: f32, y: f32 },
    PointerLeave { x: f32, y: f32 },
    /// Escape key
    CancelGesture,

    // Text prompt
    SubmitText(String),
    CancelText,

    // Store
    Delete { kind: AnnotationKind, index: usize },
    ClearAll,

    // Display
    SetWindowWidth(f32),
    SetWindowCenter(f32),
    ZoomIn,
    ZoomOut,
    /// The host scrolled the viewport itself
    Scrolled(ScrollOffset),
    /// Restore display defaults and drop all overlay content
    Reset,

    // Patient
    SelectPatient(PatientDid),
    ClearPatient,

    // Backend
    DetectLandmarks,
    LandmarksReceived {
        ticket: RequestTicket,
        result: Result<LandmarkAnalysis, ApiError>,
    },
    Analyze,
    AnalysisReceived {
        ticket: RequestTicket,
        result: Result<AnalysisResult, ApiError>,
    },

    // Export
    Export(String),
}

/// Work the host must do after an update.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Open the modal text prompt for an annotation at native `point`;
    /// `client` is where the press happened on screen
    OpenTextPrompt { point: Point, client: Point },
    /// Scroll the viewport container
    ScrollTo(ScrollOffset),
    /// Re-apply window/level (client remap or external DICOM renderer)
    ApplyWindowLevel(WindowLevel),
    /// Resize the viewport; a [`ViewerMessage::Resized`] should follow
    ApplyZoom(Zoom),
    /// Send the landmark request for the current image
    FetchLandmarks { ticket: RequestTicket },
    /// Send the analysis request for the current image
    FetchAnalysis {
        ticket: RequestTicket,
        patient: PatientDid,
    },
    /// Hand the file to the user (browser download or disk write)
    Download(ExportFile),
}
