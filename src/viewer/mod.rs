//! The image viewer: overlay state plus display controls.
//!
//! [`ImageViewer`] owns everything the overlay needs and is driven by
//! [`ViewerMessage`]s in Elm style. `update` mutates state synchronously and
//! returns at most one [`Effect`] for the host (open a prompt, scroll, send a
//! request, download a file). Network calls happen outside; their results come
//! back as messages carrying the [`RequestTicket`] they were issued with.

mod message;
mod source;

#[cfg(test)]
mod tests;

pub use message::{Effect, ViewerMessage};
pub use source::{ImageKind, ImageSource};

use crate::annotation::{AnnotationStore, Landmark, Point};
use crate::api::{
    AnalysisResult, ApiError, FacialMetrics, LandmarkAnalysis, RequestKind, RequestSequencer,
    RequestTicket,
};
use crate::config::ViewerDefaults;
use crate::format::{ExportFile, ExportOptions, FormatError, FormatRegistry, SessionData};
use crate::interaction::{Interaction, Outcome};
use crate::patient::PatientContext;
use crate::render::{build_scene, Scene, SceneInput};
use crate::tool::{Cursor, SpatialTool, ToggleResult, ToolState};
use crate::transform::{CoordinateMapper, ScrollOffset, Zoom};
use crate::window_level::WindowLevel;

/// State of one image viewer.
pub struct ImageViewer {
    defaults: ViewerDefaults,
    source: Option<ImageSource>,
    mapper: CoordinateMapper,
    tools: ToolState,
    interaction: Interaction,
    store: AnnotationStore,
    landmarks: Vec<Landmark>,
    facial_metrics: Option<FacialMetrics>,
    window_level: WindowLevel,
    zoom: Zoom,
    scroll: ScrollOffset,
    patient: PatientContext,
    analysis: Option<AnalysisResult>,
    sequencer: RequestSequencer,
    registry: FormatRegistry,
    status: Option<String>,
    dirty: bool,
}

impl ImageViewer {
    pub fn new(defaults: ViewerDefaults) -> Self {
        Self {
            window_level: defaults.window_level(),
            zoom: defaults.zoom(),
            defaults,
            source: None,
            mapper: CoordinateMapper::new(),
            tools: ToolState::new(),
            interaction: Interaction::new(),
            store: AnnotationStore::new(),
            landmarks: Vec::new(),
            facial_metrics: None,
            scroll: ScrollOffset::default(),
            patient: PatientContext::anonymous(),
            analysis: None,
            sequencer: RequestSequencer::new(),
            registry: FormatRegistry::new(),
            status: None,
            dirty: true,
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn source(&self) -> Option<&ImageSource> {
        self.source.as_ref()
    }

    pub fn is_dicom(&self) -> bool {
        self.source.as_ref().is_some_and(ImageSource::is_dicom)
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn facial_metrics(&self) -> Option<&FacialMetrics> {
        self.facial_metrics.as_ref()
    }

    pub fn tools(&self) -> &ToolState {
        &self.tools
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn window_level(&self) -> WindowLevel {
        self.window_level
    }

    pub fn zoom(&self) -> Zoom {
        self.zoom
    }

    pub fn scroll(&self) -> ScrollOffset {
        self.scroll
    }

    pub fn patient(&self) -> &PatientContext {
        &self.patient
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    /// Last user-facing status or error message.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// A landmark request is outstanding.
    pub fn is_busy(&self) -> bool {
        self.sequencer.is_pending(RequestKind::Landmarks)
    }

    pub fn cursor(&self) -> Cursor {
        self.tools.cursor(self.interaction.is_dragging())
    }

    /// Whether the overlay must be redrawn; clears the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    // ------------------------------------------------------------------------
    // Rendering and export
    // ------------------------------------------------------------------------

    /// Build the overlay scene for the current layout.
    pub fn scene(&self) -> Scene {
        if self.source.is_none() {
            return Scene::empty();
        }
        build_scene(&SceneInput {
            transform: self.mapper.transform(),
            store: &self.store,
            preview: self.interaction.preview(),
            landmarks: &self.landmarks,
            segmentation: self
                .analysis
                .as_ref()
                .map(|a| a.analysis().segmentation.as_slice())
                .unwrap_or_default(),
        })
    }

    /// Snapshot for the export formats.
    pub fn session(&self) -> SessionData {
        let mut data = SessionData::new(self.store.clone()).with_landmarks(self.landmarks.clone());
        if let Some(source) = &self.source {
            data = data.with_image_name(source.name());
        }
        if let Some(natural) = self.mapper.natural() {
            data = data.with_natural_size(natural);
        }
        data
    }

    pub fn export(&self, format_id: &str, options: &ExportOptions) -> Result<ExportFile, FormatError> {
        let file = self
            .registry
            .require(format_id)?
            .export(&self.session(), options)?;
        log::info!("📄 Exported {} ({} items)", file.filename, file.items_exported);
        Ok(file)
    }

    /// Replace annotations and landmarks with a previously saved session.
    pub fn import_session(&mut self, format_id: &str, bytes: &[u8]) -> Result<(), FormatError> {
        let data = self.registry.require(format_id)?.import(bytes)?;
        self.interaction.cancel();
        self.store = data.annotations;
        self.landmarks = data.landmarks;
        self.dirty = true;
        log::info!("📂 Imported session with {} annotations", self.store.len());
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------------

    pub fn update(&mut self, message: ViewerMessage) -> Option<Effect> {
        match message {
            ViewerMessage::LoadImage(url) => {
                self.load_image(url);
                None
            }
            ViewerMessage::ImageLoaded { natural, rect } => {
                self.mapper.update(rect, natural);
                self.dirty = true;
                log::debug!(
                    "🖼️ Image mounted: {}x{} shown at {}x{}",
                    natural.width,
                    natural.height,
                    rect.width,
                    rect.height
                );
                None
            }
            ViewerMessage::Resized(rect) => {
                self.mapper.set_rect(rect);
                self.dirty = true;
                None
            }
            ViewerMessage::ToggleTool(tool) => {
                match self.tools.toggle(tool, self.is_dicom()) {
                    ToggleResult::SpatialChanged => {
                        self.interaction.cancel();
                        self.dirty = true;
                    }
                    ToggleResult::DisplayChanged => {}
                    ToggleResult::Rejected => {
                        log::warn!("{} is not available for DICOM images", tool.name());
                    }
                }
                None
            }
            ViewerMessage::PointerDown { x, y } => self.pointer_down(x, y),
            ViewerMessage::PointerMove { x, y } => self.pointer_move(x, y),
            ViewerMessage::PointerUp { x, y } | ViewerMessage::PointerLeave { x, y } => {
                self.pointer_up(x, y);
                None
            }
            ViewerMessage::CancelGesture => {
                if self.interaction.cancel() {
                    self.dirty = true;
                }
                None
            }
            ViewerMessage::SubmitText(text) => {
                match self.interaction.submit_text(&text, &mut self.store) {
                    Ok(outcome) => self.apply_outcome(outcome),
                    Err(e) => {
                        log::warn!("Annotation rejected: {}", e);
                        self.status = Some(e.to_string());
                        None
                    }
                }
            }
            ViewerMessage::CancelText => {
                let outcome = self.interaction.cancel_text();
                self.apply_outcome(outcome)
            }
            ViewerMessage::Delete { kind, index } => {
                match self.store.remove(kind, index) {
                    Ok(()) => {
                        log::info!("🗑️ Deleted {} {}", kind, kind.badge(index));
                        self.dirty = true;
                    }
                    Err(e) => log::warn!("Delete failed: {}", e),
                }
                None
            }
            ViewerMessage::ClearAll => {
                self.store.clear();
                self.dirty = true;
                log::info!("🗑️ Cleared all annotations");
                None
            }
            ViewerMessage::SetWindowWidth(width) => {
                self.window_level.set_width(width);
                Some(Effect::ApplyWindowLevel(self.window_level))
            }
            ViewerMessage::SetWindowCenter(center) => {
                self.window_level.set_center(center);
                Some(Effect::ApplyWindowLevel(self.window_level))
            }
            ViewerMessage::ZoomIn => self.set_zoom(self.zoom.zoom_in()),
            ViewerMessage::ZoomOut => self.set_zoom(self.zoom.zoom_out()),
            ViewerMessage::Scrolled(offset) => {
                self.scroll = offset;
                None
            }
            ViewerMessage::Reset => {
                self.reset();
                Some(Effect::ApplyWindowLevel(self.window_level))
            }
            ViewerMessage::SelectPatient(did) => {
                self.patient.select(did);
                self.analysis = None;
                self.sequencer.invalidate_all();
                self.dirty = true;
                None
            }
            ViewerMessage::ClearPatient => {
                self.patient.clear();
                self.analysis = None;
                self.sequencer.invalidate_all();
                self.dirty = true;
                None
            }
            ViewerMessage::DetectLandmarks => self.request_landmarks(),
            ViewerMessage::LandmarksReceived { ticket, result } => {
                self.receive_landmarks(ticket, result);
                None
            }
            ViewerMessage::Analyze => self.request_analysis(),
            ViewerMessage::AnalysisReceived { ticket, result } => {
                self.receive_analysis(ticket, result);
                None
            }
            ViewerMessage::Export(format_id) => {
                match self.export(&format_id, &ExportOptions::new()) {
                    Ok(file) => Some(Effect::Download(file)),
                    Err(e) => {
                        log::error!("Export failed: {}", e);
                        self.status = Some(format!("Error al exportar: {e}"));
                        None
                    }
                }
            }
        }
    }

    fn load_image(&mut self, url: String) {
        let source = ImageSource::new(url);
        log::info!("🖼️ Loading {:?} image {}", source.kind(), source.name());
        self.mapper.invalidate();
        self.interaction.cancel();
        self.store.clear();
        self.landmarks.clear();
        self.facial_metrics = None;
        self.analysis = None;
        self.sequencer.invalidate_all();
        self.status = None;
        if source.is_dicom() && self.tools.restrict_to_dicom() {
            log::debug!("Overlay tool disabled for DICOM image");
        }
        self.source = Some(source);
        self.dirty = true;
    }

    fn reset(&mut self) {
        self.window_level = self.defaults.window_level();
        self.zoom = self.defaults.zoom();
        self.interaction.cancel();
        self.store.clear();
        self.landmarks.clear();
        self.facial_metrics = None;
        self.sequencer.invalidate_all();
        self.status = None;
        self.dirty = true;
        log::info!("🔄 Viewer reset");
    }

    fn set_zoom(&mut self, zoom: Zoom) -> Option<Effect> {
        if zoom == self.zoom {
            return None;
        }
        self.zoom = zoom;
        log::debug!("🔍 Zoom {}%", zoom.percent());
        Some(Effect::ApplyZoom(zoom))
    }

    /// Map a client position for the active tool. Pan works in client
    /// pixels; drawing tools work in native pixels.
    fn pointer_point(&self, x: f32, y: f32) -> Point {
        match self.tools.spatial {
            SpatialTool::Pan => Point::new(x, y),
            _ => self.mapper.client_to_native(x, y),
        }
    }

    fn accepts_pointer(&self) -> bool {
        self.source.is_some() && !self.is_dicom()
    }

    fn pointer_down(&mut self, x: f32, y: f32) -> Option<Effect> {
        if !self.accepts_pointer() {
            return None;
        }
        let point = self.pointer_point(x, y);
        let outcome = self
            .interaction
            .pointer_down(self.tools.spatial, point, &mut self.store);
        self.apply_outcome(outcome)
    }

    fn pointer_move(&mut self, x: f32, y: f32) -> Option<Effect> {
        if !self.accepts_pointer() {
            return None;
        }
        let point = self.pointer_point(x, y);
        let outcome = self.interaction.pointer_move(point);
        self.apply_outcome(outcome)
    }

    fn pointer_up(&mut self, x: f32, y: f32) {
        if !self.accepts_pointer() {
            return;
        }
        let point = self.pointer_point(x, y);
        let outcome = self.interaction.pointer_up(point, &mut self.store);
        self.apply_outcome(outcome);
    }

    fn apply_outcome(&mut self, outcome: Outcome) -> Option<Effect> {
        match outcome {
            Outcome::Nothing => None,
            Outcome::Updated | Outcome::Committed { .. } | Outcome::Discarded => {
                self.dirty = true;
                None
            }
            // Applied on every move, relative to the press origin
            Outcome::Scroll { dx, dy } => {
                self.scroll = self.scroll.pan_by(dx, dy);
                Some(Effect::ScrollTo(self.scroll))
            }
            Outcome::PromptText { point } => {
                self.dirty = true;
                let client = self.mapper.native_to_client(&point).unwrap_or(point);
                Some(Effect::OpenTextPrompt { point, client })
            }
        }
    }

    // ------------------------------------------------------------------------
    // Backend requests
    // ------------------------------------------------------------------------

    fn request_landmarks(&mut self) -> Option<Effect> {
        if self.source.is_none() {
            self.status = Some("No hay imagen cargada".to_string());
            return None;
        }
        let ticket = self.sequencer.issue(RequestKind::Landmarks);
        self.status = None;
        log::info!("🔍 Requesting landmarks (#{})", ticket.seq);
        Some(Effect::FetchLandmarks { ticket })
    }

    fn receive_landmarks(&mut self, ticket: RequestTicket, result: Result<LandmarkAnalysis, ApiError>) {
        if !self.sequencer.accept(ticket) {
            return;
        }
        match result {
            Ok(analysis) => {
                self.landmarks = analysis.key_landmarks();
                self.facial_metrics = analysis.metrics;
                log::info!(
                    "✅ {} landmarks detected, {} shown",
                    analysis.total,
                    self.landmarks.len()
                );
            }
            Err(e) => {
                log::error!("Landmark detection failed: {}", e);
                self.status = Some(e.user_message());
            }
        }
        self.dirty = true;
    }

    fn request_analysis(&mut self) -> Option<Effect> {
        if self.source.is_none() {
            self.status = Some("No hay imagen cargada".to_string());
            return None;
        }
        let Some(patient) = self.patient.did().cloned() else {
            log::warn!("Analysis requested without a selected patient");
            self.status = Some("Selecciona un paciente antes de analizar".to_string());
            return None;
        };
        let ticket = self.sequencer.issue(RequestKind::Analysis);
        self.status = None;
        Some(Effect::FetchAnalysis { ticket, patient })
    }

    fn receive_analysis(&mut self, ticket: RequestTicket, result: Result<AnalysisResult, ApiError>) {
        if !self.sequencer.accept(ticket) {
            return;
        }
        match result {
            Ok(analysis) => {
                let a = analysis.analysis();
                log::info!(
                    "✅ Analysis: {} ({:.0}%, {})",
                    a.diagnosis.predicted_class,
                    a.diagnosis.confidence * 100.0,
                    a.diagnosis.severity
                );
                if self.landmarks.is_empty() {
                    self.landmarks = a.landmarks.clone();
                }
                self.analysis = Some(analysis);
                self.dirty = true;
            }
            Err(e) => {
                log::error!("Analysis failed: {}", e);
                self.status = Some(e.user_message());
            }
        }
    }
}

impl Default for ImageViewer {
    fn default() -> Self {
        Self::new(ViewerDefaults::default())
    }
}
