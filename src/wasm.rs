//! Browser binding.
//!
//! `WebViewer` wraps an [`ImageViewer`] around an overlay `<canvas>` that sits
//! on top of the host's `<img>`. The host forwards DOM events, performs the
//! `fetch` calls described by [`PreparedRequest`], and reacts to the effect
//! objects returned as JSON (`null` when there is nothing to do).
//!
//! The host lays the canvas out over the image with CSS (same box as the
//! `<img>`); the backing store follows the canvas' client size and pointer
//! mapping reads its bounding box.

use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, HtmlCanvasElement, Url};

use crate::annotation::AnnotationKind;
use crate::api::{self, ApiRequest, ApiResponse, Endpoints, ImageUpload, RequestKind, RequestTicket};
use crate::config::AppConfig;
use crate::format::ExportFile;
use crate::patient::PatientDid;
use crate::render::paint;
use crate::render::web::WebCanvas;
use crate::tool::Tool;
use crate::transform::{ElementRect, ScrollOffset, Size};
use crate::viewer::{Effect, ImageViewer, ViewerMessage};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    let config = AppConfig::load_from_local_storage().unwrap_or_default();
    let level = config
        .preferences
        .log_level
        .to_level_filter()
        .to_level()
        .unwrap_or(log::Level::Info);
    if console_log::init_with_level(level).is_err() {
        web_sys::console::warn_1(&"clinview: logger already initialized".into());
    }
    log::info!("✅ clinview ready");
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Effects serialized for the host.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum HostEffect {
    OpenPrompt { x: f32, y: f32 },
    Scroll { left: f32, top: f32 },
    WindowLevel { width: f32, center: f32 },
    Zoom { percent: u32 },
    FetchLandmarks { seq: u64 },
    FetchAnalysis { seq: u64, patient: String },
}

/// A request for the host to send with `fetch`.
#[wasm_bindgen]
pub struct PreparedRequest {
    request: ApiRequest,
}

#[wasm_bindgen]
impl PreparedRequest {
    #[wasm_bindgen(getter)]
    pub fn method(&self) -> String {
        self.request.method.as_str().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn url(&self) -> String {
        self.request.url.clone()
    }

    /// Headers as a JSON object.
    #[wasm_bindgen(getter)]
    pub fn headers(&self) -> String {
        let map: serde_json::Map<String, serde_json::Value> = self
            .request
            .headers
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();
        serde_json::Value::Object(map).to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn body(&self) -> Option<Vec<u8>> {
        self.request.body.clone()
    }
}

#[wasm_bindgen]
pub struct WebViewer {
    viewer: ImageViewer,
    canvas: HtmlCanvasElement,
    surface: WebCanvas,
    endpoints: Endpoints,
    use_ensemble: bool,
}

#[wasm_bindgen]
impl WebViewer {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, token: Option<String>) -> Result<WebViewer, JsValue> {
        let config = AppConfig::load_from_local_storage().unwrap_or_default();
        let surface = WebCanvas::new(canvas.clone()).map_err(js_error)?;
        let mut endpoints = Endpoints::new(&config.preferences.api_base_url);
        if let Some(token) = token {
            endpoints = endpoints.with_token(token);
        }
        Ok(Self {
            viewer: ImageViewer::new(config.viewer),
            canvas,
            surface,
            endpoints,
            use_ensemble: config.preferences.use_ensemble,
        })
    }

    fn element_rect(&self) -> ElementRect {
        let rect = self.canvas.get_bounding_client_rect();
        ElementRect::new(
            rect.left() as f32,
            rect.top() as f32,
            rect.width() as f32,
            rect.height() as f32,
        )
    }

    fn dispatch(&mut self, message: ViewerMessage) -> Result<JsValue, JsValue> {
        let effect = self.viewer.update(message);
        self.render()?;
        let host = match effect {
            None => return Ok(JsValue::NULL),
            Some(Effect::Download(file)) => {
                download(&file)?;
                return Ok(JsValue::NULL);
            }
            Some(Effect::OpenTextPrompt { client, .. }) => HostEffect::OpenPrompt {
                x: client.x,
                y: client.y,
            },
            Some(Effect::ScrollTo(offset)) => HostEffect::Scroll {
                left: offset.left,
                top: offset.top,
            },
            Some(Effect::ApplyWindowLevel(wl)) => HostEffect::WindowLevel {
                width: wl.width(),
                center: wl.center(),
            },
            Some(Effect::ApplyZoom(zoom)) => HostEffect::Zoom {
                percent: zoom.percent(),
            },
            Some(Effect::FetchLandmarks { ticket }) => HostEffect::FetchLandmarks { seq: ticket.seq },
            Some(Effect::FetchAnalysis { ticket, patient }) => HostEffect::FetchAnalysis {
                seq: ticket.seq,
                patient: patient.to_string(),
            },
        };
        let json = serde_json::to_string(&host).map_err(js_error)?;
        js_sys::JSON::parse(&json)
    }

    /// Repaint the overlay if anything changed since the last paint.
    pub fn render(&mut self) -> Result<(), JsValue> {
        if self.viewer.take_dirty() {
            paint(&self.viewer.scene(), &mut self.surface).map_err(js_error)?;
        }
        Ok(())
    }

    // Image lifecycle

    #[wasm_bindgen(js_name = loadImage)]
    pub fn load_image(&mut self, url: String) -> Result<(), JsValue> {
        self.dispatch(ViewerMessage::LoadImage(url)).map(drop)
    }

    #[wasm_bindgen(js_name = imageLoaded)]
    pub fn image_loaded(&mut self, natural_width: f32, natural_height: f32) -> Result<(), JsValue> {
        let rect = self.element_rect();
        self.dispatch(ViewerMessage::ImageLoaded {
            natural: Size::new(natural_width, natural_height),
            rect,
        })
        .map(drop)
    }

    /// Call after window resizes and zoom changes.
    pub fn resized(&mut self) -> Result<(), JsValue> {
        let rect = self.element_rect();
        self.dispatch(ViewerMessage::Resized(rect)).map(drop)
    }

    #[wasm_bindgen(js_name = isDicom)]
    pub fn is_dicom(&self) -> bool {
        self.viewer.is_dicom()
    }

    // Tools

    /// Toggle a tool by id (`"measure"`, `"angle"`, ...). Returns whether it
    /// is active afterwards.
    #[wasm_bindgen(js_name = toggleTool)]
    pub fn toggle_tool(&mut self, id: &str) -> Result<bool, JsValue> {
        let tool = Tool::from_id(id).ok_or_else(|| js_error(format!("unknown tool {id}")))?;
        self.dispatch(ViewerMessage::ToggleTool(tool))?;
        Ok(self.viewer.tools().is_active(tool))
    }

    pub fn cursor(&self) -> String {
        self.viewer.cursor().css().to_string()
    }

    // Pointer

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f32, y: f32) -> Result<JsValue, JsValue> {
        self.dispatch(ViewerMessage::PointerDown { x, y })
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f32, y: f32) -> Result<JsValue, JsValue> {
        self.dispatch(ViewerMessage::PointerMove { x, y })
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, x: f32, y: f32) -> Result<JsValue, JsValue> {
        self.dispatch(ViewerMessage::PointerUp { x, y })
    }

    #[wasm_bindgen(js_name = pointerLeave)]
    pub fn pointer_leave(&mut self, x: f32, y: f32) -> Result<JsValue, JsValue> {
        self.dispatch(ViewerMessage::PointerLeave { x, y })
    }

    #[wasm_bindgen(js_name = cancelGesture)]
    pub fn cancel_gesture(&mut self) -> Result<(), JsValue> {
        self.dispatch(ViewerMessage::CancelGesture).map(drop)
    }

    // Text prompt

    #[wasm_bindgen(js_name = submitText)]
    pub fn submit_text(&mut self, text: String) -> Result<(), JsValue> {
        self.dispatch(ViewerMessage::SubmitText(text)).map(drop)
    }

    #[wasm_bindgen(js_name = cancelText)]
    pub fn cancel_text(&mut self) -> Result<(), JsValue> {
        self.dispatch(ViewerMessage::CancelText).map(drop)
    }

    // Store

    /// Delete by kind (`"measurement"`, `"angle"`, `"text"`) and index.
    pub fn delete(&mut self, kind: &str, index: usize) -> Result<(), JsValue> {
        let kind: AnnotationKind =
            serde_json::from_value(serde_json::Value::String(kind.to_string())).map_err(js_error)?;
        self.dispatch(ViewerMessage::Delete { kind, index }).map(drop)
    }

    #[wasm_bindgen(js_name = clearAll)]
    pub fn clear_all(&mut self) -> Result<(), JsValue> {
        self.dispatch(ViewerMessage::ClearAll).map(drop)
    }

    /// Annotation store as JSON, for side panels.
    pub fn annotations(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.viewer.store()).map_err(js_error)
    }

    // Display

    #[wasm_bindgen(js_name = setWindowWidth)]
    pub fn set_window_width(&mut self, width: f32) -> Result<JsValue, JsValue> {
        self.dispatch(ViewerMessage::SetWindowWidth(width))
    }

    #[wasm_bindgen(js_name = setWindowCenter)]
    pub fn set_window_center(&mut self, center: f32) -> Result<JsValue, JsValue> {
        self.dispatch(ViewerMessage::SetWindowCenter(center))
    }

    /// Remap `ImageData` pixels of a standard image in place.
    #[wasm_bindgen(js_name = applyWindowLevel)]
    pub fn apply_window_level(&self, pixels: &mut [u8]) {
        self.viewer.window_level().apply_rgba(pixels);
    }

    #[wasm_bindgen(js_name = zoomIn)]
    pub fn zoom_in(&mut self) -> Result<JsValue, JsValue> {
        self.dispatch(ViewerMessage::ZoomIn)
    }

    #[wasm_bindgen(js_name = zoomOut)]
    pub fn zoom_out(&mut self) -> Result<JsValue, JsValue> {
        self.dispatch(ViewerMessage::ZoomOut)
    }

    pub fn scrolled(&mut self, left: f32, top: f32) -> Result<(), JsValue> {
        self.dispatch(ViewerMessage::Scrolled(ScrollOffset::new(left, top)))
            .map(drop)
    }

    pub fn reset(&mut self) -> Result<JsValue, JsValue> {
        self.dispatch(ViewerMessage::Reset)
    }

    // Patient

    #[wasm_bindgen(js_name = selectPatient)]
    pub fn select_patient(&mut self, did: &str) -> Result<(), JsValue> {
        let did = PatientDid::parse(did).map_err(js_error)?;
        self.dispatch(ViewerMessage::SelectPatient(did)).map(drop)
    }

    #[wasm_bindgen(js_name = clearPatient)]
    pub fn clear_patient(&mut self) -> Result<(), JsValue> {
        self.dispatch(ViewerMessage::ClearPatient).map(drop)
    }

    // Backend

    #[wasm_bindgen(js_name = detectLandmarks)]
    pub fn detect_landmarks(&mut self) -> Result<JsValue, JsValue> {
        self.dispatch(ViewerMessage::DetectLandmarks)
    }

    /// Build the landmark upload for the image bytes the host fetched.
    #[wasm_bindgen(js_name = prepareLandmarks)]
    pub fn prepare_landmarks(&self, filename: String, bytes: Vec<u8>) -> Result<PreparedRequest, JsValue> {
        let upload = ImageUpload::new(filename, bytes).map_err(js_error)?;
        Ok(PreparedRequest {
            request: self.endpoints.landmarks(&upload),
        })
    }

    #[wasm_bindgen(js_name = landmarksResponse)]
    pub fn landmarks_response(&mut self, seq: u64, status: u16, body: Vec<u8>) -> Result<(), JsValue> {
        let result = api::parse_landmarks(&ApiResponse::new(status, body));
        self.dispatch(ViewerMessage::LandmarksReceived {
            ticket: RequestTicket {
                kind: RequestKind::Landmarks,
                seq,
            },
            result,
        })
        .map(drop)
    }

    pub fn analyze(&mut self) -> Result<JsValue, JsValue> {
        self.dispatch(ViewerMessage::Analyze)
    }

    #[wasm_bindgen(js_name = prepareAnalysis)]
    pub fn prepare_analysis(&self, filename: String, bytes: Vec<u8>) -> Result<PreparedRequest, JsValue> {
        let upload = ImageUpload::new(filename, bytes).map_err(js_error)?;
        let request = self
            .endpoints
            .analyze(self.viewer.patient(), &upload, self.use_ensemble)
            .map_err(js_error)?;
        Ok(PreparedRequest { request })
    }

    #[wasm_bindgen(js_name = analysisResponse)]
    pub fn analysis_response(&mut self, seq: u64, status: u16, body: Vec<u8>) -> Result<(), JsValue> {
        let result = api::parse_analysis(&ApiResponse::new(status, body));
        self.dispatch(ViewerMessage::AnalysisReceived {
            ticket: RequestTicket {
                kind: RequestKind::Analysis,
                seq,
            },
            result,
        })
        .map(drop)
    }

    /// Latest analysis as JSON, or `null`.
    pub fn analysis(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.viewer.analysis()).map_err(js_error)
    }

    #[wasm_bindgen(js_name = isBusy)]
    pub fn is_busy(&self) -> bool {
        self.viewer.is_busy()
    }

    pub fn status(&self) -> Option<String> {
        self.viewer.status().map(str::to_string)
    }

    // Export

    /// Export with a registered format (`"csv"`, `"session"`) and download it.
    pub fn export(&mut self, format_id: String) -> Result<(), JsValue> {
        self.dispatch(ViewerMessage::Export(format_id)).map(drop)
    }
}

/// Trigger a client-side download through a temporary object URL.
fn download(file: &ExportFile) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| js_error("no window"))?;
    let document = window.document().ok_or_else(|| js_error("no document"))?;

    let parts = js_sys::Array::new();
    parts.push(&js_sys::Uint8Array::from(file.contents.as_slice()));
    let options = BlobPropertyBag::new();
    options.set_type(file.mime_type);
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(&file.filename);
    anchor.click();
    Url::revoke_object_url(&url)?;

    log::info!("💾 Downloaded {}", file.filename);
    Ok(())
}
