//! Backend client: URL building, authentication and response validation.

use web_time::Instant;

use crate::api::error::ApiError;
use crate::api::request::{ApiRequest, ApiResponse, ImageUpload, MultipartForm};
use crate::api::types::{
    self, AnalysisResult, Evolution, Explanation, HealthStatus, LandmarkAnalysis,
};
use crate::constants::DEFAULT_API_URL;
use crate::patient::{PatientContext, PatientDid};

/// Sends requests. Implemented with `ureq` on native; hosts and tests supply
/// their own.
pub trait Transport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        (**self).send(request)
    }
}

/// Builds backend requests without sending them.
///
/// The browser host sends these through `fetch`; [`ApiClient`] sends them
/// through a [`Transport`].
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoints {
    base_url: String,
    token: Option<String>,
}

impl Endpoints {
    /// Normalize the base URL: trimmed, no trailing slash, `https://` added
    /// when no scheme is given.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = (!token.trim().is_empty()).then_some(token);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: ApiRequest) -> ApiRequest {
        match &self.token {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }

    fn upload(&self, url: String, image: &ImageUpload) -> ApiRequest {
        let form = MultipartForm::new().file("file", image);
        let content_type = form.content_type();
        self.authorize(ApiRequest::post(url, content_type, form.finish()))
    }

    pub fn health(&self) -> ApiRequest {
        self.authorize(ApiRequest::get(self.url("/health")))
    }

    /// `POST /analyze`. A selected patient is required so results are
    /// attached to a record.
    pub fn analyze(
        &self,
        patient: &PatientContext,
        image: &ImageUpload,
        use_ensemble: bool,
    ) -> Result<ApiRequest, ApiError> {
        let did = patient
            .did()
            .ok_or_else(|| ApiError::invalid_request("no patient selected"))?;
        let url = format!(
            "{}?patient_did={}&use_ensemble={}",
            self.url("/analyze"),
            encode_component(did.as_str()),
            use_ensemble
        );
        Ok(self.upload(url, image))
    }

    pub fn landmarks(&self, image: &ImageUpload) -> ApiRequest {
        self.upload(self.url("/analyze/landmarks"), image)
    }

    pub fn explain(&self, image: &ImageUpload) -> ApiRequest {
        self.upload(self.url("/analyze/explain"), image)
    }

    pub fn evolution(&self, did: &PatientDid) -> ApiRequest {
        let path = format!("/patients/{}/evolution", encode_component(did.as_str()));
        self.authorize(ApiRequest::get(self.url(&path)))
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_API_URL.to_string()
    } else if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
fn encode_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Blocking client over a [`Transport`].
pub struct ApiClient<T: Transport> {
    endpoints: Endpoints,
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(endpoints: Endpoints, transport: T) -> Self {
        Self {
            endpoints,
            transport,
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn execute(&self, what: &str, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let start = Instant::now();
        log::debug!("{} {}", request.method, request.url);
        let result = self.transport.send(request);
        match &result {
            Ok(response) => log::info!(
                "🌐 {} -> HTTP {} in {:.1}ms",
                what,
                response.status,
                start.elapsed().as_secs_f64() * 1000.0
            ),
            Err(e) => log::error!("{} failed: {}", what, e),
        }
        result
    }

    fn logged<R>(what: &str, result: Result<R, ApiError>) -> Result<R, ApiError> {
        if let Err(e) = &result {
            log::warn!("{} rejected: {}", what, e);
        }
        result
    }

    pub fn health(&self) -> Result<HealthStatus, ApiError> {
        let response = self.execute("health", &self.endpoints.health())?;
        Self::logged("health", types::decode(&response))
    }

    pub fn analyze(
        &self,
        patient: &PatientContext,
        image: &ImageUpload,
        use_ensemble: bool,
    ) -> Result<AnalysisResult, ApiError> {
        let request = self.endpoints.analyze(patient, image, use_ensemble)?;
        let response = self.execute("analyze", &request)?;
        Self::logged("analyze", types::parse_analysis(&response))
    }

    pub fn detect_landmarks(&self, image: &ImageUpload) -> Result<LandmarkAnalysis, ApiError> {
        let response = self.execute("landmarks", &self.endpoints.landmarks(image))?;
        Self::logged("landmarks", types::parse_landmarks(&response))
    }

    pub fn explain(&self, image: &ImageUpload) -> Result<Explanation, ApiError> {
        let response = self.execute("explain", &self.endpoints.explain(image))?;
        Self::logged("explain", types::parse_explanation(&response))
    }

    pub fn evolution(&self, did: &PatientDid) -> Result<Evolution, ApiError> {
        let response = self.execute("evolution", &self.endpoints.evolution(did))?;
        Self::logged("evolution", types::parse_evolution(&response))
    }
}
