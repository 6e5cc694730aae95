//! Typed backend responses.
//!
//! Bodies are first deserialized into loose wire structs, then validated into
//! the public types below. Anything the overlay depends on is checked here so
//! callers never see a half-valid analysis.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::annotation::{Landmark, Point};
use crate::api::error::ApiError;
use crate::api::request::ApiResponse;

// ============================================================================
// Error bodies
// ============================================================================

/// Pull a human-readable message out of an error body.
///
/// Understands FastAPI's `{"detail": ...}` as well as `{"error": ...}` and
/// `{"message": ...}`; falls back to the raw text.
pub fn error_message(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let Ok(value) = serde_json::from_slice::<Value>(body) else {
        return text.trim().to_string();
    };
    ["detail", "error", "message"]
        .iter()
        .find_map(|key| match value.get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        })
        .unwrap_or_else(|| text.trim().to_string())
}

/// Check the status and the `success` flag, then deserialize the body.
pub(crate) fn decode<T: for<'de> Deserialize<'de>>(response: &ApiResponse) -> Result<T, ApiError> {
    if !response.is_success() {
        return Err(ApiError::Status {
            status: response.status,
            message: error_message(&response.body),
        });
    }
    let value: Value = serde_json::from_slice(&response.body)?;
    if value.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(ApiError::Backend(error_message(&response.body)));
    }
    Ok(serde_json::from_value(value)?)
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn check_finite(what: &str, value: f32) -> Result<f32, ApiError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ApiError::malformed(format!("{what} is not a finite number")))
    }
}

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub model_loaded: bool,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy") || self.status.eq_ignore_ascii_case("ok")
    }
}

// ============================================================================
// Analysis
// ============================================================================

/// Severity category reported by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
    Undetermined,
}

impl Severity {
    pub fn parse(raw: &str) -> Severity {
        match raw.trim().to_lowercase().as_str() {
            "leve" | "mild" => Severity::Mild,
            "moderada" | "moderate" => Severity::Moderate,
            "severa" | "severe" => Severity::Severe,
            _ => Severity::Undetermined,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Mild => "Leve",
            Severity::Moderate => "Moderada",
            Severity::Severe => "Severa",
            Severity::Undetermined => "No determinada",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Predicted class and confidences.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnosis {
    pub predicted_class: String,
    /// Confidence of the predicted class in [0, 1]
    pub confidence: f32,
    pub severity: Severity,
    pub all_confidences: BTreeMap<String, f32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default)]
    pub diagnosis: String,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub urgency: String,
    #[serde(default)]
    pub suggested_treatment: String,
    #[serde(default)]
    pub confidence_note: String,
}

/// One cephalometric angle (ANB, SNA, SNB).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometricMeasure {
    pub value: f32,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub label: String,
}

/// Ensemble agreement figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnsembleMetrics {
    pub uncertainty: f32,
    pub consensus: bool,
}

/// A validated single-model analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub analysis_id: Option<String>,
    pub timestamp: Option<String>,
    pub patient_did: Option<String>,
    pub diagnosis: Diagnosis,
    /// Landmarks in native image pixels
    pub landmarks: Vec<Landmark>,
    pub recommendation: Option<Recommendation>,
    /// Keyed by measure name (`anb`, `sna`, `snb`)
    pub geometric: BTreeMap<String, GeometricMeasure>,
    /// Segmentation polygons at the backend's 512x512 reference size
    pub segmentation: Vec<Vec<Point>>,
    pub narrative_report: Option<String>,
    pub review_requested: bool,
}

/// Analysis result, tagged by which backend pipeline produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AnalysisResult {
    Single(Analysis),
    Ensemble {
        analysis: Analysis,
        metrics: EnsembleMetrics,
    },
}

impl AnalysisResult {
    pub fn analysis(&self) -> &Analysis {
        match self {
            AnalysisResult::Single(analysis) | AnalysisResult::Ensemble { analysis, .. } => analysis,
        }
    }

    pub fn ensemble_metrics(&self) -> Option<&EnsembleMetrics> {
        match self {
            AnalysisResult::Single(_) => None,
            AnalysisResult::Ensemble { metrics, .. } => Some(metrics),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireLandmark {
    x: f32,
    y: f32,
    #[serde(default, deserialize_with = "string_or_number")]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireSegmentation {
    #[serde(default)]
    polygons: Vec<Vec<[f32; 2]>>,
}

#[derive(Debug, Deserialize)]
struct WireAnalysis {
    #[serde(default, deserialize_with = "string_or_number")]
    analysis_id: Option<String>,
    timestamp: Option<String>,
    patient_did: Option<String>,
    predicted_class: Option<String>,
    confidence: Option<f32>,
    severity: Option<String>,
    #[serde(default)]
    all_confidences: BTreeMap<String, f32>,
    #[serde(default)]
    landmarks: Option<Vec<WireLandmark>>,
    recommendation: Option<Recommendation>,
    #[serde(default)]
    geometric_analysis: Option<BTreeMap<String, GeometricMeasure>>,
    segmentation: Option<WireSegmentation>,
    narrative_report: Option<String>,
    #[serde(default)]
    review_requested: bool,
    uncertainty: Option<f32>,
    consensus: Option<bool>,
    #[serde(default)]
    ensemble_active: bool,
}

/// Validate an `/analyze` response.
pub fn parse_analysis(response: &ApiResponse) -> Result<AnalysisResult, ApiError> {
    let wire: WireAnalysis = decode(response)?;

    let predicted_class = wire
        .predicted_class
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ApiError::malformed("missing predicted_class"))?;
    let confidence = check_finite(
        "confidence",
        wire.confidence
            .ok_or_else(|| ApiError::malformed("missing confidence"))?,
    )?;
    if !(0.0..=1.0).contains(&confidence) {
        return Err(ApiError::malformed(format!(
            "confidence {confidence} outside [0, 1]"
        )));
    }

    let mut landmarks = Vec::new();
    for (i, lm) in wire.landmarks.unwrap_or_default().into_iter().enumerate() {
        let x = check_finite("landmark x", lm.x)?;
        let y = check_finite("landmark y", lm.y)?;
        let id = lm.id.unwrap_or_else(|| i.to_string());
        landmarks.push(Landmark::new(format!("L{id}"), Point::new(x, y)));
    }

    let segmentation = wire
        .segmentation
        .map(|s| {
            s.polygons
                .into_iter()
                .filter(|poly| poly.len() >= 3)
                .map(|poly| poly.into_iter().map(|[x, y]| Point::new(x, y)).collect())
                .collect()
        })
        .unwrap_or_default();

    let analysis = Analysis {
        analysis_id: wire.analysis_id,
        timestamp: wire.timestamp,
        patient_did: wire.patient_did,
        diagnosis: Diagnosis {
            predicted_class,
            confidence,
            severity: wire
                .severity
                .as_deref()
                .map(Severity::parse)
                .unwrap_or(Severity::Undetermined),
            all_confidences: wire.all_confidences,
        },
        landmarks,
        recommendation: wire.recommendation,
        geometric: wire.geometric_analysis.unwrap_or_default(),
        segmentation,
        narrative_report: wire.narrative_report.filter(|r| !r.trim().is_empty()),
        review_requested: wire.review_requested,
    };

    if !wire.ensemble_active {
        return Ok(AnalysisResult::Single(analysis));
    }
    match (wire.uncertainty, wire.consensus) {
        (Some(uncertainty), Some(consensus)) => Ok(AnalysisResult::Ensemble {
            analysis,
            metrics: EnsembleMetrics {
                uncertainty: check_finite("uncertainty", uncertainty)?,
                consensus,
            },
        }),
        _ => Err(ApiError::malformed(
            "ensemble response without uncertainty/consensus",
        )),
    }
}

// ============================================================================
// Facial landmarks
// ============================================================================

/// Named face-mesh points drawn on the overlay.
pub const KEY_LANDMARKS: &[(u32, &str)] = &[
    (13, "Labio Superior"),
    (14, "Labio Inferior"),
    (61, "Comisura Izq"),
    (291, "Comisura Der"),
    (0, "Nariz"),
    (17, "Barbilla"),
];

/// One face-mesh point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectedPoint {
    pub id: u32,
    /// Normalized coordinates in [0, 1]
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
    /// Native image pixels
    pub pixel_x: f32,
    pub pixel_y: f32,
}

/// Facial proportions computed by the backend.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FacialMetrics {
    pub mouth_opening: Option<f32>,
    pub smile_width: Option<f32>,
    pub face_width: Option<f32>,
    pub face_height: Option<f32>,
    pub facial_symmetry: Option<f32>,
    pub jaw_angle: Option<f32>,
    pub golden_ratio_score: Option<f32>,
    pub face_ratio: Option<f32>,
    pub symmetry_status: Option<String>,
    pub jaw_angle_status: Option<String>,
    pub golden_ratio_status: Option<String>,
}

/// Validated `/analyze/landmarks` data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandmarkAnalysis {
    pub points: Vec<DetectedPoint>,
    pub total: usize,
    pub metrics: Option<FacialMetrics>,
}

impl LandmarkAnalysis {
    /// The named key points present in this detection, as overlay landmarks.
    pub fn key_landmarks(&self) -> Vec<Landmark> {
        KEY_LANDMARKS
            .iter()
            .filter_map(|(id, name)| {
                self.points
                    .iter()
                    .find(|p| p.id == *id)
                    .map(|p| Landmark::new(*name, Point::new(p.pixel_x, p.pixel_y)))
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct WireLandmarkData {
    #[serde(default)]
    detected: bool,
    total_landmarks: Option<usize>,
    #[serde(default)]
    landmarks: Vec<DetectedPoint>,
    metrics: Option<FacialMetrics>,
}

#[derive(Debug, Deserialize)]
struct WireLandmarkEnvelope {
    data: Option<WireLandmarkData>,
}

/// Validate an `/analyze/landmarks` response.
pub fn parse_landmarks(response: &ApiResponse) -> Result<LandmarkAnalysis, ApiError> {
    let envelope: WireLandmarkEnvelope = decode(response)?;
    let data = envelope
        .data
        .ok_or_else(|| ApiError::malformed("missing data"))?;
    if !data.detected {
        return Err(ApiError::Backend("No face detected".to_string()));
    }
    for p in &data.landmarks {
        check_finite("pixel_x", p.pixel_x)?;
        check_finite("pixel_y", p.pixel_y)?;
    }
    Ok(LandmarkAnalysis {
        total: data.total_landmarks.unwrap_or(data.landmarks.len()),
        points: data.landmarks,
        metrics: data.metrics,
    })
}

// ============================================================================
// Explanation (Grad-CAM)
// ============================================================================

/// A high-activation region of the heatmap, in heatmap pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InfluentialRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub predicted_class: Option<String>,
    /// `data:image/png;base64,...` overlay image
    pub explanation_image: String,
    #[serde(default)]
    pub influential_regions: Vec<InfluentialRegion>,
    #[serde(default)]
    pub heatmap_entropy: Option<f32>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Validate an `/analyze/explain` response.
pub fn parse_explanation(response: &ApiResponse) -> Result<Explanation, ApiError> {
    let explanation: Explanation = decode(response)?;
    if !explanation.explanation_image.starts_with("data:image/") {
        return Err(ApiError::malformed("explanation_image is not a data URL"));
    }
    Ok(explanation)
}

// ============================================================================
// Evolution
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub date: String,
    #[serde(default)]
    pub diagnosis: Option<String>,
    pub severity: f32,
    #[serde(default, deserialize_with = "string_or_number")]
    pub analysis_id: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendStatus {
    Improving,
    Worsening,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub slope: f32,
    pub status: TrendStatus,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub progress_rate_monthly: Option<f32>,
    pub current_severity: f32,
    #[serde(default)]
    pub predicted_severity_next_month: Option<f32>,
    #[serde(default)]
    pub prediction_method: Option<String>,
    #[serde(default)]
    pub anomaly_detected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evolution {
    pub patient_did: Option<String>,
    pub can_calculate_trend: bool,
    pub message: Option<String>,
    pub timeline: Vec<TimelineEntry>,
    pub trend: Option<Trend>,
}

#[derive(Debug, Deserialize)]
struct WireEvolutionData {
    #[serde(default)]
    can_calculate_trend: bool,
    message: Option<String>,
    #[serde(default)]
    timeline: Vec<TimelineEntry>,
    trend: Option<Trend>,
}

#[derive(Debug, Deserialize)]
struct WireEvolution {
    patient_did: Option<String>,
    data: Option<WireEvolutionData>,
}

/// Validate a `/patients/{did}/evolution` response.
pub fn parse_evolution(response: &ApiResponse) -> Result<Evolution, ApiError> {
    let wire: WireEvolution = decode(response)?;
    let data = wire.data.ok_or_else(|| ApiError::malformed("missing data"))?;
    if data.can_calculate_trend && data.trend.is_none() {
        return Err(ApiError::malformed("trend announced but missing"));
    }
    Ok(Evolution {
        patient_did: wire.patient_did,
        can_calculate_trend: data.can_calculate_trend,
        message: data.message,
        timeline: data.timeline,
        trend: data.trend,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ok(body: Value) -> ApiResponse {
        ApiResponse::new(200, body.to_string())
    }

    fn analysis_body() -> Value {
        json!({
            "success": true,
            "analysis_id": "a-1",
            "patient_did": "P-1",
            "predicted_class": "class_ii_division1",
            "confidence": 0.82,
            "severity": "Moderada",
            "all_confidences": {"class_ii_division1": 0.82, "class_i_normal": 0.1},
            "class_index": 3,
            "landmarks": [{"x": 10.5, "y": 20.0, "id": 0}, {"x": 30.0, "y": 40.0, "id": 1}],
            "recommendation": {"diagnosis": "Clase II", "urgency": "media"},
            "geometric_analysis": {"anb": {"value": 5.2, "status": "alto", "label": "ANB"}},
            "segmentation": {"mask": null, "polygons": [[[0, 0], [10, 0], [10, 10]], [[1, 1]]]},
            "narrative_report": "S: dolor",
        })
    }

    #[test]
    fn test_error_message_sources() {
        assert_eq!(error_message(r#"{"detail":"Archivo inválido"}"#.as_bytes()), "Archivo inválido");
        assert_eq!(error_message(br#"{"success":false,"error":"boom"}"#), "boom");
        assert_eq!(error_message(br#"{"message":"sin rostro"}"#), "sin rostro");
        assert_eq!(error_message(b"Bad Gateway\n"), "Bad Gateway");
    }

    #[test]
    fn test_single_analysis() {
        let result = parse_analysis(&ok(analysis_body())).unwrap();
        let AnalysisResult::Single(analysis) = &result else {
            panic!("expected single analysis");
        };
        assert_eq!(analysis.diagnosis.predicted_class, "class_ii_division1");
        assert_eq!(analysis.diagnosis.severity, Severity::Moderate);
        assert_eq!(analysis.landmarks[0], Landmark::new("L0", Point::new(10.5, 20.0)));
        assert_eq!(analysis.geometric["anb"].value, 5.2);
        // Degenerate polygon dropped
        assert_eq!(analysis.segmentation.len(), 1);
        assert!(result.ensemble_metrics().is_none());
    }

    #[test]
    fn test_ensemble_analysis() {
        let mut body = analysis_body();
        body["ensemble_active"] = json!(true);
        body["uncertainty"] = json!(0.12);
        body["consensus"] = json!(true);

        let result = parse_analysis(&ok(body.clone())).unwrap();
        assert_eq!(
            result.ensemble_metrics(),
            Some(&EnsembleMetrics {
                uncertainty: 0.12,
                consensus: true
            })
        );

        body.as_object_mut().unwrap().remove("consensus");
        assert!(matches!(parse_analysis(&ok(body)), Err(ApiError::Malformed(_))));
    }

    #[test]
    fn test_analysis_validation() {
        let mut body = analysis_body();
        body["confidence"] = json!(1.7);
        assert!(matches!(parse_analysis(&ok(body)), Err(ApiError::Malformed(_))));

        let mut body = analysis_body();
        body.as_object_mut().unwrap().remove("predicted_class");
        assert!(matches!(parse_analysis(&ok(body)), Err(ApiError::Malformed(_))));
    }

    #[test]
    fn test_null_optional_sections() {
        let mut body = analysis_body();
        body["geometric_analysis"] = Value::Null;
        body["segmentation"] = Value::Null;
        body["landmarks"] = Value::Null;
        body["severity"] = json!("No determinada");

        let result = parse_analysis(&ok(body)).unwrap();
        let analysis = result.analysis();
        assert!(analysis.geometric.is_empty());
        assert!(analysis.segmentation.is_empty());
        assert!(analysis.landmarks.is_empty());
        assert_eq!(analysis.diagnosis.severity, Severity::Undetermined);
    }

    #[test]
    fn test_status_and_backend_errors() {
        let resp = ApiResponse::new(400, r#"{"detail":"Formato no soportado"}"#);
        match parse_analysis(&resp) {
            Err(ApiError::Status { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "Formato no soportado");
            }
            other => panic!("unexpected {other:?}"),
        }

        let resp = ok(json!({"success": false, "error": "modelo no cargado"}));
        assert!(matches!(parse_analysis(&resp), Err(ApiError::Backend(m)) if m == "modelo no cargado"));

        let resp = ApiResponse::new(200, "<html>");
        assert!(matches!(parse_analysis(&resp), Err(ApiError::Json(_))));
    }

    #[test]
    fn test_landmarks_and_key_points() {
        let body = json!({
            "success": true,
            "data": {
                "detected": true,
                "total_landmarks": 468,
                "landmarks": [
                    {"id": 0, "x": 0.5, "y": 0.4, "z": 0.0, "pixel_x": 320, "pixel_y": 192},
                    {"id": 13, "x": 0.5, "y": 0.6, "z": 0.0, "pixel_x": 320, "pixel_y": 288},
                    {"id": 200, "x": 0.1, "y": 0.1, "z": 0.0, "pixel_x": 64, "pixel_y": 48}
                ],
                "metrics": {"mouth_opening": 12.5, "symmetry_status": "Buena"}
            }
        });
        let analysis = parse_landmarks(&ok(body)).unwrap();
        assert_eq!(analysis.total, 468);
        assert_eq!(analysis.metrics.as_ref().and_then(|m| m.mouth_opening), Some(12.5));

        let keys = analysis.key_landmarks();
        assert_eq!(
            keys,
            vec![
                Landmark::new("Labio Superior", Point::new(320.0, 288.0)),
                Landmark::new("Nariz", Point::new(320.0, 192.0)),
            ]
        );
    }

    #[test]
    fn test_no_face_detected() {
        let resp = ok(json!({"success": false, "message": "No se detectó ningún rostro en la imagen"}));
        assert!(matches!(parse_landmarks(&resp), Err(ApiError::Backend(_))));

        let resp = ok(json!({"success": true, "data": {"detected": false}}));
        assert!(matches!(parse_landmarks(&resp), Err(ApiError::Backend(_))));
    }

    #[test]
    fn test_explanation() {
        let body = json!({
            "success": true,
            "predicted_class": "class_iii",
            "explanation_image": "data:image/png;base64,AAAA",
            "influential_regions": [{"x": 1, "y": 2, "width": 3, "height": 4, "score": 0.9}],
            "heatmap_entropy": 2.1,
            "description": "zona mandibular"
        });
        let explanation = parse_explanation(&ok(body)).unwrap();
        assert_eq!(explanation.influential_regions.len(), 1);
        assert_eq!(explanation.influential_regions[0].score, 0.9);

        let bad = json!({"success": true, "explanation_image": ""});
        assert!(matches!(parse_explanation(&ok(bad)), Err(ApiError::Malformed(_))));
    }

    #[test]
    fn test_evolution() {
        let body = json!({
            "success": true,
            "patient_did": "P-1",
            "data": {
                "can_calculate_trend": true,
                "timeline": [
                    {"date": "2024-01-01T10:00:00", "diagnosis": "class_iii", "severity": 8, "analysis_id": 4, "image": "a.png"},
                    {"date": "2024-03-01T10:00:00", "diagnosis": "class_ii_division1", "severity": 4, "analysis_id": "b-2", "image": null}
                ],
                "trend": {
                    "slope": -0.06, "status": "improving", "description": "Mejora",
                    "progress_rate_monthly": -1.9, "current_severity": 4.0,
                    "predicted_severity_next_month": 3.1, "prediction_method": "linear",
                    "anomaly_detected": false
                }
            }
        });
        let evolution = parse_evolution(&ok(body)).unwrap();
        assert_eq!(evolution.timeline.len(), 2);
        assert_eq!(evolution.timeline[0].analysis_id.as_deref(), Some("4"));
        assert_eq!(evolution.trend.map(|t| t.status), Some(TrendStatus::Improving));
    }

    #[test]
    fn test_evolution_without_trend() {
        let body = json!({
            "success": true,
            "data": {
                "can_calculate_trend": false,
                "message": "Se necesitan al menos 2 análisis para calcular una tendencia.",
                "timeline": []
            }
        });
        let evolution = parse_evolution(&ok(body)).unwrap();
        assert!(!evolution.can_calculate_trend);
        assert!(evolution.trend.is_none());
        assert!(evolution.message.is_some());

        let inconsistent = json!({"success": true, "data": {"can_calculate_trend": true, "timeline": []}});
        assert!(matches!(parse_evolution(&ok(inconsistent)), Err(ApiError::Malformed(_))));
    }
}
