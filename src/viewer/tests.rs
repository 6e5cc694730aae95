use super::*;
use crate::annotation::{AnnotationKind, Measurement};
use crate::api::{ApiError, DetectedPoint, LandmarkAnalysis};
use crate::patient::PatientDid;
use crate::render::DrawCommand;
use crate::tool::Tool;
use crate::transform::{ElementRect, Size};

const EPSILON: f32 = 0.001;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

/// Viewer with a 1000x500 image shown at 500x250, box origin at (100, 50).
fn mounted_viewer() -> ImageViewer {
    let mut viewer = ImageViewer::default();
    viewer.update(ViewerMessage::LoadImage("https://h/rx.png".to_string()));
    viewer.update(ViewerMessage::ImageLoaded {
        natural: Size::new(1000.0, 500.0),
        rect: ElementRect::new(100.0, 50.0, 500.0, 250.0),
    });
    viewer
}

fn with_tool(tool: Tool) -> ImageViewer {
    let mut viewer = mounted_viewer();
    viewer.update(ViewerMessage::ToggleTool(tool));
    viewer
}

fn drag(viewer: &mut ImageViewer, from: (f32, f32), to: (f32, f32)) {
    viewer.update(ViewerMessage::PointerDown { x: from.0, y: from.1 });
    viewer.update(ViewerMessage::PointerMove { x: to.0, y: to.1 });
    viewer.update(ViewerMessage::PointerUp { x: to.0, y: to.1 });
}

fn click(viewer: &mut ImageViewer, x: f32, y: f32) -> Option<Effect> {
    viewer.update(ViewerMessage::PointerDown { x, y })
}

fn face_detection() -> LandmarkAnalysis {
    LandmarkAnalysis {
        points: vec![DetectedPoint {
            id: 17,
            x: 0.5,
            y: 0.9,
            z: 0.0,
            pixel_x: 500.0,
            pixel_y: 450.0,
        }],
        total: 468,
        metrics: None,
    }
}

// ============================================================================
// Measurements
// ============================================================================

#[test]
fn test_short_drags_never_add_measurements() {
    let mut viewer = with_tool(Tool::Measure);
    // Client deltas of 2px are 4px native: still too short
    drag(&mut viewer, (200.0, 100.0), (202.0, 100.0));
    // Exactly 5px native is not strictly longer than the threshold
    drag(&mut viewer, (200.0, 100.0), (202.5, 100.0));
    drag(&mut viewer, (200.0, 100.0), (200.0, 100.0));

    assert!(viewer.store().measurements().is_empty());
    assert!(viewer.interaction().state().is_idle());
}

#[test]
fn test_long_drag_adds_one_native_measurement() {
    for rect in [
        ElementRect::new(100.0, 50.0, 500.0, 250.0),
        ElementRect::new(0.0, 0.0, 1000.0, 500.0),
        ElementRect::new(10.0, 10.0, 2000.0, 1000.0),
    ] {
        let mut viewer = with_tool(Tool::Measure);
        viewer.update(ViewerMessage::Resized(rect));
        let sx = rect.width / 1000.0;
        let sy = rect.height / 500.0;

        // Native (100, 100) -> (400, 300) expressed in client space
        let from = (rect.left + 100.0 * sx, rect.top + 100.0 * sy);
        let to = (rect.left + 400.0 * sx, rect.top + 300.0 * sy);
        drag(&mut viewer, from, to);

        let measurements = viewer.store().measurements();
        assert_eq!(measurements.len(), 1);
        let m = measurements[0];
        assert!(approx_eq(m.start.x, 100.0) && approx_eq(m.start.y, 100.0));
        assert!(approx_eq(m.end.x, 400.0) && approx_eq(m.end.y, 300.0));
    }
}

#[test]
fn test_pointer_leave_finishes_drag() {
    let mut viewer = with_tool(Tool::Measure);
    viewer.update(ViewerMessage::PointerDown { x: 100.0, y: 50.0 });
    viewer.update(ViewerMessage::PointerLeave { x: 150.0, y: 50.0 });

    assert_eq!(viewer.store().measurements().len(), 1);
    assert!(!viewer.interaction().is_dragging());
}

// ============================================================================
// Angles
// ============================================================================

#[test]
fn test_angle_needs_three_clicks() {
    let mut viewer = with_tool(Tool::Angle);
    click(&mut viewer, 200.0, 100.0);
    click(&mut viewer, 150.0, 100.0);
    assert!(viewer.store().angles().is_empty());

    click(&mut viewer, 150.0, 50.0);
    assert_eq!(viewer.store().angles().len(), 1);
    assert!(approx_eq(viewer.store().angles()[0].degrees(), 90.0));
    assert!(viewer.interaction().state().is_idle());
}

#[test]
fn test_switching_tool_discards_partial_angle() {
    for clicks in 1..=2 {
        let mut viewer = with_tool(Tool::Angle);
        for i in 0..clicks {
            click(&mut viewer, 200.0 + i as f32 * 20.0, 100.0);
        }
        assert_eq!(viewer.interaction().state().angle_clicks(), clicks);

        viewer.update(ViewerMessage::ToggleTool(Tool::Measure));
        viewer.update(ViewerMessage::ToggleTool(Tool::Angle));
        assert_eq!(viewer.interaction().state().angle_clicks(), 0);

        // A fresh gesture needs all three clicks again
        click(&mut viewer, 200.0, 100.0);
        click(&mut viewer, 150.0, 100.0);
        assert!(viewer.store().angles().is_empty());
    }
}

// ============================================================================
// Text annotations
// ============================================================================

#[test]
fn test_annotation_prompt_flow() {
    let mut viewer = with_tool(Tool::Annotate);
    let effect = click(&mut viewer, 150.0, 100.0);
    assert_eq!(
        effect,
        Some(Effect::OpenTextPrompt {
            point: Point::new(100.0, 100.0),
            client: Point::new(150.0, 100.0),
        })
    );

    // Modal: clicks are ignored while the prompt is open
    assert_eq!(click(&mut viewer, 300.0, 200.0), None);

    viewer.update(ViewerMessage::SubmitText("   ".to_string()));
    assert!(viewer.interaction().is_prompt_open());
    assert!(viewer.status().is_some());

    viewer.update(ViewerMessage::SubmitText("Caries".to_string()));
    assert_eq!(viewer.store().annotations().len(), 1);
    assert_eq!(viewer.store().annotations()[0].position, Point::new(100.0, 100.0));
}

#[test]
fn test_annotation_cancel() {
    let mut viewer = with_tool(Tool::Annotate);
    click(&mut viewer, 150.0, 100.0);
    viewer.update(ViewerMessage::CancelText);
    assert!(viewer.store().is_empty());
    assert!(!viewer.interaction().is_prompt_open());
}

// ============================================================================
// Store
// ============================================================================

#[test]
fn test_delete_by_index_shifts() {
    let mut viewer = with_tool(Tool::Measure);
    for y in [60.0, 80.0, 100.0] {
        drag(&mut viewer, (110.0, y), (200.0, y));
    }
    let before: Vec<Measurement> = viewer.store().measurements().to_vec();

    viewer.update(ViewerMessage::Delete {
        kind: AnnotationKind::Measurement,
        index: 1,
    });
    assert_eq!(viewer.store().measurements(), &[before[0], before[2]]);

    // Out of range: unchanged
    viewer.update(ViewerMessage::Delete {
        kind: AnnotationKind::Measurement,
        index: 5,
    });
    assert_eq!(viewer.store().measurements().len(), 2);
}

// ============================================================================
// Rendering
// ============================================================================

fn first_line(scene: &Scene) -> Option<(Point, Point)> {
    scene.iter().find_map(|cmd| match cmd {
        DrawCommand::Line { from, to, .. } => Some((*from, *to)),
        _ => None,
    })
}

#[test]
fn test_resize_changes_rendering_only() {
    let mut viewer = with_tool(Tool::Measure);
    drag(&mut viewer, (150.0, 100.0), (250.0, 100.0));
    let stored = viewer.store().clone();

    let (from, to) = first_line(&viewer.scene()).unwrap();
    assert!(approx_eq(from.x, 50.0) && approx_eq(to.x, 150.0));

    viewer.update(ViewerMessage::Resized(ElementRect::new(0.0, 0.0, 1000.0, 500.0)));
    let (from, to) = first_line(&viewer.scene()).unwrap();
    assert!(approx_eq(from.x, 100.0) && approx_eq(to.x, 300.0));
    assert!(approx_eq(from.y, 100.0));

    assert_eq!(viewer.store(), &stored);
}

#[test]
fn test_no_image_gives_empty_scene() {
    let viewer = ImageViewer::default();
    assert!(viewer.scene().is_empty());

    let mut viewer = ImageViewer::default();
    viewer.update(ViewerMessage::LoadImage("a.png".to_string()));
    assert!(viewer.scene().is_empty());
}

#[test]
fn test_dirty_flag() {
    let mut viewer = with_tool(Tool::Measure);
    assert!(viewer.take_dirty());
    assert!(!viewer.take_dirty());

    viewer.update(ViewerMessage::SetWindowWidth(800.0));
    assert!(!viewer.take_dirty());

    viewer.update(ViewerMessage::PointerDown { x: 150.0, y: 100.0 });
    assert!(viewer.take_dirty());
}

// ============================================================================
// Display controls
// ============================================================================

#[test]
fn test_pan_scrolls_against_drag() {
    let mut viewer = with_tool(Tool::Pan);
    viewer.update(ViewerMessage::Scrolled(ScrollOffset::new(50.0, 50.0)));
    viewer.update(ViewerMessage::PointerDown { x: 300.0, y: 200.0 });

    let effect = viewer.update(ViewerMessage::PointerMove { x: 320.0, y: 190.0 });
    assert_eq!(effect, Some(Effect::ScrollTo(ScrollOffset::new(48.0, 51.0))));
    viewer.update(ViewerMessage::PointerUp { x: 320.0, y: 190.0 });

    assert!(viewer.store().is_empty());
    assert_eq!(viewer.cursor(), Cursor::Grab);
}

#[test]
fn test_zoom_steps() {
    let mut viewer = mounted_viewer();
    assert_eq!(viewer.update(ViewerMessage::ZoomIn), Some(Effect::ApplyZoom(Zoom::new(110))));
    for _ in 0..20 {
        viewer.update(ViewerMessage::ZoomOut);
    }
    assert_eq!(viewer.zoom().percent(), 10);
    assert_eq!(viewer.update(ViewerMessage::ZoomOut), None);
}

#[test]
fn test_reset_restores_defaults_and_clears() {
    let mut viewer = with_tool(Tool::Measure);
    drag(&mut viewer, (150.0, 100.0), (250.0, 100.0));
    viewer.update(ViewerMessage::SetWindowCenter(500.0));
    viewer.update(ViewerMessage::ZoomIn);
    let effect = viewer.update(ViewerMessage::DetectLandmarks);
    let Some(Effect::FetchLandmarks { ticket }) = effect else {
        panic!("expected a landmark request");
    };

    let effect = viewer.update(ViewerMessage::Reset);
    assert_eq!(effect, Some(Effect::ApplyWindowLevel(WindowLevel::default())));
    assert!(viewer.store().is_empty());
    assert_eq!(viewer.zoom().percent(), 100);
    assert!(!viewer.is_busy());

    // The in-flight response arrives after reset and is dropped
    viewer.update(ViewerMessage::LandmarksReceived {
        ticket,
        result: Ok(face_detection()),
    });
    assert!(viewer.landmarks().is_empty());
}

// ============================================================================
// DICOM
// ============================================================================

#[test]
fn test_dicom_disables_overlay_tools() {
    let mut viewer = with_tool(Tool::Measure);
    viewer.update(ViewerMessage::LoadImage("https://pacs/estudio.DCM".to_string()));
    assert!(viewer.is_dicom());
    assert_eq!(viewer.tools().spatial, SpatialTool::None);

    viewer.update(ViewerMessage::ToggleTool(Tool::Measure));
    assert_eq!(viewer.tools().spatial, SpatialTool::None);

    viewer.update(ViewerMessage::ImageLoaded {
        natural: Size::new(512.0, 512.0),
        rect: ElementRect::new(0.0, 0.0, 512.0, 512.0),
    });
    viewer.update(ViewerMessage::ToggleTool(Tool::Pan));
    assert_eq!(viewer.update(ViewerMessage::PointerDown { x: 10.0, y: 10.0 }), None);
    assert!(!viewer.interaction().is_dragging());
}

// ============================================================================
// Backend responses
// ============================================================================

#[test]
fn test_landmarks_accepted() {
    let mut viewer = mounted_viewer();
    let Some(Effect::FetchLandmarks { ticket }) = viewer.update(ViewerMessage::DetectLandmarks)
    else {
        panic!("expected a landmark request");
    };
    assert!(viewer.is_busy());

    viewer.update(ViewerMessage::LandmarksReceived {
        ticket,
        result: Ok(face_detection()),
    });
    assert!(!viewer.is_busy());
    assert_eq!(viewer.landmarks().len(), 1);
    assert_eq!(viewer.landmarks()[0].name, "Barbilla");
    assert!(viewer.scene().texts().contains(&"Barbilla"));
}

#[test]
fn test_stale_landmarks_dropped() {
    let mut viewer = mounted_viewer();
    let Some(Effect::FetchLandmarks { ticket: old }) =
        viewer.update(ViewerMessage::DetectLandmarks)
    else {
        panic!("expected a landmark request");
    };
    let Some(Effect::FetchLandmarks { ticket: new }) =
        viewer.update(ViewerMessage::DetectLandmarks)
    else {
        panic!("expected a landmark request");
    };

    viewer.update(ViewerMessage::LandmarksReceived {
        ticket: old,
        result: Ok(face_detection()),
    });
    assert!(viewer.landmarks().is_empty());
    assert!(viewer.is_busy());

    viewer.update(ViewerMessage::LandmarksReceived {
        ticket: new,
        result: Err(ApiError::Backend("No se detectó ningún rostro".to_string())),
    });
    assert!(viewer.landmarks().is_empty());
    assert_eq!(viewer.status(), Some("No se detectó ningún rostro"));
}

#[test]
fn test_image_reload_drops_pending_response() {
    let mut viewer = mounted_viewer();
    let Some(Effect::FetchLandmarks { ticket }) = viewer.update(ViewerMessage::DetectLandmarks)
    else {
        panic!("expected a landmark request");
    };
    viewer.update(ViewerMessage::LoadImage("https://h/otra.png".to_string()));

    viewer.update(ViewerMessage::LandmarksReceived {
        ticket,
        result: Ok(face_detection()),
    });
    assert!(viewer.landmarks().is_empty());
}

#[test]
fn test_analysis_requires_patient() {
    let mut viewer = mounted_viewer();
    assert_eq!(viewer.update(ViewerMessage::Analyze), None);
    assert!(viewer.status().is_some());

    let did = PatientDid::parse("P-9").unwrap();
    viewer.update(ViewerMessage::SelectPatient(did.clone()));
    match viewer.update(ViewerMessage::Analyze) {
        Some(Effect::FetchAnalysis { patient, .. }) => assert_eq!(patient, did),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_clearing_patient_drops_pending_analysis() {
    let mut viewer = mounted_viewer();
    viewer.update(ViewerMessage::SelectPatient(PatientDid::parse("P-9").unwrap()));
    let Some(Effect::FetchAnalysis { ticket, .. }) = viewer.update(ViewerMessage::Analyze) else {
        panic!("expected an analysis request");
    };
    viewer.update(ViewerMessage::ClearPatient);

    viewer.update(ViewerMessage::AnalysisReceived {
        ticket,
        result: Err(ApiError::Backend("modelo no disponible".to_string())),
    });
    assert_eq!(viewer.status(), None);
    assert!(viewer.analysis().is_none());
}

// ============================================================================
// Export
// ============================================================================

#[test]
fn test_export_names_file_after_image() {
    let mut viewer = with_tool(Tool::Measure);
    drag(&mut viewer, (150.0, 100.0), (250.0, 100.0));

    let options = ExportOptions::new().date(chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    let file = viewer.export("csv", &options).unwrap();
    assert_eq!(file.filename, "mediciones_rx.png_2024-05-01.csv");
    assert_eq!(file.items_exported, 1);

    assert!(matches!(
        viewer.update(ViewerMessage::Export("xlsx".to_string())),
        None
    ));
    assert!(viewer.status().is_some());
}

#[test]
fn test_session_roundtrip_through_viewer() {
    let mut viewer = with_tool(Tool::Measure);
    drag(&mut viewer, (150.0, 100.0), (250.0, 100.0));
    let file = viewer.export("session", &ExportOptions::new()).unwrap();

    let mut other = mounted_viewer();
    other.import_session("session", &file.contents).unwrap();
    assert_eq!(other.store(), viewer.store());
}

#[test]
fn test_analysis_segmentation_is_drawn() {
    let mut viewer = mounted_viewer();
    viewer.update(ViewerMessage::SelectPatient(PatientDid::parse("P-9").unwrap()));
    let Some(Effect::FetchAnalysis { ticket, .. }) = viewer.update(ViewerMessage::Analyze) else {
        panic!("expected an analysis request");
    };
    let body = serde_json::json!({
        "success": true,
        "predicted_class": "class_i_normal",
        "confidence": 0.9,
        "segmentation": {"polygons": [[[0, 0], [512, 0], [512, 512]]]},
    });
    let result = crate::api::parse_analysis(&crate::api::ApiResponse::new(200, body.to_string()));
    viewer.take_dirty();
    viewer.update(ViewerMessage::AnalysisReceived { ticket, result });
    assert!(viewer.take_dirty());

    // 512 reference mapped onto the 500x250 display box
    let polygon = viewer.scene().iter().find_map(|cmd| match cmd {
        DrawCommand::Polygon { points, .. } => Some(points.clone()),
        _ => None,
    });
    let points = polygon.expect("segmentation polygon in scene");
    assert_eq!(points.len(), 3);
    assert!(approx_eq(points[2].x, 500.0) && approx_eq(points[2].y, 250.0));

    viewer.update(ViewerMessage::ClearPatient);
    assert!(viewer.scene().is_empty());
}
