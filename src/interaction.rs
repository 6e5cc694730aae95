//! Pointer interaction state machine.
//!
//! Turns pointer events (already mapped to native coordinates) into store
//! mutations according to the active spatial tool:
//!
//! - **Measure**: press, drag, release. Kept only if longer than
//!   [`MIN_MEASUREMENT_DISTANCE`].
//! - **Angle**: three separate presses (p1, vertex, p2). The builder survives
//!   between presses and commits on the third.
//! - **Annotate**: a press opens a text prompt; submit commits, cancel drops.
//! - **Pan**: press and drag; produces scroll deltas, never touches the store.

use crate::annotation::{
    Angle, AnnotationError, AnnotationKind, AnnotationStore, Measurement, Point, TextAnnotation,
};
use crate::constants::MIN_MEASUREMENT_DISTANCE;
use crate::tool::SpatialTool;

/// Tools that work by press-drag-release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTool {
    Measure,
    Pan,
}

/// State for a gesture currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    /// Not currently doing anything.
    #[default]
    Idle,
    /// Button held down; `origin` is where the press happened.
    Dragging {
        tool: DragTool,
        origin: Point,
        current: Point,
    },
    /// Angle gesture after one (`vertex == None`) or two clicks.
    AngleBuilding { p1: Point, vertex: Option<Point> },
    /// Waiting for the text prompt to be submitted or cancelled.
    AnnotationPending { point: Point },
}

impl InteractionState {
    /// Number of angle clicks recorded so far (0 outside an angle gesture).
    pub fn angle_clicks(&self) -> u8 {
        match self {
            InteractionState::AngleBuilding { vertex: None, .. } => 1,
            InteractionState::AngleBuilding { vertex: Some(_), .. } => 2,
            _ => 0,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }
}

/// What a pointer event did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// Event ignored
    Nothing,
    /// In-progress gesture changed; the overlay needs a redraw
    Updated,
    /// An item was appended to the store
    Committed { kind: AnnotationKind, index: usize },
    /// The gesture ended without adding anything
    Discarded,
    /// Pan drag delta relative to the press origin, in the coordinates the
    /// pointer events were given in
    Scroll { dx: f32, dy: f32 },
    /// The host should open the text prompt for this point
    PromptText { point: Point },
}

/// Uncommitted geometry for the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Preview {
    Measurement(Measurement),
    Angle {
        p1: Point,
        vertex: Option<Point>,
    },
}

/// Drives [`InteractionState`] from pointer events.
#[derive(Debug, Clone, Default)]
pub struct Interaction {
    state: InteractionState,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    /// A press-drag gesture is in progress.
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, InteractionState::Dragging { .. })
    }

    /// The text prompt is open.
    pub fn is_prompt_open(&self) -> bool {
        matches!(self.state, InteractionState::AnnotationPending { .. })
    }

    /// Pointer pressed at `point` (native coordinates).
    pub fn pointer_down(
        &mut self,
        tool: SpatialTool,
        point: Point,
        store: &mut AnnotationStore,
    ) -> Outcome {
        if self.is_prompt_open() {
            return Outcome::Nothing;
        }

        match tool {
            SpatialTool::None => Outcome::Nothing,
            SpatialTool::Measure => {
                self.state = InteractionState::Dragging {
                    tool: DragTool::Measure,
                    origin: point,
                    current: point,
                };
                log::debug!("✏️ Started measurement at ({:.1}, {:.1})", point.x, point.y);
                Outcome::Updated
            }
            SpatialTool::Pan => {
                self.state = InteractionState::Dragging {
                    tool: DragTool::Pan,
                    origin: point,
                    current: point,
                };
                Outcome::Nothing
            }
            SpatialTool::Angle => self.angle_click(point, store),
            SpatialTool::Annotate => {
                self.state = InteractionState::AnnotationPending { point };
                Outcome::PromptText { point }
            }
        }
    }

    fn angle_click(&mut self, point: Point, store: &mut AnnotationStore) -> Outcome {
        match self.state {
            InteractionState::AngleBuilding { p1, vertex: None } => {
                self.state = InteractionState::AngleBuilding {
                    p1,
                    vertex: Some(point),
                };
                log::debug!("📐 Angle vertex at ({:.1}, {:.1})", point.x, point.y);
                Outcome::Updated
            }
            InteractionState::AngleBuilding {
                p1,
                vertex: Some(vertex),
            } => {
                let angle = Angle::new(p1, vertex, point);
                let index = store.add_angle(angle);
                self.state = InteractionState::Idle;
                log::info!("✅ Created angle A{} ({:.1}°)", index + 1, angle.degrees());
                Outcome::Committed {
                    kind: AnnotationKind::Angle,
                    index,
                }
            }
            _ => {
                self.state = InteractionState::AngleBuilding {
                    p1: point,
                    vertex: None,
                };
                log::debug!("📐 Angle first point at ({:.1}, {:.1})", point.x, point.y);
                Outcome::Updated
            }
        }
    }

    /// Pointer moved to `point` (native coordinates).
    pub fn pointer_move(&mut self, point: Point) -> Outcome {
        match &mut self.state {
            InteractionState::Dragging {
                tool,
                origin,
                current,
            } => {
                *current = point;
                match tool {
                    DragTool::Measure => Outcome::Updated,
                    DragTool::Pan => Outcome::Scroll {
                        dx: point.x - origin.x,
                        dy: point.y - origin.y,
                    },
                }
            }
            _ => Outcome::Nothing,
        }
    }

    /// Pointer released (or left the overlay) at `point`.
    pub fn pointer_up(&mut self, point: Point, store: &mut AnnotationStore) -> Outcome {
        let InteractionState::Dragging { tool, origin, .. } = self.state else {
            return Outcome::Nothing;
        };
        self.state = InteractionState::Idle;

        match tool {
            DragTool::Pan => Outcome::Nothing,
            DragTool::Measure => {
                let measurement = Measurement::new(origin, point);
                let distance = measurement.distance();
                if distance > MIN_MEASUREMENT_DISTANCE {
                    let index = store.add_measurement(measurement);
                    log::info!("✅ Created measurement M{} ({:.1}px)", index + 1, distance);
                    Outcome::Committed {
                        kind: AnnotationKind::Measurement,
                        index,
                    }
                } else {
                    log::debug!("Measurement too short ({:.1}px), discarded", distance);
                    Outcome::Discarded
                }
            }
        }
    }

    /// Submit the text prompt. On invalid text the prompt stays open.
    pub fn submit_text(
        &mut self,
        text: &str,
        store: &mut AnnotationStore,
    ) -> Result<Outcome, AnnotationError> {
        let InteractionState::AnnotationPending { point } = self.state else {
            return Ok(Outcome::Nothing);
        };
        let annotation = TextAnnotation::new(point, text)?;
        let index = store.add_annotation(annotation);
        self.state = InteractionState::Idle;
        log::info!("✅ Created text annotation T{}", index + 1);
        Ok(Outcome::Committed {
            kind: AnnotationKind::Text,
            index,
        })
    }

    /// Close the text prompt without adding anything.
    pub fn cancel_text(&mut self) -> Outcome {
        if self.is_prompt_open() {
            self.state = InteractionState::Idle;
            Outcome::Discarded
        } else {
            Outcome::Nothing
        }
    }

    /// Drop whatever gesture is in progress. Returns true if one was dropped.
    pub fn cancel(&mut self) -> bool {
        let had_gesture = !self.state.is_idle();
        if had_gesture {
            log::debug!("❌ Gesture cancelled: {:?}", self.state);
        }
        self.state = InteractionState::Idle;
        had_gesture
    }

    /// Geometry to draw in the highlight colour, if any.
    pub fn preview(&self) -> Option<Preview> {
        match self.state {
            InteractionState::Dragging {
                tool: DragTool::Measure,
                origin,
                current,
            } => Some(Preview::Measurement(Measurement::new(origin, current))),
            InteractionState::AngleBuilding { p1, vertex } => Some(Preview::Angle { p1, vertex }),
            _ => None,
        }
    }
}
