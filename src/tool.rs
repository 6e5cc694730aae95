//! Viewer tools and their selection rules.

use serde::{Deserialize, Serialize};

/// Every toolbar tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tool {
    /// Window/level (brightness/contrast) controls
    WindowLevel,
    /// Zoom controls
    Zoom,
    /// Drag to scroll the viewport
    Pan,
    /// Drag to measure a distance
    Measure,
    /// Three clicks to measure an angle
    Angle,
    /// Click to pin a text note
    Annotate,
}

impl Tool {
    /// Get the display name for this tool.
    pub fn name(&self) -> &'static str {
        match self {
            Tool::WindowLevel => "W/L",
            Tool::Zoom => "Zoom",
            Tool::Pan => "Pan",
            Tool::Measure => "Medir",
            Tool::Angle => "Ángulo",
            Tool::Annotate => "Texto",
        }
    }

    pub fn all() -> &'static [Tool] {
        &[
            Tool::WindowLevel,
            Tool::Zoom,
            Tool::Pan,
            Tool::Measure,
            Tool::Angle,
            Tool::Annotate,
        ]
    }

    /// Tools that interpret pointer input on the overlay. Only one may be active.
    pub fn spatial(&self) -> Option<SpatialTool> {
        match self {
            Tool::Pan => Some(SpatialTool::Pan),
            Tool::Measure => Some(SpatialTool::Measure),
            Tool::Angle => Some(SpatialTool::Angle),
            Tool::Annotate => Some(SpatialTool::Annotate),
            Tool::WindowLevel | Tool::Zoom => None,
        }
    }

    /// Overlay drawing tools. These are unavailable on DICOM images.
    pub fn is_overlay_tool(&self) -> bool {
        matches!(self, Tool::Measure | Tool::Angle | Tool::Annotate)
    }

    /// Parse a tool from its camelCase identifier (`"windowLevel"`, `"measure"`, ...).
    pub fn from_id(id: &str) -> Option<Tool> {
        match id {
            "windowLevel" => Some(Tool::WindowLevel),
            "zoom" => Some(Tool::Zoom),
            "pan" => Some(Tool::Pan),
            "measure" => Some(Tool::Measure),
            "angle" => Some(Tool::Angle),
            "annotate" => Some(Tool::Annotate),
            _ => None,
        }
    }
}

/// The exclusive pointer-interpreting tool slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpatialTool {
    #[default]
    None,
    Pan,
    Measure,
    Angle,
    Annotate,
}

impl SpatialTool {
    pub fn tool(&self) -> Option<Tool> {
        match self {
            SpatialTool::None => None,
            SpatialTool::Pan => Some(Tool::Pan),
            SpatialTool::Measure => Some(Tool::Measure),
            SpatialTool::Angle => Some(Tool::Angle),
            SpatialTool::Annotate => Some(Tool::Annotate),
        }
    }
}

/// Mouse cursor hint for the overlay element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Default,
    Grab,
    Grabbing,
    Crosshair,
    Text,
}

impl Cursor {
    /// CSS `cursor` value.
    pub fn css(&self) -> &'static str {
        match self {
            Cursor::Default => "default",
            Cursor::Grab => "grab",
            Cursor::Grabbing => "grabbing",
            Cursor::Crosshair => "crosshair",
            Cursor::Text => "text",
        }
    }
}

/// Result of a toggle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleResult {
    /// The spatial tool changed; partial gestures must be dropped
    SpatialChanged,
    /// Only a display toggle flipped
    DisplayChanged,
    /// Tool is not available for the current image
    Rejected,
}

/// Which tools are currently enabled.
///
/// Window/level and zoom are display-only toggles that may be on together
/// with any spatial tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ToolState {
    pub spatial: SpatialTool,
    pub window_level: bool,
    pub zoom: bool,
}

impl ToolState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle a tool. Selecting the active spatial tool again turns it off;
    /// selecting another spatial tool replaces it. Overlay tools are rejected
    /// while `dicom` is set.
    pub fn toggle(&mut self, tool: Tool, dicom: bool) -> ToggleResult {
        if dicom && tool.is_overlay_tool() {
            return ToggleResult::Rejected;
        }
        match tool.spatial() {
            Some(spatial) => {
                self.spatial = if self.spatial == spatial {
                    SpatialTool::None
                } else {
                    spatial
                };
                ToggleResult::SpatialChanged
            }
            None => {
                match tool {
                    Tool::WindowLevel => self.window_level = !self.window_level,
                    Tool::Zoom => self.zoom = !self.zoom,
                    _ => {}
                }
                ToggleResult::DisplayChanged
            }
        }
    }

    pub fn is_active(&self, tool: Tool) -> bool {
        match tool {
            Tool::WindowLevel => self.window_level,
            Tool::Zoom => self.zoom,
            other => other.spatial() == Some(self.spatial),
        }
    }

    /// Drop overlay tools that DICOM images cannot use. Returns true if the
    /// spatial tool changed.
    pub fn restrict_to_dicom(&mut self) -> bool {
        let is_overlay = self.spatial.tool().is_some_and(|t| t.is_overlay_tool());
        if is_overlay {
            self.spatial = SpatialTool::None;
        }
        is_overlay
    }

    /// Cursor for the current tool; `dragging` only matters for pan.
    pub fn cursor(&self, dragging: bool) -> Cursor {
        match self.spatial {
            SpatialTool::Pan if dragging => Cursor::Grabbing,
            SpatialTool::Pan => Cursor::Grab,
            SpatialTool::Measure | SpatialTool::Angle => Cursor::Crosshair,
            SpatialTool::Annotate => Cursor::Text,
            SpatialTool::None => Cursor::Default,
        }
    }
}
