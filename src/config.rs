use serde::{Deserialize, Serialize};

/// Rank direction for a layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "LR")]
    LeftRight,
    #[serde(rename = "TB")]
    TopBottom,
}

impl Direction {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "LR" | "right" => Some(Self::LeftRight),
            "TB" | "TD" | "down" => Some(Self::TopBottom),
            _ => None,
        }
    }

    pub fn rankdir(self) -> &'static str {
        match self {
            Self::LeftRight => "LR",
            Self::TopBottom => "TB",
        }
    }
}

/// Layout parameters, constant for one pass.
///
/// The title-lift and top/bottom padding multipliers are tuned visual
/// constants; the defaults preserve the original ratios but callers may
/// override them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Inner padding of compartments and label offsets.
    pub padding: f32,
    /// Node/rank separation handed to the graph layout step.
    pub spacing: f32,
    /// Extra whitespace around a compartment's graph content.
    pub gutter: f32,
    /// Clearance between a node's visual box and routed edges.
    pub edge_margin: f32,
    /// Arrowhead scale, carried for rendering consumers; the engine itself
    /// does not use it.
    pub arrow_size: f32,
    /// Minimum edge length factor. 1.0 leaves ranking untouched; any other
    /// value is passed to the graph layout as the edge's minimum length.
    pub gravity: f32,
    /// Stroke width, used by fixed-size shape strategies.
    pub line_width: f32,
    pub font: String,
    pub font_size: f32,
    /// Line height as a multiple of font size.
    pub leading: f32,
    pub direction: Direction,
    /// Ranking algorithm hint for the graph layout step.
    pub ranker: Option<String>,
    /// Cycle-removal hint for the graph layout step.
    pub acyclicer: Option<String>,
    /// Top padding multiplier for compartments that contain nodes.
    pub top_padding_factor: f32,
    /// Bottom padding multiplier for compartments that contain nodes.
    pub bottom_padding_factor: f32,
    /// How far the title row is tucked toward the content, as a multiple of
    /// padding, for compartments that contain nodes.
    pub title_lift_factor: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            padding: 8.0,
            spacing: 40.0,
            gutter: 5.0,
            edge_margin: 0.0,
            arrow_size: 1.0,
            gravity: 1.0,
            line_width: 3.0,
            font: "Helvetica".to_string(),
            font_size: 12.0,
            leading: 1.25,
            direction: Direction::TopBottom,
            ranker: None,
            acyclicer: None,
            top_padding_factor: 5.0,
            bottom_padding_factor: 4.0,
            title_lift_factor: 3.0,
        }
    }
}

impl Config {
    /// Line height in diagram units.
    pub fn line_height(&self) -> f32 {
        self.leading * self.font_size
    }
}
