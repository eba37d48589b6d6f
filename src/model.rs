//! Diagram model: the unpositioned tree handed over by a parser, and the
//! positioned tree the layout pass produces for renderers and exporters.

use serde::{Deserialize, Serialize};

use crate::geometry::Vec2;

/// A container of text lines, child nodes, and the associations scoped to
/// those children. The unit of recursive layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Compartment {
    #[serde(default)]
    pub lines: Vec<String>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub assocs: Vec<Association>,
}

impl Compartment {
    pub fn from_lines(lines: Vec<String>) -> Self {
        Self {
            lines,
            ..Self::default()
        }
    }
}

/// A shape instance. `parts[0]` is the title compartment; further parts are
/// body sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    /// Style key, e.g. "class", "database". Unknown keys fall back to the
    /// plain class box.
    pub kind: String,
    #[serde(default)]
    pub attrs: NodeAttrs,
    #[serde(default)]
    pub parts: Vec<Compartment>,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            parts: vec![Compartment::from_lines(vec![id.clone()])],
            id,
            kind: kind.into(),
            attrs: NodeAttrs::default(),
        }
    }
}

/// Style-affecting node attributes. Explicit coordinates pin the node center
/// within its compartment, overriding the graph layout step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeAttrs {
    pub x: Option<f32>,
    pub y: Option<f32>,
}

/// A directed relation between two nodes of the same compartment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Association {
    pub start: String,
    pub end: String,
    /// Arrow/line type tag. A tag containing `_` marks a same-rank edge.
    pub kind: String,
    #[serde(default)]
    pub start_label: Option<String>,
    #[serde(default)]
    pub end_label: Option<String>,
}

impl Association {
    pub fn new(start: impl Into<String>, end: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            kind: kind.into(),
            start_label: None,
            end_label: None,
        }
    }

    /// Same-rank edges get zero minimum length in the graph layout step.
    pub fn is_same_rank(&self) -> bool {
        self.kind.contains('_')
    }
}

// ── Positioned output ───────────────────────────────────────────────

/// A compartment after layout. `width`/`height` are final; `offset` is the
/// translation consumers apply to child coordinates when painting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutedCompartment {
    pub lines: Vec<String>,
    pub width: f32,
    pub height: f32,
    pub offset: Vec2,
    /// Position within the owning node, assigned by the node's sizing
    /// strategy. Zero for the root.
    pub x: f32,
    pub y: f32,
    pub nodes: Vec<LayoutedNode>,
    pub assocs: Vec<LayoutedAssociation>,
}

/// A node after layout. `x`/`y` is the center within the owning compartment's
/// graph space; `layout_width`/`layout_height` are the box inflated by the
/// routing margin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutedNode {
    pub id: String,
    pub kind: String,
    pub attrs: NodeAttrs,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub layout_width: f32,
    pub layout_height: f32,
    /// True when an explicit coordinate attribute pinned this node.
    pub fixed: bool,
    /// Separator polylines in node-local coordinates.
    pub dividers: Vec<Vec<Vec2>>,
    pub parts: Vec<LayoutedCompartment>,
}

impl LayoutedNode {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// An association after routing. The path starts and ends at the endpoint
/// node centers; the two adjacent points sit on each shape's boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutedAssociation {
    pub start: String,
    pub end: String,
    pub kind: String,
    pub path: Vec<Vec2>,
    pub start_label: Label,
    pub end_label: Label,
}

/// A placed text label attached to one end of an association. Empty text
/// collapses to a zero-size box pinned at the path endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Label {
    pub text: Option<String>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}
