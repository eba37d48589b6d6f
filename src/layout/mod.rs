//! Recursive compartment layout: sizes nested compartments innermost-first,
//! delegates inter-node placement to the injected graph layout, then routes
//! every association and places its labels.

pub mod graph;
mod labels;
mod routing;

pub use graph::{DagreLayout, GraphEdgeSpec, GraphLayout, GraphNodeSpec, GraphResult, GraphSpec};

use std::collections::HashSet;

use log::debug;

use crate::config::Config;
use crate::geometry::{Rect, Vec2};
use crate::measure::{FontStyle, Measurer};
use crate::model::{
    Association, Compartment, LayoutedAssociation, LayoutedCompartment, LayoutedNode, Node,
};
use crate::style::{Style, size_node, style_for};

/// Extra clearance added on top of the edge margin when other nodes become
/// routing obstacles.
const OBSTACLE_CLEARANCE: f32 = 2.0;
/// Default start-label quadrant when the anchor sits exactly on an axis.
const START_LABEL_QUADRANT: labels::Quadrant = 4;
/// Default end-label quadrant when the anchor sits exactly on an axis.
const END_LABEL_QUADRANT: labels::Quadrant = 2;

/// Lay out an unpositioned compartment tree. The result owns fresh
/// positioned nodes; the input is left untouched.
///
/// `measurer` supplies text widths; `graph_layout` is the inter-node
/// placement step ([`DagreLayout`] in production, a stub in tests).
pub fn layout(
    measurer: &dyn Measurer,
    graph_layout: &dyn GraphLayout,
    config: &Config,
    root: &Compartment,
) -> LayoutedCompartment {
    let engine = Engine {
        measurer,
        graph_layout,
        config,
    };
    let result = engine.layout_compartment(root, 0, style_for("class"));
    debug!(
        "layout finished: canvas {:.1} x {:.1}",
        result.width, result.height
    );
    result
}

struct Engine<'a> {
    measurer: &'a dyn Measurer,
    graph_layout: &'a dyn GraphLayout,
    config: &'a Config,
}

/// Rolling min/max over path points, label boxes, and node extents. Starts
/// at zero on every side so an empty contribution leaves min = max = 0.
#[derive(Debug, Clone, Copy, Default)]
struct Extents {
    left: f32,
    right: f32,
    top: f32,
    bottom: f32,
}

impl Extents {
    fn include_point(&mut self, p: Vec2) {
        self.left = self.left.min(p.x);
        self.right = self.right.max(p.x);
        self.top = self.top.min(p.y);
        self.bottom = self.bottom.max(p.y);
    }

    fn include_box(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.left = self.left.min(x);
        self.right = self.right.max(x + width);
        self.top = self.top.min(y);
        self.bottom = self.bottom.max(y + height);
    }
}

impl Engine<'_> {
    /// Minimum box for a compartment's own text lines. The title row
    /// (compartment 0) measures bold.
    fn measure_lines(&self, lines: &[String], bold: bool) -> (f32, f32) {
        if lines.is_empty() {
            return (0.0, self.config.padding);
        }
        let style = if bold {
            FontStyle::BOLD
        } else {
            FontStyle::NORMAL
        };
        let widest = lines.iter().fold(0.0f32, |acc, line| {
            acc.max(self.measurer.text_width(
                line,
                &self.config.font,
                self.config.font_size,
                style,
            ))
        });
        let width = (widest + 2.0 * self.config.padding).round();
        let height =
            (self.config.line_height() * lines.len() as f32 + 2.0 * self.config.padding).round();
        (width, height)
    }

    fn layout_compartment(
        &self,
        compartment: &Compartment,
        index: usize,
        style: Style,
    ) -> LayoutedCompartment {
        let config = self.config;
        let (text_width, text_height) = self.measure_lines(&compartment.lines, index == 0);

        // Leaf compartments are exactly their text box.
        if compartment.nodes.is_empty() && compartment.assocs.is_empty() {
            return LayoutedCompartment {
                lines: compartment.lines.clone(),
                width: text_width,
                height: text_height,
                offset: Vec2::new(config.padding, config.padding),
                x: 0.0,
                y: 0.0,
                nodes: Vec::new(),
                assocs: Vec::new(),
            };
        }

        let direction = style.direction.unwrap_or(config.direction);
        let mut nodes: Vec<LayoutedNode> = compartment
            .nodes
            .iter()
            .map(|node| self.layout_node(node))
            .collect();

        let known: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        let assocs: Vec<&Association> = compartment
            .assocs
            .iter()
            .filter(|assoc| {
                let resolvable = known.contains(assoc.start.as_str())
                    && known.contains(assoc.end.as_str());
                if !resolvable {
                    debug!(
                        "dropping association {} -> {}: unknown endpoint",
                        assoc.start, assoc.end
                    );
                }
                resolvable
            })
            .collect();

        let spec = GraphSpec {
            nodes: nodes
                .iter()
                .map(|n| GraphNodeSpec {
                    id: n.id.clone(),
                    width: n.layout_width,
                    height: n.layout_height,
                })
                .collect(),
            edges: assocs
                .iter()
                .map(|assoc| GraphEdgeSpec {
                    start: assoc.start.clone(),
                    end: assoc.end.clone(),
                    min_len: if assoc.is_same_rank() {
                        Some(0.0)
                    } else if config.gravity != 1.0 {
                        Some(config.gravity)
                    } else {
                        None
                    },
                })
                .collect(),
            direction,
            node_spacing: config.spacing,
            rank_spacing: config.spacing,
            ranker: config.ranker.clone(),
            acyclicer: config.acyclicer.clone(),
        };
        let solved = self.graph_layout.solve(&spec);

        for node in &mut nodes {
            if let Some(center) = solved.positions.get(&node.id) {
                node.x = center.x;
                node.y = center.y;
            }
            // Explicit coordinates win over the graph layout.
            if let Some(x) = node.attrs.x {
                node.x = x;
                node.fixed = true;
            }
            if let Some(y) = node.attrs.y {
                node.y = y;
                node.fixed = true;
            }
        }

        let mut extents = Extents::default();
        let margin = config.edge_margin + config.padding + OBSTACLE_CLEARANCE;
        let mut placed = Vec::with_capacity(assocs.len());
        for assoc in assocs {
            let (Some(start), Some(end)) = (
                nodes.iter().find(|n| n.id == assoc.start),
                nodes.iter().find(|n| n.id == assoc.end),
            ) else {
                continue;
            };

            let obstacles: Vec<Rect> = nodes
                .iter()
                .filter(|n| n.id != assoc.start && n.id != assoc.end)
                .map(|n| Rect::around(n.center(), n.width, n.height, margin))
                .collect();

            let full = routing::route_best(
                start.center(),
                (start.width, start.height),
                end.center(),
                (end.width, end.height),
                direction,
                &obstacles,
                margin,
            );
            let mut path = Vec::with_capacity(full.len() + 2);
            path.push(start.center());
            path.extend(full);
            path.push(end.center());

            let start_anchor = path[1];
            let end_anchor = path[path.len() - 2];
            let start_quadrant = labels::adjust_quadrant(
                labels::quadrant(start_anchor, start.center()).unwrap_or(START_LABEL_QUADRANT),
                start.center(),
                end.center(),
                config.direction,
            );
            let end_quadrant = labels::adjust_quadrant(
                labels::quadrant(end_anchor, end.center()).unwrap_or(END_LABEL_QUADRANT),
                end.center(),
                start.center(),
                config.direction,
            );
            let start_label = labels::place_label(
                assoc.start_label.as_deref(),
                start_anchor,
                start_quadrant,
                self.measurer,
                config,
            );
            let end_label = labels::place_label(
                assoc.end_label.as_deref(),
                end_anchor,
                end_quadrant,
                self.measurer,
                config,
            );

            for point in &path {
                extents.include_point(*point);
            }
            for label in [&start_label, &end_label] {
                extents.include_box(label.x, label.y, label.width, label.height);
            }

            placed.push(LayoutedAssociation {
                start: assoc.start.clone(),
                end: assoc.end.clone(),
                kind: assoc.kind.clone(),
                path,
                start_label,
                end_label,
            });
        }

        // Node extents are included even without edges: explicitly positioned
        // nodes may lie outside what the graph layout reports as its bounds.
        for node in &nodes {
            extents.include_box(
                node.x - node.width / 2.0,
                node.y - node.height / 2.0,
                node.width,
                node.height,
            );
        }

        let width = (solved.width + (-extents.left).max(0.0)).max(extents.right - extents.left);
        let height = (solved.height + (-extents.top).max(0.0)).max(extents.bottom - extents.top);
        let graph_width = if width > 0.0 {
            width + 2.0 * config.gutter
        } else {
            0.0
        };
        let graph_height = if height > 0.0 {
            height + 2.0 * config.gutter
        } else {
            0.0
        };

        let has_children = !compartment.nodes.is_empty();
        let top_padding = if has_children {
            config.padding * config.top_padding_factor
        } else {
            config.padding
        };
        let bottom_padding = if has_children {
            config.padding * config.bottom_padding_factor
        } else {
            config.padding
        };
        let side_padding = config.padding;
        // Tuck the title row toward the content so it reads as a heading.
        let title_lift = if has_children {
            config.padding * config.title_lift_factor
        } else {
            0.0
        };

        let result = LayoutedCompartment {
            lines: compartment.lines.clone(),
            width: text_width.max(graph_width) + 2.0 * side_padding,
            height: text_height + (graph_height - title_lift) + top_padding + bottom_padding,
            offset: Vec2::new(
                side_padding - extents.left,
                top_padding - extents.top - title_lift,
            ),
            x: 0.0,
            y: 0.0,
            nodes,
            assocs: placed,
        };
        debug!(
            "compartment laid out: {} nodes, {} assocs, {:.1} x {:.1}",
            result.nodes.len(),
            result.assocs.len(),
            result.width,
            result.height
        );
        result
    }

    /// Lay out one node: recurse into its compartments, then let the style's
    /// sizing strategy derive the shape box and dividers.
    fn layout_node(&self, node: &Node) -> LayoutedNode {
        let style = style_for(&node.kind);
        let parts = node
            .parts
            .iter()
            .enumerate()
            .map(|(index, part)| self.layout_compartment(part, index, style))
            .collect();
        let mut laid = LayoutedNode {
            id: node.id.clone(),
            kind: node.kind.clone(),
            attrs: node.attrs.clone(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            layout_width: 0.0,
            layout_height: 0.0,
            fixed: false,
            dividers: Vec::new(),
            parts,
        };
        size_node(style, self.config, &mut laid);
        laid.layout_width = laid.width + 2.0 * self.config.edge_margin;
        laid.layout_height = laid.height + 2.0 * self.config.edge_margin;
        laid
    }
}
