//! Shape style table: maps a node's type string to a sizing strategy.
//!
//! Only the sizing half of a style lives here; how a shape is painted is the
//! renderer's business. Unknown type strings fall back to the plain class
//! box so a typo never fails a layout pass.

use std::f32::consts::PI;

use crate::config::{Config, Direction};
use crate::geometry::Vec2;
use crate::model::{LayoutedCompartment, LayoutedNode};

/// Number of samples along the database drum's divider arc.
const ARC_SAMPLES: usize = 16;
/// Fixed icon shapes are this many font sizes across.
const ICON_SIZE_FACTOR: f32 = 2.5;
/// Labelled icons (lollipop heads, sockets) are this many font sizes across.
const LABELLED_ICON_SIZE_FACTOR: f32 = 1.5;
/// Minimum footprint of an architecture element box.
const ARCHIMATE_MIN_WIDTH: f32 = 160.0;
const ARCHIMATE_MIN_HEIGHT: f32 = 90.0;
/// Height of the title band at the top of an architecture element.
const ARCHIMATE_TITLE_BAND: f32 = 29.0;

/// Closed set of shape sizing strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visual {
    /// Stacked rectangular compartments with straight dividers.
    Class,
    /// Class box with the title column shifted into a pipe lid.
    Pipe,
    /// Cylinder: padded vertically, dividers bow downward.
    Database,
    /// Compartments inscribed in an ellipse, dividers clipped to the rim.
    Ellipse,
    /// Compartments inscribed in a diamond.
    Rhomb,
    /// Class box with a folder tab divider around the title.
    Frame,
    /// Architecture element: enforced minimum footprint with a title band.
    Archimate,
    /// Header compartment over a grid of equally sized cells with row and
    /// column dividers.
    Table,
    /// Small fixed-size icon with its label compartments kept beside it.
    LabelledIcon,
    /// Fixed-size circle icon, text discarded.
    Start,
    /// Fixed-size circle icon, text discarded.
    End,
    /// Synchronization bar: a thin line across the rank axis.
    Sync,
    /// Invisible 1x1 placeholder.
    Hidden,
}

/// Sizing-relevant style of a node type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub visual: Visual,
    /// Overrides the diagram direction for compartments inside this node.
    pub direction: Option<Direction>,
}

impl Style {
    pub fn new(visual: Visual) -> Self {
        Self {
            visual,
            direction: None,
        }
    }
}

/// Look up the style for a node type string, falling back to the class box.
pub fn style_for(kind: &str) -> Style {
    let visual = match kind {
        "database" => Visual::Database,
        "table" => Visual::Table,
        "usecase" | "ellipse" => Visual::Ellipse,
        "choice" | "rhomb" => Visual::Rhomb,
        "frame" => Visual::Frame,
        "pipe" => Visual::Pipe,
        "start" => Visual::Start,
        "end" => Visual::End,
        "sync" => Visual::Sync,
        "hidden" => Visual::Hidden,
        "lollipop" | "socket" => Visual::LabelledIcon,
        "actor" | "component" | "interface" | "process" | "device"
        | "communication_network" | "system_software" | "artifact" | "collaboration"
        | "function" | "interaction" | "node" | "event" | "service" | "data" | "object"
        | "role" | "contract" | "application" | "business" | "technology" => Visual::Archimate,
        _ => Visual::Class,
    };
    Style::new(visual)
}

/// Compute a node's width, height, dividers, and compartment placement from
/// the already laid out compartment sizes.
pub(crate) fn size_node(style: Style, config: &Config, node: &mut LayoutedNode) {
    match style.visual {
        Visual::Class => stack_parts(node, Vec2::default()),
        Visual::Pipe => stack_parts(node, Vec2::new(-config.padding / 2.0, 0.0)),
        Visual::Database => size_database(config, node),
        Visual::Ellipse => size_ellipse(node),
        Visual::Rhomb => size_rhomb(node),
        Visual::Frame => size_frame(node),
        Visual::Archimate => size_archimate(node),
        Visual::Table => size_table(node),
        Visual::LabelledIcon => size_labelled_icon(config, node),
        Visual::Start | Visual::End => size_icon(config, node),
        Visual::Sync => size_sync(config, node),
        Visual::Hidden => size_hidden(node),
    }
}

fn max_part_width(node: &LayoutedNode) -> f32 {
    node.parts.iter().fold(0.0, |acc, p| acc.max(p.width))
}

fn total_part_height(node: &LayoutedNode) -> f32 {
    node.parts.iter().map(|p| p.height).sum()
}

/// Plain box: compartments stacked top to bottom, each stretched to the
/// widest, with a horizontal divider after every non-final compartment.
fn stack_parts(node: &mut LayoutedNode, offset: Vec2) {
    node.width = max_part_width(node);
    node.height = total_part_height(node);
    node.dividers.clear();
    let mut y = 0.0;
    let count = node.parts.len();
    let width = node.width;
    for (i, part) in node.parts.iter_mut().enumerate() {
        part.x = offset.x;
        part.y = y + offset.y;
        part.width = width;
        y += part.height;
        if i + 1 < count {
            node.dividers
                .push(vec![Vec2::new(0.0, y), Vec2::new(width, y)]);
        }
    }
}

fn size_database(config: &Config, node: &mut LayoutedNode) {
    node.width = max_part_width(node);
    node.height = total_part_height(node) + config.padding * 2.0;
    node.dividers.clear();
    let mut y = config.padding * 1.5;
    let count = node.parts.len();
    let width = node.width;
    for (i, part) in node.parts.iter_mut().enumerate() {
        part.x = 0.0;
        part.y = y;
        part.width = width;
        y += part.height;
        if i + 1 < count {
            let arc = (0..ARC_SAMPLES)
                .map(|step| {
                    let a = PI * step as f32 / (ARC_SAMPLES - 1) as f32;
                    Vec2::new(
                        width * 0.5 * (1.0 - a.cos()),
                        y + config.padding * (0.75 * a.sin() - 0.5),
                    )
                })
                .collect();
            node.dividers.push(arc);
        }
    }
}

fn size_ellipse(node: &mut LayoutedNode) {
    let width = max_part_width(node);
    let height = total_part_height(node);
    node.width = width * 1.25;
    node.height = height * 1.25;
    node.dividers.clear();
    let full_w = node.width;
    let full_h = node.height;
    // Chord across the rim at height y, measured from the ellipse equation.
    let rim = |y: f32| -> f32 {
        let t = y / full_h - 0.5;
        (0.25 - t * t).max(0.0).sqrt() * full_w
    };
    let mut y = height * 0.125;
    let count = node.parts.len();
    for (i, part) in node.parts.iter_mut().enumerate() {
        part.x = width * 0.125;
        part.y = y;
        part.width = width;
        y += part.height;
        if i + 1 < count {
            node.dividers.push(vec![
                Vec2::new(full_w / 2.0 + rim(y) - 1.0, y),
                Vec2::new(full_w / 2.0 - rim(y) + 1.0, y),
            ]);
        }
    }
}

fn size_rhomb(node: &mut LayoutedNode) {
    let width = max_part_width(node);
    let height = total_part_height(node);
    node.width = width * 1.5;
    node.height = height * 1.5;
    node.dividers.clear();
    let full_w = node.width;
    let full_h = node.height;
    let slope = full_w / full_h;
    let mut y = height * 0.25;
    let count = node.parts.len();
    for (i, part) in node.parts.iter_mut().enumerate() {
        part.x = width * 0.25;
        part.y = y;
        part.width = width;
        y += part.height;
        if i + 1 < count {
            let half = if y < full_h / 2.0 {
                y * slope
            } else {
                (full_h - y) * slope
            };
            node.dividers.push(vec![
                Vec2::new(full_w / 2.0 + half, y),
                Vec2::new(full_w / 2.0 - half, y),
            ]);
        }
    }
}

fn size_frame(node: &mut LayoutedNode) {
    let (tab_w, tab_h) = node
        .parts
        .first()
        .map(|p| (p.width, p.height))
        .unwrap_or((0.0, 0.0));
    if let Some(title) = node.parts.first_mut() {
        title.width += tab_h / 2.0;
    }
    stack_parts(node, Vec2::default());
    if !node.dividers.is_empty() {
        node.dividers.remove(0);
    }
    node.dividers.insert(
        0,
        vec![
            Vec2::new(0.0, tab_h),
            Vec2::new(tab_w - tab_h / 4.0, tab_h),
            Vec2::new(tab_w + tab_h / 4.0, tab_h / 2.0),
            Vec2::new(tab_w + tab_h / 4.0, 0.0),
        ],
    );
}

/// Architecture element: compartments stack under a fixed title band and the
/// box never shrinks below the conventional element footprint.
fn size_archimate(node: &mut LayoutedNode) {
    node.width = max_part_width(node).max(ARCHIMATE_MIN_WIDTH);
    node.height = total_part_height(node).max(ARCHIMATE_MIN_HEIGHT);
    node.dividers.clear();
    let mut y = ARCHIMATE_TITLE_BAND;
    let count = node.parts.len();
    let width = node.width;
    for (i, part) in node.parts.iter_mut().enumerate() {
        part.x = 0.0;
        part.y = y;
        part.width = width;
        y += part.height;
        if i + 1 < count {
            node.dividers
                .push(vec![Vec2::new(0.0, y), Vec2::new(width, y)]);
        }
    }
}

/// Header compartment over a grid of cells. Empty compartments act as row
/// breaks and are dropped after positioning; a row also wraps once it reaches
/// the first row's length.
fn size_table(node: &mut LayoutedNode) {
    if node.parts.len() <= 1 {
        stack_parts(node, Vec2::default());
        return;
    }
    let is_break = |p: &LayoutedCompartment| {
        p.lines.is_empty() && p.nodes.is_empty() && p.assocs.is_empty()
    };

    let count = node.parts.len();
    let mut rows: Vec<Vec<usize>> = vec![Vec::new()];
    for index in 1..count {
        let at_end = index == count - 1;
        let last = rows.len() - 1;
        if !at_end && is_break(&node.parts[index]) && !rows[last].is_empty() {
            rows.push(Vec::new());
        } else if last > 0 && rows[0].len() == rows[last].len() {
            rows.push(vec![index]);
        } else {
            rows[last].push(index);
        }
    }

    let columns = rows[0].len().max(1);
    let header_height = node.parts[0].height;
    let cell_width = node.parts[1..].iter().fold(
        node.parts[0].width / columns as f32,
        |acc, p| acc.max(p.width),
    );
    let cell_height = node.parts[1..].iter().fold(0.0f32, |acc, p| acc.max(p.height));
    let width = cell_width * columns as f32;
    let height = header_height + cell_height * rows.len() as f32;
    node.width = width;
    node.height = height;

    node.dividers.clear();
    for i in 0..rows.len() {
        let y = header_height + i as f32 * cell_height;
        node.dividers
            .push(vec![Vec2::new(0.0, y), Vec2::new(width, y)]);
    }
    for j in 0..columns {
        let x = (j + 1) as f32 * cell_width;
        node.dividers
            .push(vec![Vec2::new(x, header_height), Vec2::new(x, height)]);
    }

    node.parts[0].x = 0.0;
    node.parts[0].y = 0.0;
    node.parts[0].width = width;
    for (i, row) in rows.iter().enumerate() {
        for (j, &index) in row.iter().enumerate() {
            let cell = &mut node.parts[index];
            cell.x = j as f32 * cell_width;
            cell.y = header_height + i as f32 * cell_height;
            cell.width = cell_width;
        }
    }
    node.parts.retain(|p| !is_break(p));
}

/// Lollipop/socket head: a small fixed square with the label compartments
/// hung below (TB) or beside (LR) the icon.
fn size_labelled_icon(config: &Config, node: &mut LayoutedNode) {
    node.width = config.font_size * LABELLED_ICON_SIZE_FACTOR;
    node.height = config.font_size * LABELLED_ICON_SIZE_FACTOR;
    node.dividers.clear();
    let lr = config.direction == Direction::LeftRight;
    let mut y = if lr {
        node.height - config.padding
    } else {
        -node.height / 2.0
    };
    let width = node.width;
    for part in &mut node.parts {
        if lr {
            part.x = width / 2.0 - part.width / 2.0;
        } else {
            part.x = width / 2.0 + config.padding / 2.0;
        }
        part.y = y;
        y += part.height;
    }
}

fn size_icon(config: &Config, node: &mut LayoutedNode) {
    node.parts.clear();
    node.dividers.clear();
    node.width = config.font_size * ICON_SIZE_FACTOR;
    node.height = config.font_size * ICON_SIZE_FACTOR;
}

fn size_sync(config: &Config, node: &mut LayoutedNode) {
    node.parts.clear();
    node.dividers.clear();
    if config.direction == Direction::LeftRight {
        node.width = config.line_width * 3.0;
        node.height = config.font_size * 5.0;
    } else {
        node.width = config.font_size * 5.0;
        node.height = config.line_width * 3.0;
    }
}

fn size_hidden(node: &mut LayoutedNode) {
    node.parts.clear();
    node.dividers.clear();
    node.width = 1.0;
    node.height = 1.0;
}
