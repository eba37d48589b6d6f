//! Association label placement. Each label anchors at the path point next to
//! its node and is pushed into one of four quadrants around that node,
//! flipping across the diagram's primary axis when the opposite end of the
//! path would crowd it.

use crate::config::{Config, Direction};
use crate::geometry::Vec2;
use crate::measure::{FontStyle, Measurer};
use crate::model::Label;

/// Quadrants are numbered clockwise from upper-left: 1 upper-left,
/// 2 upper-right, 3 lower-right, 4 lower-left, relative to the node center.
pub(crate) type Quadrant = u8;

/// Classify `point` relative to `center`. Returns `None` when the point lies
/// exactly on one of the axes; callers keep their previous value then.
pub(crate) fn quadrant(point: Vec2, center: Vec2) -> Option<Quadrant> {
    if point.x < center.x && point.y < center.y {
        return Some(1);
    }
    if point.x > center.x && point.y < center.y {
        return Some(2);
    }
    if point.x > center.x && point.y > center.y {
        return Some(3);
    }
    if point.x < center.x && point.y > center.y {
        return Some(4);
    }
    None
}

/// Flip the label quadrant when the path's opposite endpoint falls in the
/// same quadrant, to keep the label clear of a bent line. The flip axis
/// follows the diagram direction: horizontal for left-to-right layouts,
/// vertical for top-to-bottom.
pub(crate) fn adjust_quadrant(
    quadrant: Quadrant,
    point: Vec2,
    opposite: Vec2,
    direction: Direction,
) -> Quadrant {
    if opposite.x == point.x || opposite.y == point.y {
        return quadrant;
    }
    const FLIP_HORIZONTAL: [Quadrant; 4] = [4, 3, 2, 1];
    const FLIP_VERTICAL: [Quadrant; 4] = [2, 1, 4, 3];
    let opposite_quadrant = if opposite.y < point.y {
        if opposite.x < point.x { 2 } else { 1 }
    } else if opposite.x < point.x {
        3
    } else {
        4
    };
    if opposite_quadrant == quadrant {
        return match direction {
            Direction::LeftRight => FLIP_HORIZONTAL[(quadrant - 1) as usize],
            Direction::TopBottom => FLIP_VERTICAL[(quadrant - 1) as usize],
        };
    }
    quadrant
}

/// Compute a label's box at `point` in the given quadrant. Backticks split
/// the text into lines. An absent text collapses to a zero-size box pinned
/// at the point.
pub(crate) fn place_label(
    text: Option<&str>,
    point: Vec2,
    quadrant: Quadrant,
    measurer: &dyn Measurer,
    config: &Config,
) -> Label {
    let Some(text) = text.filter(|t| !t.is_empty()) else {
        return Label {
            text: None,
            x: point.x,
            y: point.y,
            width: 0.0,
            height: 0.0,
        };
    };
    let lines: Vec<&str> = text.split('`').collect();
    let width = lines.iter().fold(0.0f32, |acc, line| {
        acc.max(measurer.text_width(line, &config.font, config.font_size, FontStyle::NORMAL))
    });
    let height = config.font_size * lines.len() as f32;
    let x = if quadrant == 1 || quadrant == 4 {
        point.x + config.padding
    } else {
        point.x - width - config.padding
    };
    let y = if quadrant == 3 || quadrant == 4 {
        point.y + config.padding
    } else {
        point.y - height - config.padding
    };
    Label {
        text: Some(text.to_string()),
        x,
        y,
        width,
        height,
    }
}
