use serde::{Deserialize, Serialize};

/// 2-D point or offset. All coordinates in the engine are diagram units
/// (CSS-pixel sized, but nothing here assumes a screen).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn manhattan(self, other: Vec2) -> f32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// Axis-aligned obstacle region. `left <= right` and `top <= bottom`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Rect {
    /// Rectangle of a node box (center plus half extents) inflated by `margin`.
    pub fn around(center: Vec2, width: f32, height: f32, margin: f32) -> Self {
        Self {
            left: center.x - width / 2.0 - margin,
            right: center.x + width / 2.0 + margin,
            top: center.y - height / 2.0 - margin,
            bottom: center.y + height / 2.0 + margin,
        }
    }

    /// Open-interval containment: points on the boundary do not count as
    /// inside, so routing may hug an obstacle edge.
    pub fn contains_open(&self, p: Vec2) -> bool {
        p.x > self.left && p.x < self.right && p.y > self.top && p.y < self.bottom
    }
}

/// Total Manhattan length of a polyline.
pub fn path_length(path: &[Vec2]) -> f32 {
    path.windows(2).map(|pair| pair[0].manhattan(pair[1])).sum()
}

/// Drop interior points that are colinear with their neighbours. Three
/// consecutive points sharing an x or a y collapse to the outer two.
pub fn simplify(path: &[Vec2]) -> Vec<Vec2> {
    if path.len() <= 2 {
        return path.to_vec();
    }
    let mut out: Vec<Vec2> = vec![path[0]];
    for i in 1..path.len() - 1 {
        let a = out[out.len() - 1];
        let b = path[i];
        let c = path[i + 1];
        if (a.x == b.x && b.x == c.x) || (a.y == b.y && b.y == c.y) {
            continue;
        }
        out.push(b);
    }
    out.push(path[path.len() - 1]);
    out
}
