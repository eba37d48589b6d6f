//! Orthogonal edge routing: port/ray selection on shape boundaries, a
//! visibility-grid router with deterministic A*, and a best-of-four side
//! pairing selector.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::config::Direction;
use crate::geometry::{Rect, Vec2, path_length, simplify};

/// Score bonus for the side pairing aligned with the diagram direction.
const DIRECTION_BIAS: f32 = 1000.0;
/// Obstacle edge coordinates are merged at this resolution when building the
/// routing grid.
const GRID_SNAP: f32 = 10.0;
/// Integer cost multiplier so A* orders f32 distances exactly.
const ASTAR_COST_SCALE: f32 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

/// The four side pairings tried by the best-route selector, in tie-break
/// order.
const SIDE_PAIRS: [(Side, Side); 4] = [
    (Side::Right, Side::Left),
    (Side::Left, Side::Right),
    (Side::Bottom, Side::Top),
    (Side::Top, Side::Bottom),
];

/// Boundary point of a `size`-sized box centered at `center`, on `side`.
fn port(center: Vec2, size: (f32, f32), side: Side) -> Vec2 {
    let (w, h) = size;
    match side {
        Side::Left => Vec2::new(center.x - w / 2.0, center.y),
        Side::Right => Vec2::new(center.x + w / 2.0, center.y),
        Side::Top => Vec2::new(center.x, center.y - h / 2.0),
        Side::Bottom => Vec2::new(center.x, center.y + h / 2.0),
    }
}

/// Port pushed outward along the side's normal so routing starts clear of
/// the shape's own footprint.
fn ray(center: Vec2, size: (f32, f32), side: Side, margin: f32) -> Vec2 {
    let mut p = port(center, size, side);
    match side {
        Side::Left => p.x -= margin,
        Side::Right => p.x += margin,
        Side::Top => p.y -= margin,
        Side::Bottom => p.y += margin,
    }
    p
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct PortSelection {
    pub(crate) start_port: Vec2,
    pub(crate) end_port: Vec2,
    pub(crate) start_side: Side,
    pub(crate) end_side: Side,
}

/// Direction-biased port choice: Manhattan distance between ports, with the
/// pairing aligned to the diagram direction favored by a large constant.
/// First minimum wins, so the bias only breaks ties when used standalone.
pub(crate) fn choose_ports(
    a_center: Vec2,
    a_size: (f32, f32),
    b_center: Vec2,
    b_size: (f32, f32),
    direction: Direction,
) -> PortSelection {
    let favored = match direction {
        Direction::LeftRight => (Side::Right, Side::Left),
        Direction::TopBottom => (Side::Bottom, Side::Top),
    };
    let mut best: Option<(f32, PortSelection)> = None;
    for (start_side, end_side) in SIDE_PAIRS {
        let start_port = port(a_center, a_size, start_side);
        let end_port = port(b_center, b_size, end_side);
        let mut score = start_port.manhattan(end_port);
        if (start_side, end_side) == favored {
            score -= DIRECTION_BIAS;
        }
        if best.as_ref().is_none_or(|(s, _)| score < *s) {
            best = Some((
                score,
                PortSelection {
                    start_port,
                    end_port,
                    start_side,
                    end_side,
                },
            ));
        }
    }
    // SIDE_PAIRS is non-empty, so best is always set.
    best.map(|(_, sel)| sel).unwrap_or(PortSelection {
        start_port: a_center,
        end_port: b_center,
        start_side: Side::Right,
        end_side: Side::Left,
    })
}

/// An axis-aligned segment crosses a rectangle when it runs strictly between
/// two opposite edges and overlaps the perpendicular extent.
fn segment_crosses(p1: Vec2, p2: Vec2, r: &Rect) -> bool {
    if p1.x == p2.x {
        let x = p1.x;
        if x <= r.left || x >= r.right {
            return false;
        }
        let (min_y, max_y) = (p1.y.min(p2.y), p1.y.max(p2.y));
        !(max_y <= r.top || min_y >= r.bottom)
    } else if p1.y == p2.y {
        let y = p1.y;
        if y <= r.top || y >= r.bottom {
            return false;
        }
        let (min_x, max_x) = (p1.x.min(p2.x), p1.x.max(p2.x));
        !(max_x <= r.left || min_x >= r.right)
    } else {
        false
    }
}

fn crosses_any(p1: Vec2, p2: Vec2, obstacles: &[Rect]) -> bool {
    obstacles.iter().any(|r| segment_crosses(p1, p2, r))
}

fn snap(value: f32) -> f32 {
    (value * GRID_SNAP).round() / GRID_SNAP
}

fn sorted_unique(mut values: Vec<f32>) -> Vec<f32> {
    values.sort_by(|a, b| a.total_cmp(b));
    values.dedup();
    values
}

/// Candidate routing vertices: every (x, y) combination of the distinct
/// coordinates contributed by the two endpoints and the obstacle edges.
struct Grid {
    xs: Vec<f32>,
    ys: Vec<f32>,
    blocked: Vec<bool>,
    neighbors: Vec<Vec<u32>>,
}

impl Grid {
    fn build(start: Vec2, end: Vec2, obstacles: &[Rect]) -> Self {
        let mut xs = vec![start.x, end.x];
        let mut ys = vec![start.y, end.y];
        for r in obstacles {
            xs.push(snap(r.left));
            xs.push(snap(r.right));
            ys.push(snap(r.top));
            ys.push(snap(r.bottom));
        }
        let xs = sorted_unique(xs);
        let ys = sorted_unique(ys);
        let count = xs.len() * ys.len();

        let mut grid = Grid {
            blocked: vec![false; count],
            neighbors: vec![Vec::new(); count],
            xs,
            ys,
        };
        for xi in 0..grid.xs.len() {
            for yi in 0..grid.ys.len() {
                let id = grid.id(xi, yi);
                let p = grid.point(id);
                grid.blocked[id as usize] = obstacles.iter().any(|r| r.contains_open(p));
            }
        }
        grid.connect(obstacles);
        grid
    }

    fn id(&self, xi: usize, yi: usize) -> u32 {
        (xi * self.ys.len() + yi) as u32
    }

    fn point(&self, id: u32) -> Vec2 {
        let xi = id as usize / self.ys.len();
        let yi = id as usize % self.ys.len();
        Vec2::new(self.xs[xi], self.ys[yi])
    }

    /// Connect each open vertex to its nearest open vertex in the same column
    /// and row, when the straight segment between them stays clear.
    fn connect(&mut self, obstacles: &[Rect]) {
        for xi in 0..self.xs.len() {
            let column: Vec<u32> = (0..self.ys.len())
                .map(|yi| self.id(xi, yi))
                .filter(|id| !self.blocked[*id as usize])
                .collect();
            self.connect_run(&column, obstacles);
        }
        for yi in 0..self.ys.len() {
            let row: Vec<u32> = (0..self.xs.len())
                .map(|xi| self.id(xi, yi))
                .filter(|id| !self.blocked[*id as usize])
                .collect();
            self.connect_run(&row, obstacles);
        }
    }

    fn connect_run(&mut self, run: &[u32], obstacles: &[Rect]) {
        for pair in run.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if !crosses_any(self.point(a), self.point(b), obstacles) {
                self.neighbors[a as usize].push(b);
                self.neighbors[b as usize].push(a);
            }
        }
    }

    fn vertex_at(&self, p: Vec2) -> Option<u32> {
        let xi = self.xs.iter().position(|x| *x == p.x)?;
        let yi = self.ys.iter().position(|y| *y == p.y)?;
        let id = self.id(xi, yi);
        (!self.blocked[id as usize]).then_some(id)
    }
}

fn scaled_manhattan(a: Vec2, b: Vec2) -> u64 {
    (a.manhattan(b) * ASTAR_COST_SCALE).round() as u64
}

/// A* over the visibility grid. Ties on f-score resolve to the earliest
/// discovered vertex so the result is reproducible across runs.
fn shortest_path(grid: &Grid, start: u32, goal: u32) -> Option<Vec<Vec2>> {
    let count = grid.blocked.len();
    let mut g_score = vec![u64::MAX; count];
    let mut came_from = vec![u32::MAX; count];
    let mut closed = vec![false; count];
    let mut open: BinaryHeap<Reverse<(u64, u64, u32)>> = BinaryHeap::new();
    let mut sequence = 0u64;

    let goal_point = grid.point(goal);
    g_score[start as usize] = 0;
    open.push(Reverse((
        scaled_manhattan(grid.point(start), goal_point),
        sequence,
        start,
    )));

    while let Some(Reverse((_, _, current))) = open.pop() {
        if closed[current as usize] {
            continue;
        }
        closed[current as usize] = true;
        if current == goal {
            let mut path = Vec::new();
            let mut cursor = current;
            loop {
                path.push(grid.point(cursor));
                let prev = came_from[cursor as usize];
                if prev == u32::MAX {
                    break;
                }
                cursor = prev;
            }
            path.reverse();
            return Some(simplify(&path));
        }
        let current_point = grid.point(current);
        for &next in &grid.neighbors[current as usize] {
            if closed[next as usize] {
                continue;
            }
            let tentative =
                g_score[current as usize] + scaled_manhattan(current_point, grid.point(next));
            if tentative < g_score[next as usize] {
                g_score[next as usize] = tentative;
                came_from[next as usize] = current;
                sequence += 1;
                open.push(Reverse((
                    tentative + scaled_manhattan(grid.point(next), goal_point),
                    sequence,
                    next,
                )));
            }
        }
    }
    None
}

/// Route an axis-aligned path between two ray points, avoiding obstacles.
///
/// When the visibility graph is disconnected the result degrades through a
/// fallback ladder: the two natural L-elbows, then a straight elbow along
/// the larger displacement axis that may overlap an obstacle.
pub(crate) fn route_orthogonal(start: Vec2, end: Vec2, obstacles: &[Rect]) -> Vec<Vec2> {
    let grid = Grid::build(start, end, obstacles);
    if let (Some(from), Some(to)) = (grid.vertex_at(start), grid.vertex_at(end))
        && let Some(path) = shortest_path(&grid, from, to)
    {
        return path;
    }

    let via_start = Vec2::new(start.x, end.y);
    if !crosses_any(start, via_start, obstacles) && !crosses_any(via_start, end, obstacles) {
        return simplify(&[start, via_start, end]);
    }
    let via_end = Vec2::new(end.x, start.y);
    if !crosses_any(start, via_end, obstacles) && !crosses_any(via_end, end, obstacles) {
        return simplify(&[start, via_end, end]);
    }
    if (start.x - end.x).abs() < (start.y - end.y).abs() {
        simplify(&[start, via_start, end])
    } else {
        simplify(&[start, via_end, end])
    }
}

/// Route a single direction-biased side pairing. Returns the full path from
/// start port to end port.
pub(crate) fn route_with_rays(
    a_center: Vec2,
    a_size: (f32, f32),
    b_center: Vec2,
    b_size: (f32, f32),
    direction: Direction,
    obstacles: &[Rect],
    margin: f32,
) -> Vec<Vec2> {
    let selection = choose_ports(a_center, a_size, b_center, b_size, direction);
    let start_ray = ray(a_center, a_size, selection.start_side, margin);
    let end_ray = ray(b_center, b_size, selection.end_side, margin);
    let mid = route_orthogonal(start_ray, end_ray, obstacles);
    let mut full = vec![selection.start_port, start_ray];
    full.extend(mid);
    full.push(end_ray);
    full.push(selection.end_port);
    simplify(&full)
}

/// Try all four side pairings through the router and keep the pairing with
/// the shortest total Manhattan length. Ties resolve to the earliest pairing
/// in `SIDE_PAIRS` order.
pub(crate) fn route_best(
    a_center: Vec2,
    a_size: (f32, f32),
    b_center: Vec2,
    b_size: (f32, f32),
    direction: Direction,
    obstacles: &[Rect],
    margin: f32,
) -> Vec<Vec2> {
    let mut best: Option<(f32, Vec<Vec2>)> = None;
    for (start_side, end_side) in SIDE_PAIRS {
        let start_port = port(a_center, a_size, start_side);
        let end_port = port(b_center, b_size, end_side);
        let start_ray = ray(a_center, a_size, start_side, margin);
        let end_ray = ray(b_center, b_size, end_side, margin);
        let mid = route_orthogonal(start_ray, end_ray, obstacles);
        let mut full = vec![start_port, start_ray];
        full.extend(mid);
        full.push(end_ray);
        full.push(end_port);
        let full = simplify(&full);
        let len = path_length(&full);
        if best.as_ref().is_none_or(|(b_len, _)| len < *b_len) {
            best = Some((len, full));
        }
    }
    match best {
        Some((_, path)) => path,
        None => route_with_rays(a_center, a_size, b_center, b_size, direction, obstacles, margin),
    }
}
