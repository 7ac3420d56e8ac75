use serde::{Deserialize, Serialize};

/// An integer position on the play field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// A point with floating precision, used for intersections.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointF {
    pub x: f64,
    pub y: f64,
}

impl PointF {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<Point> for PointF {
    fn from(p: Point) -> Self {
        Self::new(p.x as f64, p.y as f64)
    }
}

/// A line through `point` with the given `slope`.
///
/// A vertical line carries an infinite slope rather than being an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub point: PointF,
    pub slope: f64,
}

impl Line {
    pub const fn new(point: PointF, slope: f64) -> Self {
        Self { point, slope }
    }

    pub fn is_vertical(&self) -> bool {
        self.slope.is_infinite()
    }

    /// The line through `point` perpendicular to this one.
    pub fn perpendicular_through(&self, point: PointF) -> Line {
        Line::new(point, -1.0 / self.slope)
    }
}

/// The line through two points. A vertical segment yields an infinite slope.
pub fn line_through(p1: PointF, p2: PointF) -> Line {
    Line::new(p1, (p2.y - p1.y) / (p2.x - p1.x))
}

/// Where two lines cross, if they do.
///
/// Parallel lines (including two vertical ones) have no intersection.
pub fn intersect(a: &Line, b: &Line) -> Option<PointF> {
    let denominator = a.slope - b.slope;
    if denominator != 0.0 && denominator.is_finite() {
        let x = (a.slope * a.point.x - a.point.y - b.slope * b.point.x + b.point.y) / denominator;
        let y = a.slope * (x - a.point.x) + a.point.y;
        if x.is_finite() && y.is_finite() {
            return Some(PointF::new(x, y));
        }
    }
    intersect_by_substitution(a, b)
}

/// Fallback for when the algebraic solution is indeterminate: resolve one
/// vertical and one non-vertical line by substitution.
fn intersect_by_substitution(a: &Line, b: &Line) -> Option<PointF> {
    match (a.is_vertical(), b.is_vertical()) {
        (true, false) if b.slope.is_finite() => Some(PointF::new(
            a.point.x,
            b.slope * (a.point.x - b.point.x) + b.point.y,
        )),
        (false, true) if a.slope.is_finite() => Some(PointF::new(
            b.point.x,
            a.slope * (b.point.x - a.point.x) + a.point.y,
        )),
        _ => None,
    }
}

fn is_between(bound_a: f64, bound_b: f64, value: f64) -> bool {
    (bound_a <= value && value <= bound_b) || (bound_a >= value && value >= bound_b)
}

/// Closed-interval overlap. Bounds may be given in either order.
pub fn intervals_overlap(a: (f64, f64), b: (f64, f64)) -> bool {
    is_between(a.0, a.1, b.0)
        || is_between(a.0, a.1, b.1)
        || is_between(b.0, b.1, a.0)
        || is_between(b.0, b.1, a.1)
}

/// Separating axes of a polygon: for every edge, the perpendicular through
/// the edge's first point. Zero-length edges contribute nothing.
fn separating_axes(polygon: &[Point]) -> impl Iterator<Item = Line> + '_ {
    let n = polygon.len();
    (0..n).filter_map(move |i| {
        let from = polygon[i];
        let to = polygon[(i + 1) % n];
        if from == to {
            return None;
        }
        let edge = line_through(from.into(), to.into());
        Some(edge.perpendicular_through(from.into()))
    })
}

/// Projects every vertex onto `axis` and returns the covered range. The
/// range is measured in x along a non-vertical axis, in y along a vertical
/// one.
fn project(polygon: &[Point], axis: &Line) -> Option<(f64, f64)> {
    let along_x = axis.slope.is_finite();
    polygon
        .iter()
        .filter_map(|&vertex| intersect(axis, &axis.perpendicular_through(vertex.into())))
        .map(|foot| if along_x { foot.x } else { foot.y })
        .fold(None, |range, c| match range {
            None => Some((c, c)),
            Some((lo, hi)) => Some((f64::min(lo, c), f64::max(hi, c))),
        })
}

/// Separating axis test for two convex polygons given as ordered vertices.
///
/// Touching shapes overlap. A polygon with fewer than two vertices (not
/// generated yet, or deliberately empty) never overlaps anything.
pub fn convex_overlap(a: &[Point], b: &[Point]) -> bool {
    if a.len() < 2 || b.len() < 2 {
        return false;
    }

    separating_axes(b)
        .chain(separating_axes(a))
        .all(|axis| match (project(a, &axis), project(b, &axis)) {
            (Some(range_a), Some(range_b)) => intervals_overlap(range_a, range_b),
            // nothing landed on this axis, it can't separate anything
            _ => true,
        })
}

/// Smallest axis-aligned box holding every vertex, as `(min, max)`.
pub fn bounding_box(polygon: &[Point]) -> Option<(Point, Point)> {
    let first = *polygon.first()?;
    Some(polygon.iter().fold((first, first), |(lo, hi), p| {
        (
            Point::new(lo.x.min(p.x), lo.y.min(p.y)),
            Point::new(hi.x.max(p.x), hi.y.max(p.y)),
        )
    }))
}

/// Closed overlap of two boxes from [`bounding_box`].
pub fn boxes_overlap(a: (Point, Point), b: (Point, Point)) -> bool {
    a.0.x <= b.1.x && b.0.x <= a.1.x && a.0.y <= b.1.y && b.0.y <= a.1.y
}

/// Axis-aligned rectangle with its top-left corner at `origin`, clockwise.
pub fn rectangle(origin: Point, width: i32, height: i32) -> Vec<Point> {
    vec![
        origin,
        origin.offset(width, 0),
        origin.offset(width, height),
        origin.offset(0, height),
    ]
}
