//! Plane geometry used by the renderers. All lengths are in building units
//! (metres) unless a function says otherwise.

use serde::{Deserialize, Serialize};

pub const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn scale(self, factor: f64) -> Point {
        Point::new(self.x * factor, self.y * factor)
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Point) -> f64 {
        self.sub(other).length()
    }

    pub fn cross(self, other: Point) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }
}

/// Axis-aligned rectangle, `(x, y)` is the minimum corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub length: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, length: f64) -> Self {
        Self {
            x,
            y,
            width,
            length,
        }
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.length
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.length / 2.0)
    }

    pub fn area(&self) -> f64 {
        self.width * self.length
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.max_x(), self.y),
            Point::new(self.max_x(), self.max_y()),
            Point::new(self.x, self.max_y()),
        ]
    }

    pub fn inset(&self, amount: f64) -> Rect {
        let dx = amount.min(self.width / 2.0);
        let dy = amount.min(self.length / 2.0);
        Rect::new(
            self.x + dx,
            self.y + dy,
            self.width - 2.0 * dx,
            self.length - 2.0 * dy,
        )
    }

    /// Strict interior overlap; touching edges do not count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.max_x() - EPSILON
            && other.x < self.max_x() - EPSILON
            && self.y < other.max_y() - EPSILON
            && other.y < self.max_y() - EPSILON
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.max_x().min(other.max_x());
        let y1 = self.max_y().min(other.max_y());
        if x1 - x0 <= EPSILON || y1 - y0 <= EPSILON {
            return None;
        }
        Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = self.max_x().max(other.max_x());
        let y1 = self.max_y().max(other.max_y());
        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x - EPSILON
            && p.x <= self.max_x() + EPSILON
            && p.y >= self.y - EPSILON
            && p.y <= self.max_y() + EPSILON
    }
}

pub fn bounds(points: &[Point]) -> Option<Rect> {
    let first = points.first()?;
    let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        x0 = x0.min(p.x);
        y0 = y0.min(p.y);
        x1 = x1.max(p.x);
        y1 = y1.max(p.y);
    }
    Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
}

/// Shoelace area, always non-negative.
pub fn polygon_area(polygon: &[Point]) -> f64 {
    if polygon.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for (i, a) in polygon.iter().enumerate() {
        let b = polygon[(i + 1) % polygon.len()];
        sum += a.cross(b);
    }
    sum.abs() / 2.0
}

/// Area centroid; falls back to the vertex average for degenerate polygons.
pub fn polygon_centroid(polygon: &[Point]) -> Option<Point> {
    if polygon.is_empty() {
        return None;
    }
    let mut signed = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for (i, a) in polygon.iter().enumerate() {
        let b = polygon[(i + 1) % polygon.len()];
        let cross = a.cross(b);
        signed += cross;
        cx += (a.x + b.x) * cross;
        cy += (a.y + b.y) * cross;
    }
    if signed.abs() < EPSILON {
        let n = polygon.len() as f64;
        let sx: f64 = polygon.iter().map(|p| p.x).sum();
        let sy: f64 = polygon.iter().map(|p| p.y).sum();
        return Some(Point::new(sx / n, sy / n));
    }
    let area6 = 3.0 * signed;
    Some(Point::new(cx / area6, cy / area6))
}

/// Ray-casting point-in-polygon test.
pub fn point_in_polygon(p: Point, polygon: &[Point]) -> bool {
    let mut inside = false;
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[j];
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Unit direction, unit normal `(-dy, dx)` and length of a segment.
/// `None` when the segment is shorter than [`EPSILON`].
pub fn segment_frame(start: Point, end: Point) -> Option<(Point, Point, f64)> {
    let delta = end.sub(start);
    let len = delta.length();
    if !len.is_finite() || len < EPSILON {
        return None;
    }
    let dir = delta.scale(1.0 / len);
    let normal = Point::new(-dir.y, dir.x);
    Some((dir, normal, len))
}

/// Quadrilateral outline of a wall of thickness `t` centred on the segment:
/// `start + n*t/2, start - n*t/2, end - n*t/2, end + n*t/2`.
pub fn wall_quad(start: Point, end: Point, thickness: f64) -> Option<[Point; 4]> {
    let (_, normal, _) = segment_frame(start, end)?;
    let half = normal.scale(thickness / 2.0);
    Some([start.add(half), start.sub(half), end.sub(half), end.add(half)])
}

/// Point at distance `position` along the segment, clamped to `[0, len]`.
pub fn point_along(start: Point, end: Point, position: f64) -> Option<Point> {
    let (dir, _, len) = segment_frame(start, end)?;
    let distance = if position.is_finite() {
        position.clamp(0.0, len)
    } else {
        0.0
    };
    Some(start.add(dir.scale(distance)))
}

/// Distance from `p` to the infinite line through `a` and `b`.
pub fn distance_to_line(p: Point, a: Point, b: Point) -> f64 {
    match segment_frame(a, b) {
        Some((dir, _, _)) => p.sub(a).cross(dir).abs(),
        None => p.distance(a),
    }
}

/// Parameter along `a -> b` where the segment crosses the horizontal line
/// `y = level`, if it does.
pub fn cross_horizontal(a: Point, b: Point, level: f64) -> Option<f64> {
    if (a.y - level) * (b.y - level) > 0.0 || (a.y - b.y).abs() < EPSILON {
        return None;
    }
    let t = (level - a.y) / (b.y - a.y);
    Some(a.x + t * (b.x - a.x))
}

/// Parameter along `a -> b` where the segment crosses the vertical line
/// `x = level`, if it does.
pub fn cross_vertical(a: Point, b: Point, level: f64) -> Option<f64> {
    if (a.x - level) * (b.x - level) > 0.0 || (a.x - b.x).abs() < EPSILON {
        return None;
    }
    let t = (level - a.x) / (b.x - a.x);
    Some(a.y + t * (b.y - a.y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shoelace_area_of_square() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(5.0, 4.0),
            Point::new(0.0, 4.0),
        ];
        assert!((polygon_area(&square) - 20.0).abs() < 1e-9);
        let c = polygon_centroid(&square).unwrap();
        assert!((c.x - 2.5).abs() < 1e-9 && (c.y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn wall_quad_area_matches_length_times_thickness() {
        let start = Point::new(1.0, 2.0);
        let end = Point::new(7.0, 10.0);
        let quad = wall_quad(start, end, 0.3).unwrap();
        assert!((polygon_area(&quad) - 10.0 * 0.3).abs() < 1e-9);
    }

    #[test]
    fn degenerate_wall_has_no_quad() {
        let p = Point::new(3.0, 3.0);
        assert!(wall_quad(p, p, 0.2).is_none());
    }

    #[test]
    fn point_along_clamps_to_segment() {
        let start = Point::new(0.0, 0.0);
        let end = Point::new(4.0, 0.0);
        assert_eq!(point_along(start, end, 10.0), Some(end));
        assert_eq!(point_along(start, end, -2.0), Some(start));
        assert_eq!(point_along(start, end, 1.5), Some(Point::new(1.5, 0.0)));
    }

    #[test]
    fn rect_overlap_ignores_touching_edges() {
        let a = Rect::new(0.0, 0.0, 2.0, 2.0);
        let b = Rect::new(2.0, 0.0, 2.0, 2.0);
        let c = Rect::new(1.0, 1.0, 2.0, 2.0);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
    }

    #[test]
    fn point_in_polygon_l_shape() {
        let l = [
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 2.0),
            Point::new(2.0, 2.0),
            Point::new(2.0, 4.0),
            Point::new(0.0, 4.0),
        ];
        assert!(point_in_polygon(Point::new(1.0, 3.0), &l));
        assert!(!point_in_polygon(Point::new(3.0, 3.0), &l));
    }
}
