use serde::{Deserialize, Serialize};

/// Segments shorter than this on both axes are treated as a single point
const DEGENERATE_EPSILON: f64 = 1e-6;

/// Denominators below this mean the two segments are parallel
const PARALLEL_EPSILON: f64 = 1e-10;

/// A position on the schematic canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point { x, y }
    }
}

/// Euclidean distance between two points
pub fn point_distance(p: Point, q: Point) -> f64 {
    (p.x - q.x).hypot(p.y - q.y)
}

/// Distance from `p` to the segment [a, b] and the closest point on the segment.
///
/// The projection parameter is clamped to [0, 1], so points beyond either end
/// measure against that endpoint. A zero-length segment degrades to a plain
/// point distance against `a`.
pub fn point_to_segment_distance(p: Point, a: Point, b: Point) -> (f64, Point) {
    let dx = b.x - a.x;
    let dy = b.y - a.y;

    if dx.abs() < DEGENERATE_EPSILON && dy.abs() < DEGENERATE_EPSILON {
        return (point_distance(p, a), a);
    }

    let t = ((p.x - a.x) * dx + (p.y - a.y) * dy) / (dx * dx + dy * dy);
    let t = t.clamp(0.0, 1.0);

    let closest = Point::new(a.x + t * dx, a.y + t * dy);
    (point_distance(p, closest), closest)
}

/// Two primitives touch when their distance is within the tolerance radius
pub fn touches(distance: f64, tolerance: f64) -> bool {
    distance <= tolerance
}

/// True if `p` touches any segment of the polyline
pub fn polyline_touches(points: &[Point], p: Point, tolerance: f64) -> bool {
    match points {
        [] => false,
        [single] => touches(point_distance(*single, p), tolerance),
        _ => points.windows(2).any(|seg| {
            let (distance, _) = point_to_segment_distance(p, seg[0], seg[1]);
            touches(distance, tolerance)
        }),
    }
}

/// Proper crossing point of segments [a1, a2] and [b1, b2].
///
/// Returns `None` for parallel segments, for crossings outside the open
/// interior of either segment, and for crossings closer than
/// `endpoint_clearance` to any of the four endpoints (those are shared
/// vertices, not crossings).
pub fn segment_intersection(
    a1: Point,
    a2: Point,
    b1: Point,
    b2: Point,
    endpoint_clearance: f64,
) -> Option<Point> {
    let dx1 = a2.x - a1.x;
    let dy1 = a2.y - a1.y;
    let dx2 = b2.x - b1.x;
    let dy2 = b2.y - b1.y;

    let denominator = dx1 * dy2 - dy1 * dx2;
    if denominator.abs() < PARALLEL_EPSILON {
        return None;
    }

    let t1 = ((b1.x - a1.x) * dy2 - (b1.y - a1.y) * dx2) / denominator;
    let t2 = ((b1.x - a1.x) * dy1 - (b1.y - a1.y) * dx1) / denominator;

    if !(t1 > 0.0 && t1 < 1.0 && t2 > 0.0 && t2 < 1.0) {
        return None;
    }

    let crossing = Point::new(a1.x + t1 * dx1, a1.y + t1 * dy1);
    let min_endpoint_distance = [a1, a2, b1, b2]
        .iter()
        .map(|&end| point_distance(crossing, end))
        .fold(f64::INFINITY, f64::min);

    if min_endpoint_distance >= endpoint_clearance {
        Some(crossing)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_point_distance() {
        assert_eq!(point_distance(pt(0.0, 0.0), pt(3.0, 4.0)), 5.0);
        assert_eq!(point_distance(pt(2.0, 2.0), pt(2.0, 2.0)), 0.0);
    }

    #[test]
    fn test_point_to_segment_projection() {
        let (d, closest) = point_to_segment_distance(pt(5.0, 3.0), pt(0.0, 0.0), pt(10.0, 0.0));
        assert_eq!(d, 3.0);
        assert_eq!(closest, pt(5.0, 0.0));
    }

    #[test]
    fn test_point_to_segment_clamps_to_endpoints() {
        let (d, closest) = point_to_segment_distance(pt(-3.0, 4.0), pt(0.0, 0.0), pt(10.0, 0.0));
        assert_eq!(d, 5.0);
        assert_eq!(closest, pt(0.0, 0.0));

        let (d, closest) = point_to_segment_distance(pt(14.0, 3.0), pt(0.0, 0.0), pt(10.0, 0.0));
        assert_eq!(d, 5.0);
        assert_eq!(closest, pt(10.0, 0.0));
    }

    #[test]
    fn test_zero_length_segment_falls_back_to_point() {
        let (d, closest) = point_to_segment_distance(pt(3.0, 4.0), pt(0.0, 0.0), pt(0.0, 0.0));
        assert_eq!(d, 5.0);
        assert_eq!(closest, pt(0.0, 0.0));
    }

    #[test]
    fn test_touches_is_inclusive() {
        assert!(touches(10.0, 10.0));
        assert!(touches(0.0, 10.0));
        assert!(!touches(10.01, 10.0));
    }

    #[test]
    fn test_polyline_touches_interior_vertex_and_segment() {
        let line = [pt(0.0, 0.0), pt(100.0, 0.0), pt(100.0, 100.0)];
        assert!(polyline_touches(&line, pt(50.0, 2.0), 5.0));
        assert!(polyline_touches(&line, pt(103.0, 60.0), 5.0));
        assert!(!polyline_touches(&line, pt(50.0, 50.0), 5.0));
    }

    #[test]
    fn test_segment_intersection_crossing() {
        let crossing = segment_intersection(
            pt(0.0, 0.0),
            pt(10.0, 10.0),
            pt(0.0, 10.0),
            pt(10.0, 0.0),
            1.0,
        );
        assert_eq!(crossing, Some(pt(5.0, 5.0)));
    }

    #[test]
    fn test_segment_intersection_rejects_parallel_and_endpoints() {
        let parallel =
            segment_intersection(pt(0.0, 0.0), pt(10.0, 0.0), pt(0.0, 5.0), pt(10.0, 5.0), 1.0);
        assert!(parallel.is_none());

        // crossing sits 0.5 from the second segment's start, inside the clearance
        let near_end =
            segment_intersection(pt(0.0, 0.0), pt(10.0, 0.0), pt(5.0, -0.5), pt(5.0, 10.0), 1.0);
        assert!(near_end.is_none());
    }
}
