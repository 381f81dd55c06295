//! Geometric predicates for orthogonal polylines

use super::types::{BoundingBox, Point};

/// Test whether the segment `a`-`b` overlaps `rect`.
///
/// Compares the segment's bounding box against the rectangle. For the
/// axis-aligned segments this router produces, that box is the segment's exact
/// footprint. Touching an edge is not an overlap.
pub fn segment_intersects_rect(a: Point, b: Point, rect: &BoundingBox) -> bool {
    let min_x = a.x.min(b.x);
    let max_x = a.x.max(b.x);
    let min_y = a.y.min(b.y);
    let max_y = a.y.max(b.y);

    min_x < rect.right() && max_x > rect.x && min_y < rect.bottom() && max_y > rect.y
}

/// Sum of the axis-aligned lengths of every segment
pub fn manhattan_length(path: &[Point]) -> f64 {
    path.windows(2)
        .map(|w| (w[1].x - w[0].x).abs() + (w[1].y - w[0].y).abs())
        .sum()
}

/// True when every consecutive pair shares exactly one coordinate
pub fn is_orthogonal(path: &[Point]) -> bool {
    path.windows(2)
        .all(|w| (w[0].x == w[1].x) != (w[0].y == w[1].y))
}

/// Drop consecutive duplicates and interior points lying on a straight run,
/// including the tips of zero-width spikes. Removals cascade, so the result
/// has no duplicate or collinear triple left. The endpoints are always kept.
pub fn simplify(path: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(path.len());
    for &point in path {
        out.push(point);
        loop {
            let n = out.len();
            if n >= 2 && out[n - 1] == out[n - 2] {
                out.pop();
            } else if n >= 3 && collinear(out[n - 3], out[n - 2], out[n - 1]) {
                out.remove(n - 2);
            } else {
                break;
            }
        }
    }
    out
}

fn collinear(a: Point, b: Point, c: Point) -> bool {
    (a.x == b.x && b.x == c.x) || (a.y == b.y && b.y == c.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> BoundingBox {
        BoundingBox::new(50.0, 0.0, 100.0, 100.0)
    }

    #[test]
    fn test_horizontal_segment_through_rect() {
        assert!(segment_intersects_rect(
            Point::new(0.0, 50.0),
            Point::new(200.0, 50.0),
            &rect()
        ));
    }

    #[test]
    fn test_segment_above_rect() {
        assert!(!segment_intersects_rect(
            Point::new(0.0, -10.0),
            Point::new(200.0, -10.0),
            &rect()
        ));
    }

    #[test]
    fn test_segment_along_edge_does_not_intersect() {
        assert!(!segment_intersects_rect(
            Point::new(0.0, 0.0),
            Point::new(200.0, 0.0),
            &rect()
        ));
    }

    #[test]
    fn test_segment_ending_inside() {
        assert!(segment_intersects_rect(
            Point::new(60.0, -20.0),
            Point::new(60.0, 10.0),
            &rect()
        ));
    }

    #[test]
    fn test_reversed_segment() {
        assert!(segment_intersects_rect(
            Point::new(200.0, 50.0),
            Point::new(0.0, 50.0),
            &rect()
        ));
    }

    #[test]
    fn test_manhattan_length() {
        let path = vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(-5.0, 10.0),
        ];
        assert_eq!(manhattan_length(&path), 15.0);
        assert_eq!(manhattan_length(&path[..1]), 0.0);
    }

    #[test]
    fn test_is_orthogonal() {
        assert!(is_orthogonal(&[
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0)
        ]));
        assert!(!is_orthogonal(&[Point::new(0.0, 0.0), Point::new(10.0, 10.0)]));
        assert!(!is_orthogonal(&[Point::new(1.0, 1.0), Point::new(1.0, 1.0)]));
    }

    #[test]
    fn test_simplify_collapses_straight_runs() {
        let path = vec![
            Point::new(0.0, 50.0),
            Point::new(30.0, 50.0),
            Point::new(30.0, 50.0),
            Point::new(170.0, 50.0),
            Point::new(200.0, 50.0),
        ];
        assert_eq!(
            simplify(&path),
            vec![Point::new(0.0, 50.0), Point::new(200.0, 50.0)]
        );
    }

    #[test]
    fn test_simplify_keeps_corners() {
        let path = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        ];
        assert_eq!(simplify(&path), path);
    }

    #[test]
    fn test_simplify_removes_spikes() {
        // A detour that collapsed onto the straight line leaves a spike
        let path = vec![
            Point::new(100.0, 25.0),
            Point::new(180.0, 25.0),
            Point::new(180.0, -10.0),
            Point::new(180.0, 25.0),
            Point::new(470.0, 25.0),
            Point::new(500.0, 25.0),
        ];
        assert_eq!(
            simplify(&path),
            vec![Point::new(100.0, 25.0), Point::new(500.0, 25.0)]
        );
    }
}
