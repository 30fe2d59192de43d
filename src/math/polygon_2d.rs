use super::{orient_2d, Point2, Vector2, TOLERANCE};

/// Computes the signed area of a closed polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Unsigned area of a closed polygon.
#[must_use]
pub fn area(points: &[Point2]) -> f64 {
    signed_area(points).abs()
}

/// Even-odd point-in-polygon test. Points on the boundary may go either way.
#[must_use]
pub fn point_in_polygon(pt: &Point2, points: &[Point2]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = &points[i];
        let pj = &points[j];
        if (pi.y > pt.y) != (pj.y > pt.y) {
            let x_cross = pi.x + (pt.y - pi.y) / (pj.y - pi.y) * (pj.x - pi.x);
            if pt.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Arithmetic mean of the points, or the origin for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average(points: &[Point2]) -> Point2 {
    if points.is_empty() {
        return Point2::origin();
    }
    let sum = points
        .iter()
        .fold(Vector2::zeros(), |acc, p| acc + p.coords);
    Point2::from(sum / points.len() as f64)
}

/// How consecutive edges of a closed polygon turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnClass {
    /// Every non-degenerate turn goes left.
    Left,
    /// Every non-degenerate turn goes right.
    Right,
    /// Both left and right turns occur.
    Mixed,
    /// All points are collinear (or fewer than three).
    Degenerate,
}

/// Classifies the turns taken at every vertex of a closed polygon.
#[must_use]
pub fn classify_turns(points: &[Point2]) -> TurnClass {
    let n = points.len();
    if n < 3 {
        return TurnClass::Degenerate;
    }
    let mut left = false;
    let mut right = false;
    for i in 0..n {
        let a = &points[i];
        let b = &points[(i + 1) % n];
        let c = &points[(i + 2) % n];
        let o = orient_2d(a, b, c);
        if o > TOLERANCE {
            left = true;
        } else if o < -TOLERANCE {
            right = true;
        }
    }
    match (left, right) {
        (true, true) => TurnClass::Mixed,
        (true, false) => TurnClass::Left,
        (false, true) => TurnClass::Right,
        (false, false) => TurnClass::Degenerate,
    }
}

/// Drops consecutive points (including the wrap-around pair) closer than `tol`.
#[must_use]
pub fn dedup_closed(points: &[Point2], tol: f64) -> Vec<Point2> {
    let mut out: Vec<Point2> = Vec::with_capacity(points.len());
    for p in points {
        if out.last().is_some_and(|q| (p - q).norm() <= tol) {
            continue;
        }
        out.push(*p);
    }
    while out.len() > 1 {
        match (out.first(), out.last()) {
            (Some(f), Some(l)) if (f - l).norm() <= tol => {
                out.pop();
            }
            _ => break,
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn unit_square() -> Vec<Point2> {
        vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)]
    }

    #[test]
    fn signed_area_follows_winding() {
        let mut pts = unit_square();
        assert!((signed_area(&pts) - 1.0).abs() < TOLERANCE);
        pts.reverse();
        assert!((signed_area(&pts) + 1.0).abs() < TOLERANCE);
        assert!((area(&pts) - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn signed_area_degenerate() {
        assert!(signed_area(&[p(0.0, 0.0), p(1.0, 0.0)]).abs() < TOLERANCE);
        assert!(signed_area(&[]).abs() < TOLERANCE);
    }

    #[test]
    fn point_in_square() {
        let sq = unit_square();
        assert!(point_in_polygon(&p(0.5, 0.5), &sq));
        assert!(!point_in_polygon(&p(1.5, 0.5), &sq));
        assert!(!point_in_polygon(&p(0.5, -0.1), &sq));
    }

    #[test]
    fn point_in_concave_notch() {
        // U shape, the notch is outside
        let u = vec![
            p(0.0, 0.0),
            p(3.0, 0.0),
            p(3.0, 3.0),
            p(2.0, 3.0),
            p(2.0, 1.0),
            p(1.0, 1.0),
            p(1.0, 3.0),
            p(0.0, 3.0),
        ];
        assert!(!point_in_polygon(&p(1.5, 2.0), &u));
        assert!(point_in_polygon(&p(0.5, 2.0), &u));
        assert!(point_in_polygon(&p(1.5, 0.5), &u));
    }

    #[test]
    fn average_of_square() {
        let c = average(&unit_square());
        assert!((c.x - 0.5).abs() < TOLERANCE);
        assert!((c.y - 0.5).abs() < TOLERANCE);
        assert_eq!(average(&[]), Point2::origin());
    }

    #[test]
    fn turn_classification() {
        let sq = unit_square();
        assert_eq!(classify_turns(&sq), TurnClass::Left);
        let mut rev = sq.clone();
        rev.reverse();
        assert_eq!(classify_turns(&rev), TurnClass::Right);
        let arrow = vec![p(0.0, 0.0), p(2.0, 1.0), p(0.0, 2.0), p(1.0, 1.0)];
        assert_eq!(classify_turns(&arrow), TurnClass::Mixed);
        let line = vec![p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0)];
        assert_eq!(classify_turns(&line), TurnClass::Degenerate);
    }

    #[test]
    fn dedup_drops_repeats_and_closing_point() {
        let pts = vec![
            p(0.0, 0.0),
            p(0.0, 0.0),
            p(1.0, 0.0),
            p(1.0, 1.0),
            p(0.0, 0.0),
        ];
        let out = dedup_closed(&pts, 1e-9);
        assert_eq!(out.len(), 3);
    }
}
