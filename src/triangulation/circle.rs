use crate::math::{orient_2d, Point2};

/// Relative slack applied to the in-circle test so cocircular points count as
/// outside and do not trigger endless flips.
const IN_CIRCLE_SLACK: f64 = 1e-10;

/// Circumscribed circle of a triangle.
#[derive(Debug, Clone, Copy)]
pub struct Circle {
    pub center: Point2,
    pub radius_sq: f64,
}

impl Circle {
    /// Circle through `a`, `b`, `c`.
    ///
    /// Returns `None` for collinear input.
    #[must_use]
    pub fn circumscribed(a: &Point2, b: &Point2, c: &Point2) -> Option<Self> {
        let d = 2.0 * orient_2d(a, b, c);
        if d.abs() < f64::EPSILON * (a.coords.norm_squared() + 1.0) {
            return None;
        }
        let bx = b.x - a.x;
        let by = b.y - a.y;
        let cx = c.x - a.x;
        let cy = c.y - a.y;
        let b_sq = bx * bx + by * by;
        let c_sq = cx * cx + cy * cy;
        let ux = (cy * b_sq - by * c_sq) / d;
        let uy = (bx * c_sq - cx * b_sq) / d;
        Some(Self {
            center: Point2::new(a.x + ux, a.y + uy),
            radius_sq: ux * ux + uy * uy,
        })
    }

    /// `true` if `p` lies strictly inside the circle.
    #[must_use]
    pub fn contains(&self, p: &Point2) -> bool {
        (p - self.center).norm_squared() < self.radius_sq * (1.0 - IN_CIRCLE_SLACK)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn right_triangle_circle_centered_on_hypotenuse() {
        let c = Circle::circumscribed(&p(0.0, 0.0), &p(2.0, 0.0), &p(0.0, 2.0)).unwrap();
        assert_relative_eq!(c.center.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(c.center.y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(c.radius_sq, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn cocircular_point_is_not_inside() {
        let c = Circle::circumscribed(&p(0.0, 0.0), &p(1.0, 0.0), &p(1.0, 1.0)).unwrap();
        assert!(!c.contains(&p(0.0, 1.0)));
        assert!(c.contains(&p(0.5, 0.5)));
        assert!(!c.contains(&p(3.0, 3.0)));
    }

    #[test]
    fn collinear_has_no_circle() {
        assert!(Circle::circumscribed(&p(0.0, 0.0), &p(1.0, 0.0), &p(2.0, 0.0)).is_none());
    }
}
