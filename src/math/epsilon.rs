//! Tolerance-based predicates shared by the boolean engine.
//!
//! Every comparison the sweep makes goes through an [`Epsilon`] value so that
//! near-equal coordinates are treated as identical. A badly chosen epsilon does
//! not raise errors; it silently changes topological decisions (merging points
//! that should stay apart, or fragmenting polygons into slivers).

use std::cmp::Ordering;

use super::Point2;

/// Default number of decimal digits of precision.
pub const DEFAULT_PRECISION: i32 = 5;

/// Position of an intersection point along one of the intersected segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Along {
    /// Before the segment start.
    Before,
    /// At the segment start.
    AtStart,
    /// Strictly between start and end.
    Inside,
    /// At the segment end.
    AtEnd,
    /// After the segment end.
    After,
}

/// Result of intersecting two non-parallel lines.
#[derive(Debug, Clone, Copy)]
pub struct LineIntersection {
    pub along_a: Along,
    pub along_b: Along,
    pub point: Point2,
}

/// Floating point tolerance for point and segment coincidence tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Epsilon {
    eps: f64,
}

impl Default for Epsilon {
    fn default() -> Self {
        Self::from_precision(DEFAULT_PRECISION)
    }
}

impl Epsilon {
    /// Creates a tolerance with the given absolute value.
    #[must_use]
    pub fn new(eps: f64) -> Self {
        Self { eps }
    }

    /// Creates a tolerance of `10^-precision`.
    #[must_use]
    pub fn from_precision(precision: i32) -> Self {
        Self {
            eps: 10f64.powi(-precision),
        }
    }

    /// The raw tolerance value.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.eps
    }

    /// `true` if `pt` lies above `left -> right` or on it.
    #[must_use]
    pub fn point_above_or_on_line(&self, pt: &Point2, left: &Point2, right: &Point2) -> bool {
        (right.x - left.x) * (pt.y - left.y) - (right.y - left.y) * (pt.x - left.x) >= -self.eps
    }

    /// `true` if `p` lies strictly between `left` and `right`.
    ///
    /// `p` is assumed to be collinear with the segment; the endpoints
    /// themselves are not "between".
    #[must_use]
    pub fn point_between(&self, p: &Point2, left: &Point2, right: &Point2) -> bool {
        let d_py_ly = p.y - left.y;
        let d_rx_lx = right.x - left.x;
        let d_px_lx = p.x - left.x;
        let d_ry_ly = right.y - left.y;

        let dot = d_px_lx * d_rx_lx + d_py_ly * d_ry_ly;
        if dot < self.eps {
            return false;
        }

        let sqlen = d_rx_lx * d_rx_lx + d_ry_ly * d_ry_ly;
        dot - sqlen <= -self.eps
    }

    #[must_use]
    pub fn points_same_x(&self, a: &Point2, b: &Point2) -> bool {
        (a.x - b.x).abs() < self.eps
    }

    #[must_use]
    pub fn points_same_y(&self, a: &Point2, b: &Point2) -> bool {
        (a.y - b.y).abs() < self.eps
    }

    /// `true` iff both coordinates differ by less than epsilon.
    #[must_use]
    pub fn points_same(&self, a: &Point2, b: &Point2) -> bool {
        self.points_same_x(a, b) && self.points_same_y(a, b)
    }

    /// Sweep order: by x, then by y, with coincident coordinates equal.
    #[must_use]
    pub fn points_compare(&self, a: &Point2, b: &Point2) -> Ordering {
        if self.points_same_x(a, b) {
            if self.points_same_y(a, b) {
                Ordering::Equal
            } else if a.y < b.y {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        } else if a.x < b.x {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    }

    #[must_use]
    pub fn points_collinear(&self, a: &Point2, b: &Point2, c: &Point2) -> bool {
        let dx1 = a.x - b.x;
        let dy1 = a.y - b.y;
        let dx2 = b.x - c.x;
        let dy2 = b.y - c.y;
        (dx1 * dy2 - dx2 * dy1).abs() < self.eps
    }

    /// Intersects the infinite lines through `a0 -> a1` and `b0 -> b1`.
    ///
    /// Returns `None` when the lines are parallel or coincident. Otherwise the
    /// result classifies where the crossing falls along each segment.
    #[must_use]
    pub fn lines_intersect(
        &self,
        a0: &Point2,
        a1: &Point2,
        b0: &Point2,
        b1: &Point2,
    ) -> Option<LineIntersection> {
        let adx = a1.x - a0.x;
        let ady = a1.y - a0.y;
        let bdx = b1.x - b0.x;
        let bdy = b1.y - b0.y;

        let axb = adx * bdy - ady * bdx;
        if axb.abs() < self.eps {
            return None;
        }

        let dx = a0.x - b0.x;
        let dy = a0.y - b0.y;

        let a = (bdx * dy - bdy * dx) / axb;
        let b = (adx * dy - ady * dx) / axb;

        Some(LineIntersection {
            along_a: self.classify_along(a),
            along_b: self.classify_along(b),
            point: Point2::new(a0.x + a * adx, a0.y + a * ady),
        })
    }

    fn classify_along(&self, t: f64) -> Along {
        if t <= -self.eps {
            Along::Before
        } else if t < self.eps {
            Along::AtStart
        } else if t - 1.0 <= -self.eps {
            Along::Inside
        } else if t - 1.0 < self.eps {
            Along::AtEnd
        } else {
            Along::After
        }
    }
}
