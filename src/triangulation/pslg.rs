use crate::math::polygon_2d::point_in_polygon;
use crate::math::Point2;

/// Planar straight-line graph handed to the triangulator.
///
/// The outer contour and every hole contour are closed loops without a
/// repeated closing point. Their edges, plus any extra `constraints`, are
/// preserved as triangle edges in the output.
#[derive(Debug, Clone, Default)]
pub struct Pslg {
    pub outer: Vec<Point2>,
    pub holes: Vec<Vec<Point2>>,
    pub constraints: Vec<(Point2, Point2)>,
}

impl Pslg {
    /// A PSLG made of a single simple polygon.
    #[must_use]
    pub fn from_polygon(outer: Vec<Point2>) -> Self {
        Self {
            outer,
            ..Self::default()
        }
    }

    /// Adds a hole contour.
    #[must_use]
    pub fn with_hole(mut self, hole: Vec<Point2>) -> Self {
        self.holes.push(hole);
        self
    }

    /// Adds a constrained interior segment.
    #[must_use]
    pub fn with_constraint(mut self, a: Point2, b: Point2) -> Self {
        self.constraints.push((a, b));
        self
    }

    /// Iterates over the outer contour followed by all holes.
    pub fn contours(&self) -> impl Iterator<Item = &[Point2]> {
        std::iter::once(self.outer.as_slice()).chain(self.holes.iter().map(Vec::as_slice))
    }

    /// Every input point, contours first, then constraint endpoints.
    pub fn points(&self) -> impl Iterator<Item = &Point2> {
        self.contours()
            .flat_map(<[Point2]>::iter)
            .chain(self.constraints.iter().flat_map(|(a, b)| [a, b]))
    }

    /// Even-odd containment over all contours.
    #[must_use]
    pub fn contains(&self, pt: &Point2) -> bool {
        self.contours()
            .filter(|c| point_in_polygon(pt, c))
            .count()
            % 2
            == 1
    }

    /// Axis-aligned bounds `(min, max)` of every input point.
    #[must_use]
    pub fn bounds(&self) -> Option<(Point2, Point2)> {
        let mut iter = self.points();
        let first = *iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), p| {
            (
                Point2::new(lo.x.min(p.x), lo.y.min(p.y)),
                Point2::new(hi.x.max(p.x), hi.y.max(p.y)),
            )
        }))
    }
}
