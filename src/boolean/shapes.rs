use crate::math::polygon_2d::{point_in_polygon, signed_area};
use crate::math::{Point2, Vector2};

/// An outer boundary together with the holes directly inside it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shape {
    pub outer: Vec<Point2>,
    pub holes: Vec<Vec<Point2>>,
}

impl Shape {
    /// Outer area minus hole area.
    #[must_use]
    pub fn area(&self) -> f64 {
        signed_area(&self.outer).abs() - self.holes.iter().map(|h| signed_area(h).abs()).sum::<f64>()
    }
}

/// Distance below which a sample counts as lying on another region's
/// boundary, relative to the edge it was taken from.
const ON_BOUNDARY: f64 = 1e-9;

/// Inward offset of the fallback sample, relative to its edge length.
const INWARD_NUDGE: f64 = 1e-6;

fn distance_to_segment(pt: &Point2, a: &Point2, b: &Point2) -> f64 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 <= f64::EPSILON {
        return (pt - a).norm();
    }
    let t = ((pt - a).dot(&ab) / len2).clamp(0.0, 1.0);
    (pt - (a + ab * t)).norm()
}

fn on_boundary(pt: &Point2, region: &[Point2], tol: f64) -> bool {
    let n = region.len();
    (0..n).any(|k| distance_to_segment(pt, &region[k], &region[(k + 1) % n]) <= tol)
}

/// A point on the boundary of `regions[i]` that no other region's boundary
/// passes through, so even-odd tests against the others are unambiguous.
///
/// Takes the midpoint of the first edge not touching another region. When
/// every edge touches one, the first midpoint is moved slightly into the
/// region instead.
fn sample_point(regions: &[Vec<Point2>], i: usize) -> Option<Point2> {
    let region = &regions[i];
    let n = region.len();
    if n < 2 {
        return None;
    }
    let edge = |k: usize| (region[k], region[(k + 1) % n]);
    let free = (0..n).find_map(|k| {
        let (a, b) = edge(k);
        let mid = Point2::from((a.coords + b.coords) * 0.5);
        let tol = ON_BOUNDARY * (b - a).norm().max(1.0);
        let shared = regions
            .iter()
            .enumerate()
            .any(|(j, other)| j != i && on_boundary(&mid, other, tol));
        (!shared).then_some(mid)
    });
    if free.is_some() {
        return free;
    }

    let (a, b) = edge(0);
    let d = b - a;
    let inward = Vector2::new(-d.y, d.x) * signed_area(region).signum();
    Some(Point2::from((a.coords + b.coords) * 0.5) + inward * INWARD_NUDGE)
}

/// Number of other regions enclosing each region.
#[must_use]
pub fn nesting_depths(regions: &[Vec<Point2>]) -> Vec<usize> {
    regions
        .iter()
        .enumerate()
        .map(|(i, _)| {
            let Some(pt) = sample_point(regions, i) else {
                return 0;
            };
            regions
                .iter()
                .enumerate()
                .filter(|&(j, other)| j != i && point_in_polygon(&pt, other))
                .count()
        })
        .collect()
}

/// Orients regions by nesting depth: even depth counter-clockwise, odd depth
/// clockwise.
#[must_use]
pub fn orient_regions(mut regions: Vec<Vec<Point2>>) -> Vec<Vec<Point2>> {
    let depths = nesting_depths(&regions);
    for (region, depth) in regions.iter_mut().zip(depths) {
        let ccw = signed_area(region) > 0.0;
        if ccw != (depth % 2 == 0) {
            region.reverse();
        }
    }
    regions
}

/// Groups regions into shapes. Every even-depth region starts a shape and
/// every odd-depth region becomes a hole of the smallest region enclosing it.
#[must_use]
pub fn group_shapes(regions: &[Vec<Point2>]) -> Vec<Shape> {
    let depths = nesting_depths(regions);
    let mut shape_of: Vec<Option<usize>> = vec![None; regions.len()];
    let mut shapes = Vec::new();

    for (i, region) in regions.iter().enumerate() {
        if depths[i] % 2 == 0 {
            shape_of[i] = Some(shapes.len());
            shapes.push(Shape {
                outer: region.clone(),
                holes: Vec::new(),
            });
        }
    }

    for (i, region) in regions.iter().enumerate() {
        if depths[i] % 2 == 0 {
            continue;
        }
        let Some(pt) = sample_point(regions, i) else {
            continue;
        };
        let parent = regions
            .iter()
            .enumerate()
            .filter(|&(j, other)| j != i && depths[j] + 1 == depths[i] && point_in_polygon(&pt, other))
            .find_map(|(j, _)| shape_of[j]);
        if let Some(s) = parent {
            shapes[s].holes.push(region.clone());
        }
    }
    shapes
}
