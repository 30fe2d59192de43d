//! Constrained Delaunay triangulation of simple polygons with holes.
//!
//! Points are inserted one at a time into a scaffold triangle that encloses
//! the input (Bowyer–Watson). Boundary edges are then forced into the mesh by
//! edge flipping, and every triangle outside the polygon is stripped.

mod circle;
mod delaunay;
pub mod mesh;
mod pslg;

pub use circle::Circle;
pub use pslg::Pslg;

use crate::error::Result;
use crate::math::Point2;

use delaunay::Builder;

/// Parameters controlling triangulation.
#[derive(Debug, Clone, Copy)]
pub struct TriangulationParams {
    /// Input points closer than this collapse to a single vertex.
    pub merge_tolerance: f64,
    /// Upper bound on edge flips per call.
    pub max_flips: usize,
}

impl Default for TriangulationParams {
    fn default() -> Self {
        Self {
            merge_tolerance: 1e-9,
            max_flips: 100_000,
        }
    }
}

/// Output of a triangulation: vertices in input order and counter-clockwise
/// triangles indexing into them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Triangulation {
    pub vertices: Vec<Point2>,
    pub triangles: Vec<[u32; 3]>,
}

impl Triangulation {
    /// Sum of the triangle areas.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.triangles
            .iter()
            .map(|&[a, b, c]| {
                let (pa, pb, pc) = (
                    self.vertices[a as usize],
                    self.vertices[b as usize],
                    self.vertices[c as usize],
                );
                crate::math::orient_2d(&pa, &pb, &pc) * 0.5
            })
            .sum()
    }

    /// Index of the vertex at `p`, if any.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn vertex_index(&self, p: &Point2, tol: f64) -> Option<u32> {
        self.vertices
            .iter()
            .position(|v| (v - p).norm() <= tol)
            .map(|i| i as u32)
    }
}

/// Triangulates a planar straight-line graph.
pub struct Triangulate {
    pslg: Pslg,
    params: TriangulationParams,
}

impl Triangulate {
    /// Creates a new `Triangulate` operation with default parameters.
    #[must_use]
    pub fn new(pslg: Pslg) -> Self {
        Self {
            pslg,
            params: TriangulationParams::default(),
        }
    }

    /// Shorthand for triangulating one simple polygon.
    #[must_use]
    pub fn polygon(points: &[Point2]) -> Self {
        Self::new(Pslg::from_polygon(points.to_vec()))
    }

    #[must_use]
    pub fn with_params(mut self, params: TriangulationParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the triangulation.
    ///
    /// # Errors
    ///
    /// Returns `TriangulationError::TooFewPoints` if the outer contour has
    /// fewer than three distinct points, or `TriangulationError::NoTriangles`
    /// if no triangle survives exterior stripping (e.g. collinear input).
    pub fn execute(&self) -> Result<Triangulation> {
        Ok(Builder::new(&self.params).run(&self.pslg)?)
    }
}
