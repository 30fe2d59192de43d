use tracing::debug;

use crate::boolean::Polygon;
use crate::error::{GeometryError, Result};
use crate::math::polygon_2d::{average, point_in_polygon, signed_area};
use crate::math::{Point2, Point3, Vector2, Vector3};
use crate::triangulation::{Pslg, Triangulate, TriangulationParams};

/// Flags for [`ShardPolygon::triangulate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriangulateOptions {
    /// Make the outline counter-clockwise and holes clockwise before
    /// triangulating.
    pub check_winding: bool,
    /// Reset the pivot to the average of the outline points.
    pub reset_pivot: bool,
}

impl Default for TriangulateOptions {
    fn default() -> Self {
        Self {
            check_winding: true,
            reset_pivot: false,
        }
    }
}

/// Render mesh derived from a shard outline.
///
/// Coordinates are in sprite rect space (0,0 bottom left, 1,1 top right).
/// Triangles wind clockwise seen from +Z, facing the shared `(0, 0, -1)`
/// normal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShardMesh {
    pub vertices: Vec<Point3>,
    pub uvs: Vec<Point2>,
    pub normals: Vec<Vector3>,
    pub triangles: Vec<[u32; 3]>,
}

impl ShardMesh {
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
                (pb - pa).cross(&(pc - pa)).norm() * 0.5
            })
            .sum()
    }
}

/// One shard: an editable outline, optional holes, a pivot, and the mesh
/// derived from them.
///
/// The mesh is stale as soon as the outline changes. Every mutator drops it,
/// so [`mesh`](Self::mesh) only ever returns a mesh that matches the current
/// outline.
#[derive(Debug, Clone, PartialEq)]
pub struct ShardPolygon {
    edges: Vec<Point2>,
    holes: Vec<Vec<Point2>>,
    pivot: Point2,
    mesh: Option<ShardMesh>,

    /// Name given to the spawned object.
    pub name: String,
    /// Tag given to the spawned object.
    pub tag: String,
    /// Whether the shard is spawned at all.
    pub enabled: bool,
    /// Whether the shard is spawned active.
    pub active: bool,
    pub z_offset: f64,
    pub include_in_physics: bool,
    /// RGBA tint.
    pub color: [f32; 4],
}

impl Default for ShardPolygon {
    fn default() -> Self {
        Self {
            edges: Vec::new(),
            holes: Vec::new(),
            pivot: Point2::origin(),
            mesh: None,
            name: String::new(),
            tag: String::new(),
            enabled: true,
            active: true,
            z_offset: 0.0,
            include_in_physics: true,
            color: [1.0; 4],
        }
    }
}

impl ShardPolygon {
    /// Creates a shard from an outline. The pivot is the average of the
    /// outline points.
    #[must_use]
    pub fn new(edges: Vec<Point2>) -> Self {
        Self {
            pivot: average(&edges),
            edges,
            ..Self::default()
        }
    }

    /// Creates a shard with holes.
    #[must_use]
    pub fn with_holes(edges: Vec<Point2>, holes: Vec<Vec<Point2>>) -> Self {
        Self {
            holes,
            ..Self::new(edges)
        }
    }

    /// A shard covering the whole sprite rect, already meshed.
    #[must_use]
    pub fn quad() -> Self {
        let edges = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        let mesh = ShardMesh {
            vertices: edges.iter().map(|p| Point3::new(p.x, p.y, 0.0)).collect(),
            uvs: edges.clone(),
            normals: vec![-Vector3::z(); 4],
            triangles: vec![[0, 2, 1], [0, 3, 2]],
        };
        Self {
            mesh: Some(mesh),
            ..Self::new(edges)
        }
    }

    #[must_use]
    pub fn edges(&self) -> &[Point2] {
        &self.edges
    }

    #[must_use]
    pub fn holes(&self) -> &[Vec<Point2>] {
        &self.holes
    }

    #[must_use]
    pub fn pivot(&self) -> Point2 {
        self.pivot
    }

    pub fn set_pivot(&mut self, pivot: Point2) {
        self.pivot = pivot;
    }

    /// The derived mesh, if it is current.
    #[must_use]
    pub fn mesh(&self) -> Option<&ShardMesh> {
        self.mesh.as_ref()
    }

    #[must_use]
    pub fn is_triangulated(&self) -> bool {
        self.mesh.is_some()
    }

    pub fn set_edges(&mut self, edges: Vec<Point2>) {
        self.edges = edges;
        self.mesh = None;
    }

    pub fn set_holes(&mut self, holes: Vec<Vec<Point2>>) {
        self.holes = holes;
        self.mesh = None;
    }

    /// Inserts a point before `index` (`index == len` appends).
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::IndexOutOfRange` if `index > len`.
    pub fn insert_point(&mut self, index: usize, point: Point2) -> Result<()> {
        if index > self.edges.len() {
            return Err(self.out_of_range(index));
        }
        self.edges.insert(index, point);
        self.mesh = None;
        Ok(())
    }

    /// Moves the point at `index`.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::IndexOutOfRange` if there is no such point.
    pub fn move_point(&mut self, index: usize, point: Point2) -> Result<()> {
        let len = self.edges.len();
        let slot = self
            .edges
            .get_mut(index)
            .ok_or(GeometryError::IndexOutOfRange { index, len })?;
        *slot = point;
        self.mesh = None;
        Ok(())
    }

    /// Removes and returns the point at `index`.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::IndexOutOfRange` if there is no such point.
    pub fn remove_point(&mut self, index: usize) -> Result<Point2> {
        if index >= self.edges.len() {
            return Err(self.out_of_range(index));
        }
        self.mesh = None;
        Ok(self.edges.remove(index))
    }

    fn out_of_range(&self, index: usize) -> crate::error::ShardError {
        GeometryError::IndexOutOfRange {
            index,
            len: self.edges.len(),
        }
        .into()
    }

    /// Moves outline, holes and pivot by `offset`.
    pub fn translate(&mut self, offset: Vector2) {
        for p in self.edges.iter_mut().chain(self.holes.iter_mut().flatten()) {
            *p += offset;
        }
        self.pivot += offset;
        self.mesh = None;
    }

    /// A copy moved by `offset`. The mesh moves along with the outline and
    /// keeps its uvs, so the copy still samples the same part of the sprite.
    #[must_use]
    pub fn translated(&self, offset: Vector2) -> Self {
        let mut copy = self.clone();
        for p in copy.edges.iter_mut().chain(copy.holes.iter_mut().flatten()) {
            *p += offset;
        }
        copy.pivot += offset;
        if let Some(mesh) = copy.mesh.as_mut() {
            let offset3 = Vector3::new(offset.x, offset.y, 0.0);
            for v in &mut mesh.vertices {
                *v += offset3;
            }
        }
        copy
    }

    /// Resets the pivot to the average of the outline points.
    pub fn recompute_pivot(&mut self) {
        self.pivot = average(&self.edges);
    }

    /// Outline area minus hole area.
    #[must_use]
    pub fn area(&self) -> f64 {
        signed_area(&self.edges).abs()
            - self
                .holes
                .iter()
                .map(|h| signed_area(h).abs())
                .sum::<f64>()
    }

    /// Even-odd containment over the outline and holes.
    #[must_use]
    pub fn contains(&self, p: &Point2) -> bool {
        let crossings = std::iter::once(&self.edges)
            .chain(&self.holes)
            .filter(|contour| point_in_polygon(p, contour))
            .count();
        crossings % 2 == 1
    }

    /// The outline and holes as a boolean operand.
    #[must_use]
    pub fn to_polygon(&self) -> Polygon {
        let mut regions = Vec::with_capacity(1 + self.holes.len());
        regions.push(self.edges.clone());
        regions.extend(self.holes.iter().cloned());
        Polygon::new(regions)
    }

    /// Makes the outline counter-clockwise and every hole clockwise. Returns
    /// `true` if anything was reversed.
    pub fn fix_winding(&mut self) -> bool {
        let mut changed = false;
        if signed_area(&self.edges) < 0.0 {
            self.edges.reverse();
            changed = true;
        }
        for hole in &mut self.holes {
            if signed_area(hole) > 0.0 {
                hole.reverse();
                changed = true;
            }
        }
        if changed {
            self.mesh = None;
        }
        changed
    }

    /// Rebuilds the mesh from the outline.
    ///
    /// # Errors
    ///
    /// Returns a `TriangulationError` if the outline cannot be triangulated;
    /// the mesh is cleared in that case.
    pub fn triangulate(&mut self, options: TriangulateOptions) -> Result<()> {
        self.triangulate_with(options, TriangulationParams::default())
    }

    /// [`triangulate`](Self::triangulate) with explicit triangulator
    /// parameters.
    ///
    /// # Errors
    ///
    /// Returns a `TriangulationError` if the outline cannot be triangulated;
    /// the mesh is cleared in that case.
    pub fn triangulate_with(
        &mut self,
        options: TriangulateOptions,
        params: TriangulationParams,
    ) -> Result<()> {
        if options.check_winding {
            self.fix_winding();
        }
        if options.reset_pivot {
            self.recompute_pivot();
        }
        self.mesh = None;

        let pslg = self
            .holes
            .iter()
            .fold(Pslg::from_polygon(self.edges.clone()), |pslg, hole| {
                pslg.with_hole(hole.clone())
            });
        let tri = Triangulate::new(pslg).with_params(params).execute()?;

        let count = tri.vertices.len();
        let mesh = ShardMesh {
            vertices: tri
                .vertices
                .iter()
                .map(|p| Point3::new(p.x, p.y, 0.0))
                .collect(),
            uvs: tri.vertices.clone(),
            normals: vec![-Vector3::z(); count],
            triangles: tri.triangles.iter().map(|&[a, b, c]| [a, c, b]).collect(),
        };
        debug!(
            vertices = count,
            triangles = mesh.triangles.len(),
            "shard triangulated"
        );
        self.mesh = Some(mesh);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{ShardError, TriangulationError};
    use crate::math::orient_2d;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn square(min: f64, max: f64) -> Vec<Point2> {
        vec![p(min, min), p(max, min), p(max, max), p(min, max)]
    }

    fn assert_clockwise(mesh: &ShardMesh) {
        for &[a, b, c] in &mesh.triangles {
            let v = |i: u32| mesh.vertices[i as usize].xy();
            assert!(orient_2d(&v(a), &v(b), &v(c)) < 0.0);
        }
    }

    #[test]
    fn unit_square_gives_two_clockwise_triangles() {
        let mut shard = ShardPolygon::new(square(0.0, 1.0));
        shard.triangulate(TriangulateOptions::default()).unwrap();
        let mesh = shard.mesh().unwrap();
        assert_eq!(mesh.triangles.len(), 2);
        assert!((mesh.area() - 1.0).abs() < 1e-12);
        assert_clockwise(mesh);
        assert!(mesh.normals.iter().all(|n| *n == -Vector3::z()));
        assert_eq!(mesh.uvs.len(), mesh.vertices.len());
    }

    #[test]
    fn check_winding_reverses_clockwise_outline() {
        let mut cw = square(0.0, 1.0);
        cw.reverse();
        let mut shard = ShardPolygon::new(cw);
        shard.triangulate(TriangulateOptions::default()).unwrap();
        assert!(signed_area(shard.edges()) > 0.0);

        let before = shard.edges().to_vec();
        assert!(!shard.fix_winding());
        assert_eq!(shard.edges(), before.as_slice());
    }

    #[test]
    fn holes_are_cut_out_of_the_mesh() {
        let mut shard = ShardPolygon::with_holes(square(0.0, 3.0), vec![square(1.0, 2.0)]);
        shard.triangulate(TriangulateOptions::default()).unwrap();
        assert!(signed_area(&shard.holes()[0]) < 0.0);
        assert!((shard.mesh().unwrap().area() - 8.0).abs() < 1e-9);
        assert!((shard.area() - 8.0).abs() < 1e-12);
        assert!(shard.contains(&p(0.5, 0.5)));
        assert!(!shard.contains(&p(1.5, 1.5)));
    }

    #[test]
    fn mutators_invalidate_mesh() {
        let mut shard = ShardPolygon::quad();
        assert!(shard.is_triangulated());
        shard.move_point(2, p(1.5, 1.5)).unwrap();
        assert!(!shard.is_triangulated());

        shard.triangulate(TriangulateOptions::default()).unwrap();
        shard.insert_point(4, p(-0.5, 0.5)).unwrap();
        assert!(!shard.is_triangulated());
        assert_eq!(shard.edges().len(), 5);

        shard.triangulate(TriangulateOptions::default()).unwrap();
        assert_eq!(shard.remove_point(4).unwrap(), p(-0.5, 0.5));
        assert!(!shard.is_triangulated());

        shard.triangulate(TriangulateOptions::default()).unwrap();
        shard.translate(Vector2::new(1.0, 0.0));
        assert!(!shard.is_triangulated());
    }

    #[test]
    fn bad_indices_are_rejected() {
        let mut shard = ShardPolygon::new(square(0.0, 1.0));
        assert!(matches!(
            shard.move_point(4, p(0.0, 0.0)),
            Err(ShardError::Geometry(GeometryError::IndexOutOfRange { index: 4, len: 4 }))
        ));
        assert!(shard.insert_point(5, p(0.0, 0.0)).is_err());
        assert!(shard.remove_point(9).is_err());
        assert_eq!(shard.edges().len(), 4);
    }

    #[test]
    fn failed_triangulation_clears_mesh() {
        let mut shard = ShardPolygon::quad();
        shard.set_edges(vec![p(0.0, 0.0), p(1.0, 1.0)]);
        let err = shard.triangulate(TriangulateOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            ShardError::Triangulation(TriangulationError::TooFewPoints(2))
        ));
        assert!(shard.mesh().is_none());
    }

    #[test]
    fn reset_pivot_averages_outline() {
        let mut shard = ShardPolygon::new(square(0.0, 2.0));
        shard.set_pivot(p(9.0, 9.0));
        shard
            .triangulate(TriangulateOptions {
                check_winding: true,
                reset_pivot: true,
            })
            .unwrap();
        assert_eq!(shard.pivot(), p(1.0, 1.0));
    }

    #[test]
    fn translated_copy_keeps_uvs() {
        let shard = ShardPolygon::quad();
        let moved = shard.translated(Vector2::new(2.0, 1.0));
        assert_eq!(moved.pivot(), p(2.5, 1.5));
        assert_eq!(moved.edges()[0], p(2.0, 1.0));
        let (a, b) = (shard.mesh().unwrap(), moved.mesh().unwrap());
        assert_eq!(a.uvs, b.uvs);
        assert_eq!(b.vertices[0], Point3::new(2.0, 1.0, 0.0));
    }

    #[test]
    fn quad_mesh_matches_triangulated_square() {
        let quad = ShardPolygon::quad();
        assert_clockwise(quad.mesh().unwrap());
        let mut fresh = ShardPolygon::new(quad.edges().to_vec());
        fresh.triangulate(TriangulateOptions::default()).unwrap();
        assert!((fresh.mesh().unwrap().area() - quad.mesh().unwrap().area()).abs() < 1e-12);
    }
}
