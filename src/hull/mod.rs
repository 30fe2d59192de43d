//! Incremental 3D convex hull (quickhull).

mod quickhull;

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::error::Result;
use crate::math::{Point3, Vector3, TOLERANCE};

use quickhull::Quickhull;

/// Parameters for hull construction.
#[derive(Debug, Clone, Copy)]
pub struct HullParams {
    /// Distance below which a point counts as lying on a face plane, and the
    /// threshold for the coincident/collinear/coplanar seed tests.
    pub tolerance: f64,
}

impl Default for HullParams {
    fn default() -> Self {
        Self {
            tolerance: TOLERANCE,
        }
    }
}

/// A closed triangle mesh. Faces are counter-clockwise seen from outside.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HullMesh {
    pub vertices: Vec<Point3>,
    pub indices: Vec<[u32; 3]>,
}

impl HullMesh {
    /// Outward unit normal of every face.
    #[must_use]
    pub fn face_normals(&self) -> Vec<Vector3> {
        self.indices
            .iter()
            .map(|&[a, b, c]| {
                let (pa, pb, pc) = (
                    self.vertices[a as usize],
                    self.vertices[b as usize],
                    self.vertices[c as usize],
                );
                (pb - pa)
                    .cross(&(pc - pa))
                    .try_normalize(0.0)
                    .unwrap_or_else(Vector3::zeros)
            })
            .collect()
    }

    /// `true` if `p` is behind or within `tol` of every face plane.
    #[must_use]
    pub fn contains(&self, p: &Point3, tol: f64) -> bool {
        self.indices
            .iter()
            .zip(self.face_normals())
            .all(|(&[a, _, _], n)| n.dot(&(p - self.vertices[a as usize])) <= tol)
    }

    /// Enclosed volume (divergence theorem over the faces).
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.indices
            .iter()
            .map(|&[a, b, c]| {
                let (pa, pb, pc) = (
                    self.vertices[a as usize].coords,
                    self.vertices[b as usize].coords,
                    self.vertices[c as usize].coords,
                );
                pa.dot(&pb.cross(&pc)) / 6.0
            })
            .sum()
    }
}

/// Computes the convex hull of a 3D point set.
pub struct ConvexHull {
    points: Vec<Point3>,
    params: HullParams,
}

impl ConvexHull {
    /// Creates a new `ConvexHull` operation.
    #[must_use]
    pub fn new(points: Vec<Point3>) -> Self {
        Self {
            points,
            params: HullParams::default(),
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: HullParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the hull construction.
    ///
    /// Vertices of the result are the extreme input points, each once, in
    /// input order. Points lying on a face or an edge of the hull are left
    /// out.
    ///
    /// # Errors
    ///
    /// Returns `HullError::TooFewPoints` for fewer than four points and
    /// `HullError::Degenerate` if all points are coplanar.
    pub fn execute(&self) -> Result<HullMesh> {
        let tol = self.params.tolerance;
        let mut candidates: Vec<usize> = (0..self.points.len()).collect();
        loop {
            let subset: Vec<Point3> = candidates.iter().map(|&i| self.points[i]).collect();
            let faces: Vec<([usize; 3], Vector3)> = Quickhull::new(&subset, tol)
                .build()?
                .into_iter()
                .map(|f| (f.vertices.map(|v| candidates[v]), f.normal))
                .collect();

            let used = used_vertices(&faces);
            let corners = corner_vertices(&faces);
            if corners.len() == used.len() || corners.len() < 4 {
                return Ok(self.mesh(&used, &faces));
            }
            debug!(
                dropped = used.len() - corners.len(),
                "rebuilding hull without flat vertices"
            );
            candidates = corners;
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn mesh(&self, used: &[usize], faces: &[([usize; 3], Vector3)]) -> HullMesh {
        let remap: HashMap<usize, u32> = used
            .iter()
            .enumerate()
            .map(|(new, &old)| (old, new as u32))
            .collect();

        let mut mesh = HullMesh {
            vertices: used.iter().map(|&i| self.points[i]).collect(),
            indices: Vec::with_capacity(faces.len()),
        };
        for ([a, b, c], _) in faces {
            if let (Some(&a), Some(&b), Some(&c)) = (remap.get(a), remap.get(b), remap.get(c)) {
                mesh.indices.push([a, b, c]);
            }
        }
        mesh
    }
}

/// Sine of the smallest angle at which two face planes count as distinct.
const CORNER_SLACK: f64 = 1e-9;

fn used_vertices(faces: &[([usize; 3], Vector3)]) -> Vec<usize> {
    let mut used: Vec<usize> = faces.iter().flat_map(|(v, _)| *v).collect();
    used.sort_unstable();
    used.dedup();
    used
}

/// Vertices whose incident face normals span all three dimensions. A vertex
/// in the middle of a flat face has one distinct normal, one on a straight
/// edge has two coplanar ones.
fn corner_vertices(faces: &[([usize; 3], Vector3)]) -> Vec<usize> {
    let mut incident: BTreeMap<usize, Vec<Vector3>> = BTreeMap::new();
    for (vertices, normal) in faces {
        for &v in vertices {
            incident.entry(v).or_default().push(*normal);
        }
    }
    incident
        .into_iter()
        .filter(|(_, normals)| {
            normals.iter().any(|a| {
                normals.iter().any(|b| {
                    let axis = a.cross(b);
                    axis.norm() > CORNER_SLACK
                        && normals.iter().any(|c| axis.dot(c).abs() > CORNER_SLACK)
                })
            })
        })
        .map(|(v, _)| v)
        .collect()
}
