use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::HullError;
use crate::math::{Point3, Vector3};

/// Triangle of the hull under construction. `opposite[i]` is the face across
/// the edge that does not contain `vertices[i]`.
#[derive(Debug, Clone, Copy)]
pub(super) struct Face {
    pub vertices: [usize; 3],
    opposite: [usize; 3],
    pub normal: Vector3,
}

/// A point still outside the hull, with the face it is in front of.
#[derive(Debug, Clone, Copy)]
struct PointFace {
    point: usize,
    face: usize,
    distance: f64,
}

#[derive(Debug, Clone, Copy)]
struct HorizonEdge {
    face: usize,
    edge0: usize,
    edge1: usize,
}

/// Incremental 3D hull over a fixed point slice.
pub(super) struct Quickhull<'a> {
    points: &'a [Point3],
    tolerance: f64,
    faces: Vec<Option<Face>>,
    lit: HashSet<usize>,
    horizon: Vec<HorizonEdge>,
    /// Points outside the hull occupy `open[..open_len]`.
    open: Vec<PointFace>,
    open_len: usize,
}

impl<'a> Quickhull<'a> {
    pub(super) fn new(points: &'a [Point3], tolerance: f64) -> Self {
        Self {
            points,
            tolerance,
            faces: Vec::new(),
            lit: HashSet::new(),
            horizon: Vec::new(),
            open: Vec::with_capacity(points.len()),
            open_len: 0,
        }
    }

    /// Builds the hull and returns its faces.
    pub(super) fn build(mut self) -> Result<Vec<Face>, HullError> {
        if self.points.len() < 4 {
            return Err(HullError::TooFewPoints(self.points.len()));
        }
        let seed = self.find_seed().ok_or_else(|| {
            warn!(points = self.points.len(), "no four non-coplanar points, hull omitted");
            HullError::Degenerate
        })?;
        self.initial_hull(seed);

        let mut rounds = 0;
        let max_rounds = self.points.len() * 4;
        while self.open_len > 0 {
            if rounds >= max_rounds {
                warn!(rounds, remaining = self.open_len, "hull growth did not converge");
                break;
            }
            self.grow();
            rounds += 1;
        }
        debug!(rounds, "hull complete");

        Ok(self.faces.into_iter().flatten().collect())
    }

    fn face(&self, index: usize) -> Option<&Face> {
        self.faces.get(index).and_then(Option::as_ref)
    }

    fn distance(&self, point: usize, face: &Face) -> f64 {
        face.normal
            .dot(&(self.points[point] - self.points[face.vertices[0]]))
    }

    fn make_face(&self, v: [usize; 3], opposite: [usize; 3]) -> Face {
        let (a, b, c) = (self.points[v[0]], self.points[v[1]], self.points[v[2]]);
        let normal = (b - a)
            .cross(&(c - a))
            .try_normalize(0.0)
            .unwrap_or_else(Vector3::zeros);
        Face {
            vertices: v,
            opposite,
            normal,
        }
    }

    /// Brute-force search for four points that are pairwise distinct, not
    /// collinear and not coplanar.
    fn find_seed(&self) -> Option<[usize; 4]> {
        let pts = self.points;
        let tol = self.tolerance;
        let n = pts.len();
        for i0 in 0..n - 3 {
            for i1 in i0 + 1..n - 2 {
                let e1 = pts[i1] - pts[i0];
                if e1.norm() <= tol {
                    continue;
                }
                for i2 in i1 + 1..n - 1 {
                    let normal = e1.cross(&(pts[i2] - pts[i0]));
                    if normal.norm() <= tol {
                        continue;
                    }
                    for i3 in i2 + 1..n {
                        if normal.dot(&(pts[i3] - pts[i0])).abs() > tol {
                            return Some([i0, i1, i2, i3]);
                        }
                    }
                }
            }
        }
        None
    }

    fn initial_hull(&mut self, [b0, b1, b2, b3]: [usize; 4]) {
        let (v0, v1, v2, v3) = (
            self.points[b0],
            self.points[b1],
            self.points[b2],
            self.points[b3],
        );
        let layout = if (v3 - v1).dot(&(v1 - v0).cross(&(v2 - v0))) > 0.0 {
            [
                ([b0, b2, b1], [3, 1, 2]),
                ([b0, b1, b3], [3, 2, 0]),
                ([b0, b3, b2], [3, 0, 1]),
                ([b1, b2, b3], [2, 1, 0]),
            ]
        } else {
            [
                ([b0, b1, b2], [3, 2, 1]),
                ([b0, b3, b1], [3, 0, 2]),
                ([b0, b2, b3], [3, 1, 0]),
                ([b1, b3, b2], [2, 0, 1]),
            ]
        };
        self.faces = layout
            .iter()
            .map(|&(v, o)| Some(self.make_face(v, o)))
            .collect();

        let seed = [b0, b1, b2, b3];
        let mut outside = Vec::new();
        let mut inside = Vec::new();
        for i in (0..self.points.len()).filter(|i| !seed.contains(i)) {
            let hit = (0..4).find_map(|f| {
                let face = self.face(f)?;
                let d = self.distance(i, face);
                (d > self.tolerance).then_some((f, d))
            });
            match hit {
                Some((face, distance)) => outside.push(PointFace {
                    point: i,
                    face,
                    distance,
                }),
                None => inside.push(i),
            }
        }
        self.open_len = outside.len();
        self.open = outside;
        self.open.extend(inside.into_iter().chain(seed).map(|point| PointFace {
            point,
            face: usize::MAX,
            distance: f64::NAN,
        }));
    }

    fn grow(&mut self) {
        let Some(farthest) = (0..self.open_len).max_by(|&a, &b| {
            self.open[a].distance.total_cmp(&self.open[b].distance)
        }) else {
            return;
        };
        let PointFace { point, face, .. } = self.open[farthest];
        self.find_horizon(point, face);
        self.construct_cone(point);
        self.reassign_points();
    }

    /// Collects the lit faces around `fi` and the ordered loop of horizon
    /// edges separating them from the rest of the hull.
    fn find_horizon(&mut self, point: usize, fi: usize) {
        self.lit.clear();
        self.horizon.clear();
        self.lit.insert(fi);
        let Some(&face) = self.face(fi) else {
            return;
        };
        let [v0, v1, v2] = face.vertices;
        let edges = [(v1, v2), (v2, v0), (v0, v1)];
        for (i, &(edge0, edge1)) in edges.iter().enumerate() {
            let next = face.opposite[i];
            if i > 0 && self.lit.contains(&next) {
                continue;
            }
            self.visit(point, fi, next, edge0, edge1);
        }
    }

    /// Either records `edge0 -> edge1` as a horizon edge (when `next` is not
    /// visible from the point) or continues the search into `next`.
    fn visit(&mut self, point: usize, from: usize, next: usize, edge0: usize, edge1: usize) {
        let Some(&face) = self.face(next) else {
            return;
        };
        if self.distance(point, &face) <= self.tolerance {
            self.horizon.push(HorizonEdge {
                face: next,
                edge0,
                edge1,
            });
        } else {
            self.search_horizon(point, from, next, face);
        }
    }

    fn search_horizon(&mut self, point: usize, prev: usize, fi: usize, face: Face) {
        self.lit.insert(fi);
        let [v0, v1, v2] = face.vertices;
        let [o0, o1, o2] = face.opposite;
        let (next0, next1, e0, e1, e2) = if prev == o0 {
            (o1, o2, v2, v0, v1)
        } else if prev == o1 {
            (o2, o0, v0, v1, v2)
        } else {
            (o0, o1, v1, v2, v0)
        };
        if !self.lit.contains(&next0) {
            self.visit(point, fi, next0, e0, e1);
        }
        if !self.lit.contains(&next1) {
            self.visit(point, fi, next1, e1, e2);
        }
    }

    /// Replaces the lit faces by a fan from `point` to the horizon.
    fn construct_cone(&mut self, point: usize) {
        for &fi in &self.lit {
            if let Some(slot) = self.faces.get_mut(fi) {
                *slot = None;
            }
        }

        let first = self.faces.len();
        let count = self.horizon.len();
        for i in 0..count {
            let edge = self.horizon[i];
            let next = if i + 1 == count { first } else { first + i + 1 };
            let prev = if i == 0 { first + count - 1 } else { first + i - 1 };
            let fi = self.faces.len();
            let new_face = self.make_face([point, edge.edge0, edge.edge1], [edge.face, next, prev]);
            self.faces.push(Some(new_face));

            if let Some(Some(hf)) = self.faces.get_mut(edge.face) {
                let slot = if hf.vertices[0] == edge.edge0 {
                    1
                } else if hf.vertices[1] == edge.edge0 {
                    2
                } else {
                    0
                };
                hf.opposite[slot] = fi;
            }
        }
    }

    /// Moves points of removed faces to a new face they are in front of, or
    /// out of the open set.
    fn reassign_points(&mut self) {
        let mut i = 0;
        while i < self.open_len {
            let pf = self.open[i];
            if !self.lit.contains(&pf.face) {
                i += 1;
                continue;
            }
            let hit = self.faces.iter().enumerate().find_map(|(fi, f)| {
                let d = self.distance(pf.point, f.as_ref()?);
                (d > self.tolerance).then_some((fi, d))
            });
            if let Some((face, distance)) = hit {
                self.open[i].face = face;
                self.open[i].distance = distance;
                i += 1;
            } else {
                self.open_len -= 1;
                self.open.swap(i, self.open_len);
                self.open[self.open_len].face = usize::MAX;
                self.open[self.open_len].distance = f64::NAN;
            }
        }
    }
}
