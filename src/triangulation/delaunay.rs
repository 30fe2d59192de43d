use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use tracing::{debug, warn};

use crate::error::TriangulationError;
use crate::math::polygon_2d::dedup_closed;
use crate::math::{orient_2d, Point2};

use super::mesh::{edge_key, TriangleId, VertexId, WorkingSet};
use super::pslg::Pslg;
use super::{Triangulation, TriangulationParams};

/// Relative tolerance for orientation tests, scaled by the squared extent of
/// the input.
const ORIENT_SLACK: f64 = 1e-12;

type Edge = (VertexId, VertexId);

/// Cavity boundary edge with the triangle lying across it.
type RimEdge = (VertexId, VertexId, Option<TriangleId>);

/// Incremental constrained Delaunay builder over one [`WorkingSet`].
pub(super) struct Builder<'a> {
    ws: WorkingSet,
    params: &'a TriangulationParams,
    constrained: HashSet<Edge>,
    inserted: Vec<(Point2, VertexId)>,
    area_tol: f64,
    flips: usize,
    guard_tripped: bool,
}

impl<'a> Builder<'a> {
    pub(super) fn new(params: &'a TriangulationParams) -> Self {
        Self {
            ws: WorkingSet::new(),
            params,
            constrained: HashSet::new(),
            inserted: Vec::new(),
            area_tol: 0.0,
            flips: 0,
            guard_tripped: false,
        }
    }

    /// Runs the full pipeline: scaffold, insertion, constraint recovery,
    /// exterior stripping.
    pub(super) fn run(mut self, pslg: &Pslg) -> Result<Triangulation, TriangulationError> {
        let distinct = dedup_closed(&pslg.outer, self.params.merge_tolerance).len();
        if distinct < 3 {
            debug!(points = distinct, "outer contour too small to triangulate");
            return Err(TriangulationError::TooFewPoints(distinct));
        }
        let Some((min, max)) = pslg.bounds() else {
            return Err(TriangulationError::TooFewPoints(0));
        };

        let diagonal = (max - min).norm();
        self.area_tol = ORIENT_SLACK * diagonal * diagonal;
        self.add_scaffold(&min, &max);

        let mut boundary: Vec<Edge> = Vec::new();
        for (i, contour) in pslg.contours().enumerate() {
            if i > 0 && dedup_closed(contour, self.params.merge_tolerance).len() < 3 {
                debug!(hole = i - 1, "skipping degenerate hole contour");
                continue;
            }
            let ids: Vec<VertexId> = contour.iter().filter_map(|p| self.insert(*p)).collect();
            for (k, &a) in ids.iter().enumerate() {
                let b = ids[(k + 1) % ids.len()];
                if a != b {
                    boundary.push((a, b));
                }
            }
        }
        for (pa, pb) in &pslg.constraints {
            if let (Some(a), Some(b)) = (self.insert(*pa), self.insert(*pb)) {
                if a != b {
                    boundary.push((a, b));
                }
            }
        }

        for (a, b) in boundary {
            self.recover(a, b);
        }

        self.strip_exterior(pslg);
        self.finish()
    }

    fn add_scaffold(&mut self, min: &Point2, max: &Point2) {
        let center = Point2::from((min.coords + max.coords) * 0.5);
        let diagonal = (max - min).norm().max(1.0);
        let dh = diagonal * 0.5;
        let rdh = 3.0_f64.sqrt() * dh;
        let a = self
            .ws
            .add_vertex(Point2::new(center.x - rdh * 3.0, center.y - dh * 3.0), None);
        let b = self
            .ws
            .add_vertex(Point2::new(center.x + rdh * 3.0, center.y - dh * 3.0), None);
        let c = self
            .ws
            .add_vertex(Point2::new(center.x, center.y + diagonal * 3.0), None);
        self.ws.add_triangle(a, b, c);
    }

    /// Inserts a point (Bowyer–Watson), merging it into an existing vertex
    /// when one lies within the merge tolerance.
    fn insert(&mut self, p: Point2) -> Option<VertexId> {
        let tol = self.params.merge_tolerance;
        if let Some(&(_, id)) = self.inserted.iter().find(|(q, _)| (p - q).norm() <= tol) {
            return Some(id);
        }

        let seeds: Vec<TriangleId> = self
            .ws
            .triangles()
            .map(|(id, _)| id)
            .filter(|&id| self.covers(id, &p))
            .collect();
        if seeds.is_empty() {
            warn!(x = p.x, y = p.y, "point fell outside the working triangulation");
            return None;
        }

        let order = self.inserted.len();
        let v = self.ws.add_vertex(p, Some(order));
        self.inserted.push((p, v));

        let (rim_edges, cavity) = self.cavity(&seeds, &p).unwrap_or_else(|| {
            let seed_set: BTreeSet<TriangleId> = seeds.iter().copied().collect();
            (self.rim(&seed_set), seed_set)
        });

        for &(a, b, _) in &rim_edges {
            self.ws.add_triangle(a, b, v);
        }
        for t in cavity {
            self.ws.remove_triangle(t);
        }

        let edges = rim_edges.iter().map(|&(a, b, _)| (a, b)).collect();
        self.legalize(edges);
        Some(v)
    }

    /// Grows the set of triangles whose circumcircle contains `p`, starting
    /// from the triangles covering it. Returns `None` when the cavity would
    /// swallow an existing vertex.
    fn cavity(&self, seeds: &[TriangleId], p: &Point2) -> Option<(Vec<RimEdge>, BTreeSet<TriangleId>)> {
        let mut cavity: BTreeSet<TriangleId> = seeds.iter().copied().collect();
        let mut stack: Vec<TriangleId> = seeds.to_vec();
        while let Some(t) = stack.pop() {
            let Some(tri) = self.ws.triangle(t) else {
                continue;
            };
            for s in tri.segments {
                let Some(n) = self.ws.neighbour(t, s) else {
                    continue;
                };
                if cavity.contains(&n) {
                    continue;
                }
                if self.ws.circumcircle(n).is_some_and(|c| c.contains(p)) {
                    cavity.insert(n);
                    stack.push(n);
                }
            }
        }

        // every rim edge must be visible from p
        loop {
            let rim = self.rim(&cavity);
            let hidden: Vec<TriangleId> = rim
                .iter()
                .filter(|(a, b, _)| {
                    orient_2d(&self.ws.position(*a), &self.ws.position(*b), p) <= self.area_tol
                })
                .filter_map(|&(_, _, outside)| outside)
                .collect();
            if hidden.is_empty() {
                let on_rim: HashSet<VertexId> =
                    rim.iter().flat_map(|&(a, b, _)| [a, b]).collect();
                let swallowed = cavity.iter().any(|&t| {
                    self.ws
                        .triangle(t)
                        .is_some_and(|tri| tri.vertices.iter().any(|v| !on_rim.contains(v)))
                });
                return if swallowed { None } else { Some((rim, cavity)) };
            }
            cavity.extend(hidden);
        }
    }

    /// Boundary edges of a set of triangles, in counter-clockwise order, with
    /// the triangle across each edge.
    fn rim(&self, set: &BTreeSet<TriangleId>) -> Vec<RimEdge> {
        let mut rim = Vec::new();
        for &t in set {
            let Some(tri) = self.ws.triangle(t) else {
                continue;
            };
            for i in 0..3 {
                let outside = self.ws.neighbour(t, tri.segments[i]);
                if outside.is_some_and(|n| set.contains(&n)) {
                    continue;
                }
                rim.push((tri.vertices[i], tri.vertices[(i + 1) % 3], outside));
            }
        }
        rim
    }

    fn covers(&self, t: TriangleId, p: &Point2) -> bool {
        let Some([a, b, c]) = self.ws.corners(t) else {
            return false;
        };
        orient_2d(&a, &b, p) >= -self.area_tol
            && orient_2d(&b, &c, p) >= -self.area_tol
            && orient_2d(&c, &a, p) >= -self.area_tol
    }

    /// `true` if the open segments `a-b` and `c-d` cross at a single interior
    /// point.
    fn crosses(&self, a: VertexId, b: VertexId, c: VertexId, d: VertexId) -> bool {
        let (pa, pb, pc, pd) = (
            self.ws.position(a),
            self.ws.position(b),
            self.ws.position(c),
            self.ws.position(d),
        );
        let tol = self.area_tol;
        let side = |o: f64| {
            if o > tol {
                1
            } else if o < -tol {
                -1
            } else {
                0
            }
        };
        let s1 = side(orient_2d(&pa, &pb, &pc));
        let s2 = side(orient_2d(&pa, &pb, &pd));
        let s3 = side(orient_2d(&pc, &pd, &pa));
        let s4 = side(orient_2d(&pc, &pd, &pb));
        s1 * s2 < 0 && s3 * s4 < 0
    }

    fn spend_flip(&mut self) -> bool {
        if self.flips >= self.params.max_flips {
            if !self.guard_tripped {
                warn!(max_flips = self.params.max_flips, "edge flip guard tripped");
                self.guard_tripped = true;
            }
            return false;
        }
        self.flips += 1;
        true
    }

    /// The quad around edge `u-v`: `(t1, t2, x, y)` where `x` is opposite in
    /// `t1` and `y` in `t2`.
    fn quad(&self, u: VertexId, v: VertexId) -> Option<(TriangleId, TriangleId, VertexId, VertexId)> {
        let s = self.ws.segment_between(u, v)?;
        let tris = self.ws.segment(s)?.triangles();
        if tris.len() != 2 {
            return None;
        }
        let (t1, t2) = (tris[0], tris[1]);
        let x = self.ws.opposite(t1, s)?;
        let y = self.ws.opposite(t2, s)?;
        Some((t1, t2, x, y))
    }

    /// Replaces diagonal `u-v` of a convex quad by `x-y`.
    fn flip(&mut self, u: VertexId, v: VertexId, t1: TriangleId, t2: TriangleId, x: VertexId, y: VertexId) {
        self.ws.add_triangle(x, y, u);
        self.ws.add_triangle(x, y, v);
        self.ws.remove_triangle(t1);
        self.ws.remove_triangle(t2);
    }

    /// Restores the Delaunay property around the given edges by flipping,
    /// never touching constrained edges.
    fn legalize(&mut self, edges: Vec<Edge>) {
        let mut stack = edges;
        while let Some((u, v)) = stack.pop() {
            if self.constrained.contains(&edge_key(u, v)) {
                continue;
            }
            let Some((t1, t2, x, y)) = self.quad(u, v) else {
                continue;
            };
            let py = self.ws.position(y);
            if !self.ws.circumcircle(t1).is_some_and(|c| c.contains(&py)) {
                continue;
            }
            if !self.crosses(u, v, x, y) {
                continue;
            }
            if !self.spend_flip() {
                return;
            }
            self.flip(u, v, t1, t2, x, y);
            stack.extend([(u, x), (x, v), (v, y), (y, u)]);
        }
    }

    /// Makes `a-b` an edge of the triangulation and marks it constrained.
    /// Input vertices lying on the segment split it into pieces.
    fn recover(&mut self, a: VertexId, b: VertexId) {
        let pa = self.ws.position(a);
        let pb = self.ws.position(b);
        let dir = pb - pa;
        let len_sq = dir.norm_squared();
        if len_sq <= 0.0 {
            return;
        }

        let mut on_segment: Vec<(f64, VertexId)> = self
            .inserted
            .iter()
            .filter(|&&(_, id)| id != a && id != b && self.ws.vertex(id).is_some())
            .filter_map(|&(q, id)| {
                let t = (q - pa).dot(&dir) / len_sq;
                let on_line = orient_2d(&pa, &pb, &q).abs() <= self.area_tol;
                (on_line && t > 0.0 && t < 1.0).then_some((t, id))
            })
            .collect();
        on_segment.sort_by(|l, r| l.0.total_cmp(&r.0));

        let mut chain = Vec::with_capacity(on_segment.len() + 2);
        chain.push(a);
        chain.extend(on_segment.into_iter().map(|(_, id)| id));
        chain.push(b);
        for pair in chain.windows(2) {
            self.recover_edge(pair[0], pair[1]);
        }
    }

    fn recover_edge(&mut self, a: VertexId, b: VertexId) {
        self.constrained.insert(edge_key(a, b));
        if self.ws.segment_between(a, b).is_some() {
            return;
        }

        let mut queue: VecDeque<Edge> = self
            .ws
            .segments()
            .map(|(_, s)| (s.a, s.b))
            .filter(|&(u, v)| self.crosses(a, b, u, v))
            .collect();
        let mut created = Vec::new();

        while let Some((u, v)) = queue.pop_front() {
            let Some((t1, t2, x, y)) = self.quad(u, v) else {
                continue;
            };
            if !self.spend_flip() {
                warn!("constraint edge left unrecovered");
                return;
            }
            if !self.crosses(u, v, x, y) {
                queue.push_back((u, v));
                continue;
            }
            self.flip(u, v, t1, t2, x, y);
            if self.crosses(a, b, x, y) {
                queue.push_back((x, y));
            } else {
                created.push((x, y));
            }
        }

        self.legalize(created);
    }

    fn strip_exterior(&mut self, pslg: &Pslg) {
        let doomed: Vec<TriangleId> = self
            .ws
            .triangles()
            .filter(|(_, t)| {
                let scaffold = t
                    .vertices
                    .iter()
                    .any(|&v| self.ws.vertex(v).is_none_or(|vx| vx.order.is_none()));
                if scaffold {
                    return true;
                }
                let [a, b, c] = t.vertices.map(|v| self.ws.position(v));
                let centroid = Point2::from((a.coords + b.coords + c.coords) / 3.0);
                if !pslg.contains(&centroid) {
                    return true;
                }
                t.segments.iter().any(|&s| {
                    self.ws.segment(s).is_some_and(|seg| {
                        if self.constrained.contains(&edge_key(seg.a, seg.b)) {
                            return false;
                        }
                        let mid = Point2::from(
                            (self.ws.position(seg.a).coords + self.ws.position(seg.b).coords) * 0.5,
                        );
                        !pslg.contains(&mid)
                    })
                })
            })
            .map(|(id, _)| id)
            .collect();
        for t in doomed {
            self.ws.remove_triangle(t);
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn finish(self) -> Result<Triangulation, TriangulationError> {
        if self.ws.triangle_count() == 0 {
            debug!("triangulation produced no interior triangles");
            return Err(TriangulationError::NoTriangles);
        }

        let mut live: Vec<(usize, VertexId, Point2)> = self
            .ws
            .vertices()
            .filter_map(|(id, v)| v.order.map(|o| (o, id, v.position)))
            .collect();
        live.sort_by_key(|&(o, _, _)| o);

        let index: HashMap<VertexId, u32> = live
            .iter()
            .enumerate()
            .map(|(i, &(_, id, _))| (id, i as u32))
            .collect();

        let triangles = self
            .ws
            .triangles()
            .filter_map(|(_, t)| {
                let [a, b, c] = t.vertices;
                Some([*index.get(&a)?, *index.get(&b)?, *index.get(&c)?])
            })
            .collect();

        Ok(Triangulation {
            vertices: live.into_iter().map(|(_, _, p)| p).collect(),
            triangles,
        })
    }
}
