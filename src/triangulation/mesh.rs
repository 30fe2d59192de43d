use std::cell::OnceCell;
use std::collections::HashMap;

use slotmap::{new_key_type, SlotMap};

use crate::math::{orient_2d, Point2};

use super::circle::Circle;

new_key_type! {
    /// Handle to a working-set vertex.
    pub struct VertexId;
    /// Handle to a working-set segment.
    pub struct SegmentId;
    /// Handle to a working-set triangle.
    pub struct TriangleId;
}

/// A working-set vertex.
#[derive(Debug, Clone)]
pub struct Vertex {
    pub position: Point2,
    /// Position in the input order, `None` for scaffold vertices.
    pub order: Option<usize>,
    /// Number of live segments touching this vertex.
    refs: usize,
}

/// An undirected edge shared by at most two triangles.
#[derive(Debug, Clone)]
pub struct Segment {
    pub a: VertexId,
    pub b: VertexId,
    triangles: Vec<TriangleId>,
}

impl Segment {
    #[must_use]
    pub fn triangles(&self) -> &[TriangleId] {
        &self.triangles
    }
}

/// A counter-clockwise triangle.
///
/// `segments[i]` joins `vertices[i]` and `vertices[(i + 1) % 3]`.
#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [VertexId; 3],
    pub segments: [SegmentId; 3],
    circle: OnceCell<Option<Circle>>,
}

/// Ordered key for an undirected vertex pair.
#[must_use]
pub fn edge_key(a: VertexId, b: VertexId) -> (VertexId, VertexId) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Arena working set for one triangulation call.
///
/// Vertices count the segments that use them and segments count their
/// triangles. An entity leaves its arena exactly when its count drops to
/// zero, so removing a triangle cascades to orphaned segments and vertices.
#[derive(Debug, Default)]
pub struct WorkingSet {
    vertices: SlotMap<VertexId, Vertex>,
    segments: SlotMap<SegmentId, Segment>,
    triangles: SlotMap<TriangleId, Triangle>,
    edge_index: HashMap<(VertexId, VertexId), SegmentId>,
}

impl WorkingSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a free-standing vertex. It is dropped again once a segment using
    /// it is removed and no other segment remains.
    pub fn add_vertex(&mut self, position: Point2, order: Option<usize>) -> VertexId {
        self.vertices.insert(Vertex {
            position,
            order,
            refs: 0,
        })
    }

    #[must_use]
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id)
    }

    /// Position of a live vertex. Dead handles map to the origin.
    #[must_use]
    pub fn position(&self, id: VertexId) -> Point2 {
        self.vertices
            .get(id)
            .map_or_else(Point2::origin, |v| v.position)
    }

    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> {
        self.vertices.iter()
    }

    #[must_use]
    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id)
    }

    pub fn segments(&self) -> impl Iterator<Item = (SegmentId, &Segment)> {
        self.segments.iter()
    }

    /// The segment joining `a` and `b`, if one exists.
    #[must_use]
    pub fn segment_between(&self, a: VertexId, b: VertexId) -> Option<SegmentId> {
        self.edge_index.get(&edge_key(a, b)).copied()
    }

    #[must_use]
    pub fn triangle(&self, id: TriangleId) -> Option<&Triangle> {
        self.triangles.get(id)
    }

    pub fn triangles(&self) -> impl Iterator<Item = (TriangleId, &Triangle)> {
        self.triangles.iter()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Vertex positions of a triangle.
    #[must_use]
    pub fn corners(&self, id: TriangleId) -> Option<[Point2; 3]> {
        let t = self.triangles.get(id)?;
        Some(t.vertices.map(|v| self.position(v)))
    }

    /// Lazily computed circumcircle. `None` for dead or degenerate triangles.
    #[must_use]
    pub fn circumcircle(&self, id: TriangleId) -> Option<Circle> {
        let t = self.triangles.get(id)?;
        *t.circle.get_or_init(|| {
            let [a, b, c] = t.vertices.map(|v| self.position(v));
            Circle::circumscribed(&a, &b, &c)
        })
    }

    /// Adds triangle `(a, b, c)`, reordering it counter-clockwise and
    /// creating or sharing its segments.
    pub fn add_triangle(&mut self, a: VertexId, b: VertexId, c: VertexId) -> TriangleId {
        let (pa, pb, pc) = (self.position(a), self.position(b), self.position(c));
        let vertices = if orient_2d(&pa, &pb, &pc) < 0.0 {
            [a, c, b]
        } else {
            [a, b, c]
        };
        let segments = [
            self.acquire_segment(vertices[0], vertices[1]),
            self.acquire_segment(vertices[1], vertices[2]),
            self.acquire_segment(vertices[2], vertices[0]),
        ];
        let id = self.triangles.insert(Triangle {
            vertices,
            segments,
            circle: OnceCell::new(),
        });
        for s in segments {
            if let Some(seg) = self.segments.get_mut(s) {
                seg.triangles.push(id);
            }
        }
        id
    }

    /// Removes a triangle, releasing segments and vertices left unused.
    pub fn remove_triangle(&mut self, id: TriangleId) {
        let Some(t) = self.triangles.remove(id) else {
            return;
        };
        for s in t.segments {
            let orphaned = match self.segments.get_mut(s) {
                Some(seg) => {
                    seg.triangles.retain(|&other| other != id);
                    seg.triangles.is_empty()
                }
                None => false,
            };
            if orphaned {
                self.release_segment(s);
            }
        }
    }

    /// The triangle on the other side of `segment` from `tri`.
    #[must_use]
    pub fn neighbour(&self, tri: TriangleId, segment: SegmentId) -> Option<TriangleId> {
        self.segments
            .get(segment)?
            .triangles
            .iter()
            .copied()
            .find(|&t| t != tri)
    }

    /// The vertex of `tri` not on `segment`.
    #[must_use]
    pub fn opposite(&self, tri: TriangleId, segment: SegmentId) -> Option<VertexId> {
        let t = self.triangles.get(tri)?;
        let s = self.segments.get(segment)?;
        t.vertices.iter().copied().find(|&v| v != s.a && v != s.b)
    }

    fn acquire_segment(&mut self, a: VertexId, b: VertexId) -> SegmentId {
        let key = edge_key(a, b);
        if let Some(&id) = self.edge_index.get(&key) {
            return id;
        }
        for v in [a, b] {
            if let Some(vertex) = self.vertices.get_mut(v) {
                vertex.refs += 1;
            }
        }
        let id = self.segments.insert(Segment {
            a,
            b,
            triangles: Vec::with_capacity(2),
        });
        self.edge_index.insert(key, id);
        id
    }

    fn release_segment(&mut self, id: SegmentId) {
        let Some(seg) = self.segments.remove(id) else {
            return;
        };
        self.edge_index.remove(&edge_key(seg.a, seg.b));
        for v in [seg.a, seg.b] {
            let unused = match self.vertices.get_mut(v) {
                Some(vertex) => {
                    vertex.refs = vertex.refs.saturating_sub(1);
                    vertex.refs == 0
                }
                None => false,
            };
            if unused {
                self.vertices.remove(v);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn triangles_are_stored_ccw() {
        let mut ws = WorkingSet::new();
        let a = ws.add_vertex(p(0.0, 0.0), Some(0));
        let b = ws.add_vertex(p(0.0, 1.0), Some(1));
        let c = ws.add_vertex(p(1.0, 0.0), Some(2));
        let t = ws.add_triangle(a, b, c);
        let [pa, pb, pc] = ws.corners(t).unwrap();
        assert!(orient_2d(&pa, &pb, &pc) > 0.0);
    }

    #[test]
    fn shared_segment_links_both_triangles() {
        let mut ws = WorkingSet::new();
        let a = ws.add_vertex(p(0.0, 0.0), Some(0));
        let b = ws.add_vertex(p(1.0, 0.0), Some(1));
        let c = ws.add_vertex(p(1.0, 1.0), Some(2));
        let d = ws.add_vertex(p(0.0, 1.0), Some(3));
        let t1 = ws.add_triangle(a, b, c);
        let t2 = ws.add_triangle(a, c, d);
        let diag = ws.segment_between(a, c).unwrap();
        assert_eq!(ws.segment(diag).unwrap().triangles().len(), 2);
        assert_eq!(ws.neighbour(t1, diag), Some(t2));
        assert_eq!(ws.opposite(t2, diag), Some(d));
        assert_eq!(ws.segments().count(), 5);
    }

    #[test]
    fn removal_cascades_to_orphans() {
        let mut ws = WorkingSet::new();
        let a = ws.add_vertex(p(0.0, 0.0), Some(0));
        let b = ws.add_vertex(p(1.0, 0.0), Some(1));
        let c = ws.add_vertex(p(1.0, 1.0), Some(2));
        let d = ws.add_vertex(p(0.0, 1.0), Some(3));
        let t1 = ws.add_triangle(a, b, c);
        let t2 = ws.add_triangle(a, c, d);

        ws.remove_triangle(t2);
        assert!(ws.vertex(d).is_none());
        assert!(ws.segment_between(a, c).is_some());
        assert_eq!(ws.segments().count(), 3);

        ws.remove_triangle(t1);
        assert_eq!(ws.vertices().count(), 0);
        assert_eq!(ws.segments().count(), 0);
    }

    #[test]
    fn circumcircle_is_cached() {
        let mut ws = WorkingSet::new();
        let a = ws.add_vertex(p(0.0, 0.0), None);
        let b = ws.add_vertex(p(2.0, 0.0), None);
        let c = ws.add_vertex(p(0.0, 2.0), None);
        let t = ws.add_triangle(a, b, c);
        let first = ws.circumcircle(t).unwrap();
        let second = ws.circumcircle(t).unwrap();
        assert!((first.radius_sq - second.radius_sq).abs() < 1e-15);
        assert!((first.center.x - 1.0).abs() < 1e-12);
    }
}
