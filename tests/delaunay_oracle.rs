//! Cross-checks the triangulator against spade on inputs where the
//! constrained and unconstrained Delaunay triangulations coincide.
#![allow(clippy::unwrap_used)]

mod common;

use std::collections::BTreeSet;

use spade::{DelaunayTriangulation, Triangulation as _};
use shardkit::math::Point2;
use shardkit::triangulation::{Triangulate, Triangulation};

use common::{init_tracing, p};

/// Vertices of a convex outline on a stretched ellipse, at uneven angles so
/// that no four are cocircular.
fn convex_outline() -> Vec<Point2> {
    let offsets = [0.0, 0.13, 0.05, 0.21, 0.08, 0.17, 0.02, 0.11, 0.19, 0.07];
    let n = offsets.len() as f64;
    offsets
        .iter()
        .enumerate()
        .map(|(i, off)| {
            let angle = std::f64::consts::TAU * (i as f64 + off) / n;
            p(3.0 * angle.cos(), 1.3 * angle.sin())
        })
        .collect()
}

fn edges(t: &Triangulation) -> BTreeSet<(u32, u32)> {
    t.triangles
        .iter()
        .flat_map(|&[a, b, c]| [(a, b), (b, c), (c, a)])
        .map(|(a, b)| (a.min(b), a.max(b)))
        .collect()
}

#[test]
fn convex_outline_matches_spade() {
    init_tracing();
    let outline = convex_outline();
    let ours = Triangulate::polygon(&outline).execute().unwrap();

    let mut oracle: DelaunayTriangulation<spade::Point2<f64>> = DelaunayTriangulation::new();
    for q in &outline {
        oracle.insert(spade::Point2::new(q.x, q.y)).unwrap();
    }
    assert_eq!(ours.triangles.len(), oracle.num_inner_faces());

    let expected: BTreeSet<(u32, u32)> = oracle
        .undirected_edges()
        .map(|edge| {
            let [a, b] = edge.vertices().map(|v| {
                let pos = v.position();
                ours.vertex_index(&p(pos.x, pos.y), 1e-12).unwrap()
            });
            (a.min(b), a.max(b))
        })
        .collect();
    assert_eq!(edges(&ours), expected);
}
