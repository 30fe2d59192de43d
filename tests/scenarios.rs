#![allow(clippy::unwrap_used)]

mod common;

use approx::assert_relative_eq;
use common::{init_tracing, p, poly, rect};
use shardkit::boolean::{CsgParams, PolyBool, Polygon};
use shardkit::error::{HullError, ShardError, TriangulationError};
use shardkit::hull::ConvexHull;
use shardkit::math::polygon_2d::signed_area;
use shardkit::math::Point3;
use shardkit::shard::{ShardPolygon, TriangulateOptions};
use shardkit::triangulation::Triangulate;

const TOL: f64 = 1e-6;

fn engine() -> PolyBool {
    PolyBool::new(CsgParams::default()).unwrap()
}

/// Area of the symmetric difference; zero when both describe the same set.
fn mismatch(a: &Polygon, b: &Polygon) -> f64 {
    engine().xor(a, b).unwrap().area()
}

fn l_shape() -> Polygon {
    poly(vec![
        p(0.0, 0.0),
        p(2.0, 0.0),
        p(2.0, 1.0),
        p(1.0, 1.0),
        p(1.0, 2.0),
        p(0.0, 2.0),
    ])
}

fn triangle() -> Polygon {
    poly(vec![p(0.5, 0.5), p(3.0, 0.5), p(0.5, 3.0)])
}

#[test]
fn unit_square_triangulates_into_two_triangles() {
    init_tracing();
    let mut shard = ShardPolygon::new(rect(0.0, 0.0, 1.0, 1.0));
    shard.triangulate(TriangulateOptions::default()).unwrap();
    let mesh = shard.mesh().unwrap();
    assert_eq!(mesh.triangles.len(), 2);
    assert_relative_eq!(mesh.area(), 1.0, epsilon = 1e-12);
}

#[test]
fn offset_squares_union_to_one_region() {
    init_tracing();
    let r = engine()
        .union(&poly(rect(0.0, 0.0, 1.0, 1.0)), &poly(rect(0.5, 0.0, 1.5, 1.0)))
        .unwrap();
    assert_eq!(r.regions.len(), 1);
    assert_relative_eq!(r.area(), 1.5, epsilon = TOL);
}

#[test]
fn concentric_difference_has_hole() {
    init_tracing();
    let r = engine()
        .difference(&poly(rect(-1.0, -1.0, 1.0, 1.0)), &poly(rect(-0.5, -0.5, 0.5, 0.5)))
        .unwrap();
    let shapes = r.shapes();
    assert_eq!(shapes.len(), 1);
    assert_eq!(shapes[0].holes.len(), 1);
    assert!(signed_area(&shapes[0].outer) > 0.0);
    assert!(signed_area(&shapes[0].holes[0]) < 0.0);
    assert_relative_eq!(r.area(), 3.0, epsilon = TOL);
}

#[test]
fn horizontal_cut_halves_square() {
    init_tracing();
    let r = engine()
        .cut_with_line(&poly(rect(0.0, 0.0, 1.0, 1.0)), &[p(-1.0, 0.5), p(2.0, 0.5)])
        .unwrap();
    for half in [&r.inside, &r.outside] {
        assert_eq!(half.regions.len(), 1);
        assert_relative_eq!(half.area(), 0.5, epsilon = TOL);
    }
}

#[test]
fn regular_tetrahedron_hull() {
    init_tracing();
    let pts = vec![
        Point3::new(1.0, 1.0, 1.0),
        Point3::new(1.0, -1.0, -1.0),
        Point3::new(-1.0, 1.0, -1.0),
        Point3::new(-1.0, -1.0, 1.0),
    ];
    let mesh = ConvexHull::new(pts).execute().unwrap();
    assert_eq!(mesh.indices.len(), 4);
    for (n, &[a, _, _]) in mesh.face_normals().iter().zip(&mesh.indices) {
        assert!(n.dot(&mesh.vertices[a as usize].coords) > 0.0);
    }
}

#[test]
fn two_point_polygon_fails_cleanly() {
    init_tracing();
    let err = Triangulate::polygon(&[p(0.0, 0.0), p(1.0, 0.0)])
        .execute()
        .unwrap_err();
    assert!(matches!(
        err,
        ShardError::Triangulation(TriangulationError::TooFewPoints(2))
    ));
}

#[test]
fn coplanar_hull_fails_cleanly() {
    init_tracing();
    let pts = (0..6)
        .map(|i| Point3::new(f64::from(i), f64::from(i * i), 0.0))
        .collect();
    assert!(matches!(
        ConvexHull::new(pts).execute(),
        Err(ShardError::Hull(HullError::Degenerate))
    ));
}

#[test]
fn union_with_itself_is_identity() {
    init_tracing();
    let a = l_shape();
    let u = engine().union(&a, &a).unwrap();
    assert_relative_eq!(u.area(), 3.0, epsilon = TOL);
    assert!(mismatch(&u, &a) < TOL);
}

#[test]
fn intersect_with_itself_is_identity() {
    init_tracing();
    let a = l_shape();
    let i = engine().intersect(&a, &a).unwrap();
    assert!(mismatch(&i, &a) < TOL);
}

#[test]
fn difference_with_itself_is_empty() {
    init_tracing();
    let a = l_shape();
    let d = engine().difference(&a, &a).unwrap();
    assert!(d.is_empty());
}

#[test]
fn union_and_intersect_areas() {
    init_tracing();
    let e = engine();
    let (a, b) = (l_shape(), triangle());
    assert_relative_eq!(e.intersect(&a, &b).unwrap().area(), 1.25, epsilon = TOL);
    assert_relative_eq!(e.union(&a, &b).unwrap().area(), 4.875, epsilon = TOL);
}

#[test]
fn union_commutes() {
    init_tracing();
    let e = engine();
    let (a, b) = (l_shape(), triangle());
    let ab = e.union(&a, &b).unwrap();
    let ba = e.union(&b, &a).unwrap();
    assert!(mismatch(&ab, &ba) < TOL);
}

#[test]
fn xor_is_union_of_differences() {
    init_tracing();
    let e = engine();
    let (a, b) = (l_shape(), triangle());
    let x = e.xor(&a, &b).unwrap();
    let d = e
        .union(&e.difference(&a, &b).unwrap(), &e.difference(&b, &a).unwrap())
        .unwrap();
    assert!(mismatch(&x, &d) < TOL);
    assert_relative_eq!(x.area(), 4.875 - 1.25, epsilon = TOL);
}

#[test]
fn cut_outside_returns_target_unchanged() {
    init_tracing();
    let a = l_shape();
    let r = engine()
        .cut_with_line(&a, &[p(5.0, -1.0), p(5.0, 3.0)])
        .unwrap();
    assert!(r.inside.is_empty());
    assert_eq!(r.outside.regions.len(), 1);
    assert!(mismatch(&r.outside, &a) < TOL);
}

#[test]
fn cut_outside_in_either_direction_keeps_target_outside() {
    init_tracing();
    let a = l_shape();
    // passes through the notch of the L without touching it
    for line in [[p(1.5, 2.0), p(2.0, 1.5)], [p(2.0, 1.5), p(1.5, 2.0)]] {
        let r = engine().cut_with_line(&a, &line).unwrap();
        assert!(r.inside.is_empty());
        assert!(mismatch(&r.outside, &a) < TOL);
    }
}
