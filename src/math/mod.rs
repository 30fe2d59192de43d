pub mod epsilon;
pub mod polygon_2d;

pub use epsilon::{Along, Epsilon, LineIntersection};

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons outside the
/// boolean engine (which carries its own [`Epsilon`]).
pub const TOLERANCE: f64 = 1e-10;

/// Twice the signed area of triangle `(a, b, c)`.
///
/// Positive when the triangle turns counter-clockwise.
#[must_use]
pub fn orient_2d(a: &Point2, b: &Point2, c: &Point2) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}
