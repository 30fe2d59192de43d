use crate::error::{OperationError, Result};
use crate::hull::{ConvexHull, HullMesh, HullParams};
use crate::math::polygon_2d::{classify_turns, TurnClass};
use crate::math::{Point2, Point3, TOLERANCE};
use crate::shard::{ShardId, ShardSet};

/// Builds a closed 3D collision mesh for a shard by extruding its outline
/// symmetrically around z = 0.
///
/// Convex outlines become an exact prism. Concave outlines are wrapped in the
/// convex hull of the extruded points, since physics colliders must be
/// convex. Coordinates are relative to the shard pivot.
pub struct ExtrudeCollider {
    shard: ShardId,
    thickness: f64,
    hull_params: HullParams,
}

impl ExtrudeCollider {
    /// Creates a new `ExtrudeCollider` operation.
    #[must_use]
    pub fn new(shard: ShardId, thickness: f64) -> Self {
        Self {
            shard,
            thickness,
            hull_params: HullParams::default(),
        }
    }

    #[must_use]
    pub fn with_hull_params(mut self, params: HullParams) -> Self {
        self.hull_params = params;
        self
    }

    /// Executes the extrusion.
    ///
    /// # Errors
    ///
    /// Returns `ShardNotFound` for a stale id and the errors of
    /// [`extrude_outline`].
    pub fn execute(&self, set: &ShardSet) -> Result<HullMesh> {
        let shard = set.get(self.shard)?;
        let pivot = shard.pivot();
        let local: Vec<Point2> = shard
            .edges()
            .iter()
            .map(|p| Point2::from(p - pivot))
            .collect();
        extrude_outline(&local, self.thickness, self.hull_params)
    }
}

/// Extrudes a closed outline into a collision mesh with faces wound
/// counter-clockwise seen from outside.
///
/// # Errors
///
/// Returns `OperationError::InvalidInput` if `thickness` is not positive or
/// the outline has no area, and a `HullError` if a concave outline cannot be
/// wrapped.
#[allow(clippy::cast_possible_truncation)]
pub fn extrude_outline(outline: &[Point2], thickness: f64, params: HullParams) -> Result<HullMesh> {
    if !(thickness.is_finite() && thickness > TOLERANCE) {
        return Err(OperationError::InvalidInput(format!(
            "collider thickness must be positive, got {thickness}"
        ))
        .into());
    }
    let half = thickness * 0.5;

    let ccw: Vec<Point2> = match classify_turns(outline) {
        TurnClass::Degenerate => {
            return Err(OperationError::InvalidInput("collider outline has no area".into()).into());
        }
        TurnClass::Mixed => {
            let points: Vec<Point3> = outline
                .iter()
                .flat_map(|p| [Point3::new(p.x, p.y, -half), Point3::new(p.x, p.y, half)])
                .collect();
            return ConvexHull::new(points).with_params(params).execute();
        }
        TurnClass::Left => outline.to_vec(),
        TurnClass::Right => outline.iter().rev().copied().collect(),
    };

    let n = ccw.len();
    let mut vertices = Vec::with_capacity(n * 2);
    vertices.extend(ccw.iter().map(|p| Point3::new(p.x, p.y, -half)));
    vertices.extend(ccw.iter().map(|p| Point3::new(p.x, p.y, half)));

    let n32 = n as u32;
    let mut indices = Vec::with_capacity(4 * n);
    for i in 1..n32 - 1 {
        // front cap faces -z, back cap faces +z
        indices.push([0, i + 1, i]);
        indices.push([n32, n32 + i, n32 + i + 1]);
    }
    for i in 0..n32 {
        let j = (i + 1) % n32;
        indices.push([i, j, n32 + j]);
        indices.push([i, n32 + j, n32 + i]);
    }
    Ok(HullMesh { vertices, indices })
}
