use crate::boolean::{BooleanOp, CsgParams};
use crate::error::Result;
use crate::shard::{ShardId, ShardPolygon, ShardSet};

use super::engine::{boolean_compute, commit};

/// Keeps the area common to all shards.
pub struct IntersectShards {
    shards: Vec<ShardId>,
    params: CsgParams,
    triangulate: bool,
}

impl IntersectShards {
    /// Creates a new `IntersectShards` operation.
    #[must_use]
    pub fn new(shards: Vec<ShardId>) -> Self {
        Self {
            shards,
            params: CsgParams::default(),
            triangulate: true,
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: CsgParams) -> Self {
        self.params = params;
        self
    }

    /// Whether result shards are triangulated (default `true`).
    #[must_use]
    pub fn with_triangulation(mut self, triangulate: bool) -> Self {
        self.triangulate = triangulate;
        self
    }

    /// Computes the result shards without touching the set.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` for fewer than two shards,
    /// `ShardNotFound` for a stale id, or a `BooleanError` if the sweep fails.
    pub fn compute(&self, set: &ShardSet) -> Result<Vec<ShardPolygon>> {
        boolean_compute(set, &self.shards, BooleanOp::Intersect, &self.params, self.triangulate, 2)
    }

    /// Replaces all operand shards with the intersection, which may be empty.
    ///
    /// # Errors
    ///
    /// Same as [`compute`](Self::compute); the set is unchanged on error.
    pub fn execute(&self, set: &mut ShardSet) -> Result<Vec<ShardId>> {
        let results = self.compute(set)?;
        Ok(commit(set, &self.shards, results))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point2;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> ShardPolygon {
        ShardPolygon::new(vec![
            Point2::new(x0, y0),
            Point2::new(x1, y0),
            Point2::new(x1, y1),
            Point2::new(x0, y1),
        ])
    }

    #[test]
    fn overlap_of_three_shards() {
        let mut set = ShardSet::new();
        let ids = vec![
            set.insert(rect(0.0, 0.0, 2.0, 2.0)),
            set.insert(rect(1.0, 0.0, 3.0, 2.0)),
            set.insert(rect(0.0, 1.0, 3.0, 3.0)),
        ];
        let out = IntersectShards::new(ids).execute(&mut set).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(set.len(), 1);
        assert!((set.get(out[0]).unwrap().area() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn disjoint_shards_vanish() {
        let mut set = ShardSet::new();
        let ids = vec![
            set.insert(rect(0.0, 0.0, 1.0, 1.0)),
            set.insert(rect(5.0, 5.0, 6.0, 6.0)),
        ];
        let out = IntersectShards::new(ids).execute(&mut set).unwrap();
        assert!(out.is_empty());
        assert!(set.is_empty());
    }

    #[test]
    fn bad_params_leave_set_untouched() {
        let mut set = ShardSet::new();
        let ids = vec![
            set.insert(rect(0.0, 0.0, 1.0, 1.0)),
            set.insert(rect(0.5, 0.5, 1.5, 1.5)),
        ];
        let params = CsgParams {
            precision: 0,
            ..CsgParams::default()
        };
        assert!(IntersectShards::new(ids).with_params(params).execute(&mut set).is_err());
        assert_eq!(set.len(), 2);
    }
}
