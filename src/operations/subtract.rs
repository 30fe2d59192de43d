use crate::boolean::{BooleanOp, CsgParams};
use crate::error::Result;
use crate::shard::{ShardId, ShardPolygon, ShardSet};

use super::engine::{boolean_compute, commit};

/// Subtracts every following shard from the first one.
pub struct SubtractShards {
    shards: Vec<ShardId>,
    params: CsgParams,
    triangulate: bool,
}

impl SubtractShards {
    /// Creates a new `SubtractShards` operation. `shards[0]` is the subject.
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
        boolean_compute(set, &self.shards, BooleanOp::Difference, &self.params, self.triangulate, 2)
    }

    /// Replaces all operand shards with the difference.
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
    use crate::error::{OperationError, ShardError};
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
    fn inner_square_leaves_shard_with_hole() {
        let mut set = ShardSet::new();
        let outer = set.insert(rect(-1.0, -1.0, 1.0, 1.0));
        let inner = set.insert(rect(-0.5, -0.5, 0.5, 0.5));
        let ids = SubtractShards::new(vec![outer, inner]).execute(&mut set).unwrap();
        assert_eq!(ids.len(), 1);
        assert_eq!(set.len(), 1);
        let shard = set.get(ids[0]).unwrap();
        assert_eq!(shard.holes().len(), 1);
        assert!((shard.area() - 3.0).abs() < 1e-6);
        assert!((shard.mesh().unwrap().area() - 3.0).abs() < 1e-6);
        assert!(!shard.contains(&Point2::origin()));
    }

    #[test]
    fn splitting_bar_leaves_two_shards() {
        let mut set = ShardSet::new();
        let ids = vec![
            set.insert(rect(0.0, 0.0, 3.0, 1.0)),
            set.insert(rect(1.0, -1.0, 2.0, 2.0)),
        ];
        let out = SubtractShards::new(ids).compute(&set).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|s| (s.area() - 1.0).abs() < 1e-6));
    }

    #[test]
    fn single_operand_is_rejected() {
        let mut set = ShardSet::new();
        let a = set.insert(rect(0.0, 0.0, 1.0, 1.0));
        let err = SubtractShards::new(vec![a]).execute(&mut set).unwrap_err();
        assert!(matches!(err, ShardError::Operation(OperationError::InvalidInput(_))));
        assert!(set.contains(a));
    }
}
