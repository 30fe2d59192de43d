use crate::boolean::{BooleanOp, CsgParams};
use crate::error::Result;
use crate::shard::{ShardId, ShardPolygon, ShardSet};

use super::engine::{boolean_compute, commit};

/// Joins shards into one or more shards.
pub struct UnionShards {
    shards: Vec<ShardId>,
    params: CsgParams,
    triangulate: bool,
}

impl UnionShards {
    /// Creates a new `UnionShards` operation.
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
    /// Returns [`OperationError::InvalidInput`](crate::error::OperationError)
    /// if no shard is given, `ShardNotFound` for a stale id, or a
    /// `BooleanError` if the sweep fails.
    pub fn compute(&self, set: &ShardSet) -> Result<Vec<ShardPolygon>> {
        boolean_compute(set, &self.shards, BooleanOp::Union, &self.params, self.triangulate, 1)
    }

    /// Replaces the operand shards with the union.
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
    fn overlapping_shards_merge() {
        let mut set = ShardSet::new();
        let a = set.insert(rect(0.0, 0.0, 1.0, 1.0));
        let b = set.insert(rect(0.5, 0.0, 1.5, 1.0));
        let ids = UnionShards::new(vec![a, b]).execute(&mut set).unwrap();
        assert_eq!(ids.len(), 1);
        assert_eq!(set.len(), 1);
        let shard = set.get(ids[0]).unwrap();
        assert!((shard.area() - 1.5).abs() < 1e-6);
        assert!((shard.mesh().unwrap().area() - 1.5).abs() < 1e-6);
        assert!((shard.pivot().y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn three_operands_fold() {
        let mut set = ShardSet::new();
        let ids = vec![
            set.insert(rect(0.0, 0.0, 1.0, 1.0)),
            set.insert(rect(1.0, 0.0, 2.0, 1.0)),
            set.insert(rect(2.0, 0.0, 3.0, 1.0)),
        ];
        let out = UnionShards::new(ids).compute(&set).unwrap();
        assert_eq!(out.len(), 1);
        assert!((out[0].area() - 3.0).abs() < 1e-6);
        assert_eq!(set.len(), 3, "compute leaves the set alone");
    }

    #[test]
    fn single_operand_is_normalised() {
        let mut set = ShardSet::new();
        let a = set.insert(rect(0.0, 0.0, 2.0, 2.0));
        let out = UnionShards::new(vec![a])
            .with_triangulation(false)
            .compute(&set)
            .unwrap();
        assert_eq!(out.len(), 1);
        assert!(out[0].mesh().is_none());
        assert!((out[0].area() - 4.0).abs() < 1e-6);
    }

    #[test]
    fn empty_operand_list_is_rejected() {
        let mut set = ShardSet::new();
        set.insert(rect(0.0, 0.0, 1.0, 1.0));
        let err = UnionShards::new(vec![]).execute(&mut set).unwrap_err();
        assert!(matches!(err, ShardError::Operation(OperationError::InvalidInput(_))));
        assert_eq!(set.len(), 1);
    }
}
