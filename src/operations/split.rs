use tracing::debug;

use crate::boolean::{CsgParams, PolyBool};
use crate::error::{OperationError, Result};
use crate::math::Point2;
use crate::shard::{ShardId, ShardPolygon, ShardSet};

use super::engine::{commit, operands, shards_from_polygon};

/// Splits shards along a polyline.
///
/// An open line is extended past its ends so it crosses every shard it
/// reaches; a line whose first and last points coincide is used as a closed
/// cutter. Each shard contributes its pieces on both sides of the line.
pub struct SplitShards {
    shards: Vec<ShardId>,
    line: Vec<Point2>,
    params: CsgParams,
    triangulate: bool,
}

impl SplitShards {
    /// Creates a new `SplitShards` operation.
    #[must_use]
    pub fn new(shards: Vec<ShardId>, line: Vec<Point2>) -> Self {
        Self {
            shards,
            line,
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

    /// Computes the pieces without touching the set: for each shard in
    /// order, the pieces inside the cutter followed by those outside.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` if no shard is given or the
    /// line has fewer than two distinct points, `ShardNotFound` for a stale
    /// id, or a `BooleanError` if a sweep fails.
    pub fn compute(&self, set: &ShardSet) -> Result<Vec<ShardPolygon>> {
        if self.line.len() < 2 {
            return Err(OperationError::InvalidInput(format!(
                "cut line needs at least 2 points, got {}",
                self.line.len()
            ))
            .into());
        }
        let shards = operands(set, &self.shards, 1)?;
        let engine = PolyBool::new(self.params)?;
        let cutter = engine.cutter_from_line(&self.line).ok_or_else(|| {
            OperationError::InvalidInput("cut line does not describe a cutter".into())
        })?;
        let cutter = engine.segments(&cutter)?;

        let mut pieces = Vec::new();
        for shard in shards {
            let cut = engine.cut_segments(&shard.to_polygon(), &cutter)?;
            pieces.extend(shards_from_polygon(&cut.inside, self.triangulate));
            pieces.extend(shards_from_polygon(&cut.outside, self.triangulate));
        }
        debug!(operands = self.shards.len(), pieces = pieces.len(), "shards split");
        Ok(pieces)
    }

    /// Replaces the operand shards with their pieces.
    ///
    /// # Errors
    ///
    /// Same as [`compute`](Self::compute); the set is unchanged on error.
    pub fn execute(&self, set: &mut ShardSet) -> Result<Vec<ShardId>> {
        let pieces = self.compute(set)?;
        Ok(commit(set, &self.shards, pieces))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ShardError;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn horizontal_line_halves_quad() {
        let mut set = ShardSet::new();
        let quad = set.init_as_quad();
        let ids = SplitShards::new(vec![quad], vec![p(-0.5, 0.5), p(1.5, 0.5)])
            .execute(&mut set)
            .unwrap();
        assert_eq!(ids.len(), 2);
        assert!(!set.contains(quad));
        for id in ids {
            let shard = set.get(id).unwrap();
            assert!((shard.area() - 0.5).abs() < 1e-6);
            assert!(shard.is_triangulated());
        }
    }

    #[test]
    fn bent_line_cuts_corner_off() {
        let mut set = ShardSet::new();
        let quad = set.init_as_quad();
        // an L through the top right quarter
        let line = vec![p(0.5, 2.0), p(0.5, 0.5), p(2.0, 0.5)];
        let pieces = SplitShards::new(vec![quad], line).compute(&set).unwrap();
        assert_eq!(pieces.len(), 2);
        let mut areas: Vec<f64> = pieces.iter().map(ShardPolygon::area).collect();
        areas.sort_by(f64::total_cmp);
        assert!((areas[0] - 0.25).abs() < 1e-6, "got {areas:?}");
        assert!((areas[1] - 0.75).abs() < 1e-6, "got {areas:?}");
    }

    #[test]
    fn every_operand_is_split() {
        let mut set = ShardSet::new();
        let left = set.insert(ShardPolygon::new(vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)]));
        let right = set.insert(ShardPolygon::new(vec![p(2.0, 0.0), p(3.0, 0.0), p(3.0, 1.0), p(2.0, 1.0)]));
        let ids = SplitShards::new(vec![left, right], vec![p(-1.0, 0.25), p(4.0, 0.25)])
            .with_triangulation(false)
            .execute(&mut set)
            .unwrap();
        assert_eq!(ids.len(), 4);
        assert!((set.area() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn short_line_is_rejected() {
        let mut set = ShardSet::new();
        let quad = set.init_as_quad();
        let err = SplitShards::new(vec![quad], vec![p(0.0, 0.0)])
            .execute(&mut set)
            .unwrap_err();
        assert!(matches!(err, ShardError::Operation(OperationError::InvalidInput(_))));
        assert!(set.contains(quad));
    }
}
