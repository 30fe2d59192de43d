use tracing::{debug, warn};

use crate::boolean::{BooleanOp, CsgParams, PolyBool, Polygon};
use crate::error::{OperationError, Result};
use crate::shard::{ShardId, ShardPolygon, ShardSet, TriangulateOptions};

/// Looks up the operand shards, checking there are enough of them.
pub(super) fn operands<'a>(
    set: &'a ShardSet,
    ids: &[ShardId],
    min: usize,
) -> Result<Vec<&'a ShardPolygon>> {
    if ids.len() < min {
        return Err(OperationError::InvalidInput(format!(
            "at least {min} shard(s) required, got {}",
            ids.len()
        ))
        .into());
    }
    ids.iter().map(|&id| set.get(id)).collect()
}

/// Folds `op` over the operands in order: `((s0 op s1) op s2) ...`.
///
/// The running result stays in segment form between steps, so each step only
/// segments the new operand.
pub(super) fn fold(engine: &PolyBool, shards: &[&ShardPolygon], op: BooleanOp) -> Result<Polygon> {
    let Some((first, rest)) = shards.split_first() else {
        return Ok(Polygon::default());
    };
    let mut acc = engine.segments(&first.to_polygon())?;
    for shard in rest {
        let next = engine.segments(&shard.to_polygon())?;
        let combined = engine.combine(&acc, &next)?;
        acc = engine.select(&combined, op)?;
    }
    Ok(engine.polygon(&acc))
}

/// One shard per shape of `polygon`, holes included.
///
/// Shards that fail to triangulate are kept without a mesh.
pub(super) fn shards_from_polygon(polygon: &Polygon, triangulate: bool) -> Vec<ShardPolygon> {
    polygon
        .shapes()
        .into_iter()
        .map(|shape| {
            let mut shard = ShardPolygon::with_holes(shape.outer, shape.holes);
            if triangulate {
                if let Err(e) = shard.triangulate(TriangulateOptions::default()) {
                    warn!(error = %e, "result shard left without mesh");
                }
            }
            shard
        })
        .collect()
}

/// Runs a boolean fold over shards of `set` without modifying it.
pub(super) fn boolean_compute(
    set: &ShardSet,
    ids: &[ShardId],
    op: BooleanOp,
    params: &CsgParams,
    triangulate: bool,
    min_operands: usize,
) -> Result<Vec<ShardPolygon>> {
    let shards = operands(set, ids, min_operands)?;
    let engine = PolyBool::new(*params)?;
    let result = fold(&engine, &shards, op)?;
    let out = shards_from_polygon(&result, triangulate);
    debug!(?op, operands = ids.len(), results = out.len(), "shard boolean computed");
    Ok(out)
}

/// Swaps the operand shards for the results.
pub(super) fn commit(set: &mut ShardSet, ids: &[ShardId], results: Vec<ShardPolygon>) -> Vec<ShardId> {
    for &id in ids {
        set.remove(id);
    }
    results.into_iter().map(|shard| set.insert(shard)).collect()
}
