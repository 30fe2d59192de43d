//! Edits over a [`ShardSet`](crate::shard::ShardSet).
//!
//! Each operation computes its result first and only then swaps the operand
//! shards for the results, so a failed operation leaves the set as it was.

mod collider;
mod engine;
mod intersect;
mod split;
mod subtract;
mod union;

pub use collider::{extrude_outline, ExtrudeCollider};
pub use intersect::IntersectShards;
pub use split::SplitShards;
pub use subtract::SubtractShards;
pub use union::UnionShards;
