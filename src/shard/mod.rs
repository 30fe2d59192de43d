//! The shard model: editable outlines, their render meshes, and the arena
//! that owns them.

mod outline;
mod polygon;
mod set;

pub use outline::{boundary_loops, SpriteMesh};
pub use polygon::{ShardMesh, ShardPolygon, TriangulateOptions};
pub use set::{ShardId, ShardSet};
