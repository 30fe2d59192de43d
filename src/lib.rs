pub mod boolean;
pub mod error;
pub mod generate;
pub mod hull;
pub mod math;
pub mod operations;
pub mod shard;
pub mod triangulation;

pub use error::{Result, ShardError};
