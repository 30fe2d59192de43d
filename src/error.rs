use thiserror::Error;

/// Top-level error type for shardkit.
#[derive(Debug, Error)]
pub enum ShardError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Triangulation(#[from] TriangulationError),

    #[error(transparent)]
    Boolean(#[from] BooleanError),

    #[error(transparent)]
    Hull(#[from] HullError),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// Errors related to basic geometric queries.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("point index {index} is out of range for a polygon of {len} points")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Errors raised by the triangulator.
///
/// These are routine during interactive editing (a polygon mid-edit with two
/// points) and callers are expected to skip the polygon rather than abort.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TriangulationError {
    #[error("polygon has {0} distinct points, at least 3 are required")]
    TooFewPoints(usize),

    #[error("triangulation produced no interior triangles")]
    NoTriangles,
}

/// Errors raised by the polygon boolean engine.
#[derive(Debug, Error, PartialEq)]
pub enum BooleanError {
    #[error("invalid CSG parameters: {0}")]
    InvalidParams(String),

    #[error("zero-length segment reached the sweep; epsilon is probably too small or too large")]
    ZeroLengthSegment,

    #[error("segment fill was not resolved during the sweep")]
    UnresolvedFill,
}

/// Errors raised by the convex hull calculator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HullError {
    #[error("hull needs at least 4 points, got {0}")]
    TooFewPoints(usize),

    #[error("no four non-coplanar points found; a 3D hull does not exist")]
    Degenerate,
}

/// Errors related to shard-level operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("shard not found")]
    ShardNotFound,
}

/// Convenience type alias for results using [`ShardError`].
pub type Result<T> = std::result::Result<T, ShardError>;
