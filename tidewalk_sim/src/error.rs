// Error types for the world layer.
//
// Terrain generation itself is total and never returns an error; these
// cover caller mistakes (expanding from a chunk that was never generated),
// bad configuration, and save data that cannot be decoded. Pathfinding has
// no error type: "no path" is an ordinary `None`.

use crate::types::{ChunkCoord, Edge};
use thiserror::Error;

/// Errors from decoding a compressed tile string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A run used a character that is not in the tile registry.
    #[error("unknown tile code {code:?} at offset {offset}")]
    UnknownTileCode { code: char, offset: usize },

    /// A tile code was not followed by a decimal count.
    #[error("malformed run at offset {offset}")]
    MalformedRun { offset: usize },

    /// Run counts did not add up to `size * size`.
    #[error("tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },
}

/// Errors from chunk management, persistence, and configuration.
#[derive(Error, Debug)]
pub enum WorldError {
    /// `expand_chunk` was called on a chunk that does not exist.
    #[error("unknown source chunk {coord}")]
    UnknownSourceChunk { coord: ChunkCoord },

    /// A saved chunk's tile string could not be decoded.
    #[error("corrupt save data in chunk {coord}: {source}")]
    CorruptSaveData {
        coord: ChunkCoord,
        #[source]
        source: CodecError,
    },

    /// `expand_chunk` was asked to step off the end of the chunk lattice.
    #[error("no chunk beyond the {edge} edge of {coord}")]
    ChunkOutOfRange { coord: ChunkCoord, edge: Edge },

    /// A save listed the same chunk coordinate twice.
    #[error("duplicate chunk {coord} in save data")]
    DuplicateChunk { coord: ChunkCoord },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for world operations.
pub type WorldResult<T> = Result<T, WorldError>;
