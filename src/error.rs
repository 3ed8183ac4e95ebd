//! # Engine Error Types
//!
//! Errors surfaced by fallible engine setup and by the external-service adapters
//! (palette files, chunk stores, generators, PNG export).
//!
//! Per-frame work never returns these: chunk load and generation failures are
//! logged and degrade to an empty chunk inside the world manager.

use cgmath::Point3;
use thiserror::Error;

use crate::engine_state::voxels::block::VoxelId;

/// Errors that can occur in the voxel engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Filesystem access failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON document (config, palette, world metadata) could not be read or written.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Encoding a captured frame failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Persisted chunk data did not decode to a valid voxel array.
    #[error("corrupt chunk at ({}, {}, {}): {reason}", position.x, position.y, position.z)]
    CorruptChunk {
        /// Chunk-grid position of the offending chunk.
        position: Point3<i32>,
        /// What was wrong with the data.
        reason: String,
    },

    /// A voxel id outside `0..=palette_size` was written.
    #[error("voxel id {id} is outside the palette (size {palette_size})")]
    InvalidVoxelId {
        /// The rejected id.
        id: VoxelId,
        /// Number of non-empty voxel types in the palette.
        palette_size: usize,
    },

    /// A terrain generator could not produce a chunk.
    #[error("terrain generation failed: {0}")]
    Generation(String),

    /// A key binding named a key code that does not exist.
    #[error("unknown key name: {0}")]
    UnknownKey(String),
}

/// Result alias used across the engine.
pub type Result<T> = std::result::Result<T, EngineError>;
