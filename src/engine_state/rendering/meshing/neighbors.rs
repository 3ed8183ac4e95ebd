//! How the mesh builder resolves voxels just outside a chunk.

use cgmath::Point3;
use serde::{Deserialize, Serialize};

use crate::engine_state::voxels::block::{VoxelId, EMPTY_VOXEL};

/// Selects how faces on a chunk boundary are culled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NeighborPolicy {
    /// Everything outside the chunk counts as empty. Boundary faces are always
    /// emitted, even against a solid loaded neighbor.
    #[default]
    Isolated,
    /// Query the loaded neighbor chunk; only an unloaded neighbor counts as empty.
    LoadedNeighbors,
}

/// Answers voxel queries that fall outside the chunk being meshed.
pub trait NeighborLookup {
    /// Voxel at `local`, a position relative to chunk `chunk` that lies outside it.
    fn voxel_outside(&self, chunk: Point3<i32>, local: Point3<i32>) -> VoxelId;
}

/// Lookup used by [`NeighborPolicy::Isolated`].
pub struct IsolatedNeighbors;

impl NeighborLookup for IsolatedNeighbors {
    fn voxel_outside(&self, _chunk: Point3<i32>, _local: Point3<i32>) -> VoxelId {
        EMPTY_VOXEL
    }
}
