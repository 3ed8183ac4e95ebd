//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a fixed 16x16x16 block of voxel
//! ids plus the face list built from it.
//!
//! ## Storage
//!
//! - `voxels`: one [`VoxelId`] per position, flat, indexed by
//!   `x + y * CHUNK_DIMENSION + z * CHUNK_PLANE_SIZE`
//! - `solid_array`: a bit vector mirroring `voxels != 0`, so the mesh builder
//!   can visit only the solid voxels (see [`chunk_iteration`])
//!
//! Both are kept in step by every write. The face list is derived data and is
//! replaced wholesale by the world whenever the chunk (or, under the loaded
//! neighbor policy, a chunk next to it) changes.

use bitvec::prelude::BitVec;
use cgmath::Point3;

use super::block::{VoxelId, EMPTY_VOXEL};
use crate::engine_state::rendering::meshing::Face;
use chunk_iteration::ChunkVoxelIterator;

pub mod chunk_iteration;

/// The dimension (width, height, depth) of a chunk in voxels.
pub const CHUNK_DIMENSION: i32 = 16;
/// The number of voxels in a single 2D plane of a chunk (CHUNK_DIMENSION²).
pub const CHUNK_PLANE_SIZE: i32 = CHUNK_DIMENSION * CHUNK_DIMENSION;
/// The total number of voxels in a chunk (CHUNK_DIMENSION³).
pub const CHUNK_SIZE: i32 = CHUNK_PLANE_SIZE * CHUNK_DIMENSION;

/// Represents a 16x16x16 collection of voxels in the world.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not voxel coordinates).
    pub position: Point3<i32>,
    voxels: Vec<VoxelId>,
    solid_array: BitVec,
    faces: Vec<Face>,
}

/// Whether a chunk-local coordinate lies inside the chunk on all three axes.
pub fn in_bounds(local: Point3<i32>) -> bool {
    (0..CHUNK_DIMENSION).contains(&local.x)
        && (0..CHUNK_DIMENSION).contains(&local.y)
        && (0..CHUNK_DIMENSION).contains(&local.z)
}

/// Converts a chunk-local position to an index into the voxel array.
pub fn to_flat(local: Point3<i32>) -> usize {
    (local.x + local.y * CHUNK_DIMENSION + local.z * CHUNK_PLANE_SIZE) as usize
}

/// Converts an index into the voxel array back to a chunk-local position.
pub fn to_3d(index: usize) -> Point3<i32> {
    let index = index as i32;
    let z = index / CHUNK_PLANE_SIZE;
    let y = (index % CHUNK_PLANE_SIZE) / CHUNK_DIMENSION;
    let x = index % CHUNK_DIMENSION;
    Point3::new(x, y, z)
}

impl Chunk {
    /// Creates a new, completely empty chunk.
    pub fn empty(position: Point3<i32>) -> Self {
        Self::from_voxels(position, vec![EMPTY_VOXEL; CHUNK_SIZE as usize])
    }

    /// Creates a chunk where every voxel is `id`.
    pub fn solid(position: Point3<i32>, id: VoxelId) -> Self {
        Self::from_voxels(position, vec![id; CHUNK_SIZE as usize])
    }

    /// Wraps an existing voxel array.
    ///
    /// # Panics
    /// Panics if `voxels` is not exactly [`CHUNK_SIZE`] long. Callers that read
    /// untrusted data check the length first.
    pub fn from_voxels(position: Point3<i32>, voxels: Vec<VoxelId>) -> Self {
        assert_eq!(
            voxels.len(),
            CHUNK_SIZE as usize,
            "chunk voxel array must hold {} voxels",
            CHUNK_SIZE
        );
        let solid_array = voxels.iter().map(|&id| id != EMPTY_VOXEL).collect();
        Chunk {
            position,
            voxels,
            solid_array,
            faces: Vec::new(),
        }
    }

    /// The raw voxel ids in flat index order.
    pub fn voxels(&self) -> &[VoxelId] {
        &self.voxels
    }

    /// Gets the voxel at a chunk-local position.
    ///
    /// Positions outside the chunk read as empty, so meshing a chunk on its own
    /// shows its boundary faces instead of leaving holes.
    pub fn voxel_at(&self, local: Point3<i32>) -> VoxelId {
        if in_bounds(local) {
            self.voxels[to_flat(local)]
        } else {
            EMPTY_VOXEL
        }
    }

    /// Checks if the voxel at the specified chunk-local position is solid.
    ///
    /// # Returns
    /// `true` if the voxel is non-empty, `false` if it's air or out of bounds.
    pub fn is_voxel_solid(&self, local: Point3<i32>) -> bool {
        in_bounds(local) && self.solid_array[to_flat(local)]
    }

    /// Writes a voxel id, keeping the solidity mask in step.
    ///
    /// The face list is not touched; the owner rebuilds it.
    ///
    /// # Panics
    /// Panics if `local` is outside the chunk on any axis. World coordinates are
    /// mapped with floored division, so this only fires on a logic error.
    pub fn set_voxel(&mut self, local: Point3<i32>, id: VoxelId) {
        assert!(
            in_bounds(local),
            "local position {:?} is outside the chunk",
            local
        );
        let index = to_flat(local);
        self.voxels[index] = id;
        self.solid_array.set(index, id != EMPTY_VOXEL);
    }

    /// Number of non-empty voxels.
    pub fn count_non_empty(&self) -> usize {
        self.solid_array.count_ones()
    }

    /// Iterates over the non-empty voxels in flat index order.
    pub fn solid_voxels(&self) -> ChunkVoxelIterator<'_> {
        ChunkVoxelIterator::new(self, &self.solid_array)
    }

    /// The faces built by the last mesh rebuild.
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Replaces the cached face list.
    pub fn replace_faces(&mut self, faces: Vec<Face>) {
        self.faces = faces;
    }

    /// Offsets (in chunks) of the neighbors that share a face with `local`.
    ///
    /// Empty for interior voxels. A corner voxel touches three neighbors.
    pub fn touching_neighbors(local: Point3<i32>) -> Vec<cgmath::Vector3<i32>> {
        let mut offsets = Vec::new();
        let last = CHUNK_DIMENSION - 1;
        let axes = [local.x, local.y, local.z];
        for (axis, value) in axes.into_iter().enumerate() {
            let mut offset = [0; 3];
            if value == 0 {
                offset[axis] = -1;
            } else if value == last {
                offset[axis] = 1;
            } else {
                continue;
            }
            offsets.push(offset.into());
        }
        offsets
    }
}
