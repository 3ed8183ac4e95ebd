//! # Chunk Iteration Module
//!
//! Iteration over the non-empty voxels of a chunk. The solidity bit vector is
//! scanned for set bits, so air costs one bit test rather than a voxel read.

use bitvec::prelude::{BitSlice, Lsb0};
use bitvec::slice::IterOnes;
use cgmath::Point3;

use super::{to_3d, Chunk};
use crate::engine_state::voxels::block::VoxelId;

/// An iterator over all non-empty voxels in a chunk, yielding the chunk-local
/// position and id of each.
pub struct ChunkVoxelIterator<'a> {
    /// Reference to the chunk being iterated over
    chunk_ref: &'a Chunk,
    /// Set-bit cursor over the chunk's solidity mask
    solid_offsets: IterOnes<'a, usize, Lsb0>,
}

impl<'a> ChunkVoxelIterator<'a> {
    /// Creates a new iterator positioned before the first solid voxel.
    pub(super) fn new(chunk_ref: &'a Chunk, solid_array: &'a BitSlice) -> Self {
        ChunkVoxelIterator {
            chunk_ref,
            solid_offsets: solid_array.iter_ones(),
        }
    }
}

impl Iterator for ChunkVoxelIterator<'_> {
    type Item = (Point3<i32>, VoxelId);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.solid_offsets.next()?;
        Some((to_3d(index), self.chunk_ref.voxels()[index]))
    }
}
