//! # Block Module
//!
//! This module provides the voxel id type, the six block sides with their
//! static geometry tables, and the voxel palette that maps ids to colors.

pub mod block_side;
pub mod palette;

pub use palette::{JsonPaletteStore, MemoryPaletteStore, PaletteStore, VoxelPalette, VoxelType};

/// The underlying integer type used to represent voxel types in memory.
///
/// `0` is empty space; `1..=N` index into the [`VoxelPalette`] at `id - 1`.
pub type VoxelId = u8;

/// The id of an empty (air) voxel.
pub const EMPTY_VOXEL: VoxelId = 0;
