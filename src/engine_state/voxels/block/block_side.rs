//! # Block Side Module
//!
//! This module defines the six faces of a voxel and the static geometry tables
//! every face shares: the unit-cube corner offsets, the four corners that make
//! up each side, and each side's outward normal.
//!
//! World `+Y` points down, so the TOP side faces `-Y`.

use cgmath::Vector3;
use num_derive::FromPrimitive;

/// Offsets of the eight corners of a unit cube centred on a voxel's integer position.
pub const UNIT_CUBE_VERTICES: [[f32; 3]; 8] = [
    [-0.5, -0.5, -0.5],
    [0.5, -0.5, -0.5],
    [0.5, 0.5, -0.5],
    [-0.5, 0.5, -0.5],
    [-0.5, -0.5, 0.5],
    [0.5, -0.5, 0.5],
    [0.5, 0.5, 0.5],
    [-0.5, 0.5, 0.5],
];

/// Corner indices into [`UNIT_CUBE_VERTICES`] for each side, in polygon winding order.
pub const SIDE_VERTEX_INDICES: [[usize; 4]; 6] = [
    [0, 1, 2, 3], // FRONT
    [4, 5, 6, 7], // BACK
    [4, 0, 3, 7], // LEFT
    [1, 5, 6, 2], // RIGHT
    [4, 5, 1, 0], // TOP
    [3, 2, 6, 7], // BOTTOM
];

/// Outward unit normal of each side, as integer offsets to the neighboring voxel.
pub const SIDE_NORMALS: [[i32; 3]; 6] = [
    [0, 0, -1],
    [0, 0, 1],
    [-1, 0, 0],
    [1, 0, 0],
    [0, -1, 0],
    [0, 1, 0],
];

/// Represents the six possible faces of a voxel.
///
/// The discriminant is the face-orientation index stored in every
/// [`Face`](crate::engine_state::rendering::meshing::Face) and used to index
/// the static tables above.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug, FromPrimitive)]
pub enum BlockSide {
    /// Facing negative Z
    FRONT = 0,

    /// Facing positive Z
    BACK = 1,

    /// Facing negative X
    LEFT = 2,

    /// Facing positive X
    RIGHT = 3,

    /// Facing negative Y (up)
    TOP = 4,

    /// Facing positive Y (down)
    BOTTOM = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in index order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::LEFT,
            BlockSide::RIGHT,
            BlockSide::TOP,
            BlockSide::BOTTOM,
        ]
    }

    /// Converts a face-orientation index back into a side.
    ///
    /// # Returns
    /// `None` if `index` is not in `0..6`.
    pub fn from_index(index: u8) -> Option<Self> {
        num::FromPrimitive::from_u8(index)
    }

    /// The face-orientation index of this side.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Integer offset from a voxel to the neighbor this side faces.
    pub fn offset(self) -> Vector3<i32> {
        SIDE_NORMALS[self.index()].into()
    }

    /// Outward unit normal of this side.
    pub fn normal(self) -> Vector3<f32> {
        let [x, y, z] = SIDE_NORMALS[self.index()];
        Vector3::new(x as f32, y as f32, z as f32)
    }

    /// Corner offsets of this side relative to the voxel position, in winding order.
    pub fn corners(self) -> [Vector3<f32>; 4] {
        SIDE_VERTEX_INDICES[self.index()].map(|i| UNIT_CUBE_VERTICES[i].into())
    }
}
