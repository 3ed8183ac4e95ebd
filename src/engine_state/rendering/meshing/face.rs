use cgmath::{Point3, Vector3};

use crate::config::Rgb;
use crate::engine_state::voxels::block::block_side::BlockSide;

/// Represents a single visible quad of one voxel.
///
/// A face stores the voxel it belongs to, which of the six sides it is and the
/// color resolved from the palette when the mesh was built. The four corner
/// points are derived on demand from the static side tables, so faces stay
/// small and `Copy`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// World voxel coordinate of the voxel this face belongs to
    pub position: Point3<i32>,
    /// Which side of the voxel this face represents
    pub side: BlockSide,
    /// Fill color, resolved from the voxel type at build time
    pub color: Rgb,
}

impl Face {
    pub fn new(position: Point3<i32>, side: BlockSide, color: Rgb) -> Self {
        Face {
            position,
            side,
            color,
        }
    }

    /// The voxel position as a float point (the centre of the voxel).
    pub fn origin(&self) -> Point3<f32> {
        Point3::new(
            self.position.x as f32,
            self.position.y as f32,
            self.position.z as f32,
        )
    }

    /// Outward unit normal.
    pub fn normal(&self) -> Vector3<f32> {
        self.side.normal()
    }

    /// The four world-space corners in winding order.
    pub fn vertices(&self) -> [Point3<f32>; 4] {
        let origin = self.origin();
        self.side.corners().map(|corner| origin + corner)
    }
}
