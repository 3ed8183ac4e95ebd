//! # Player
//!
//! The player is the camera plus a selected voxel type. Placing and removing
//! voxels acts on the voxel that contains the camera position.

use cgmath::Point3;

use super::camera_state::{camera::Camera, CameraState};
use super::voxels::block::{VoxelId, EMPTY_VOXEL};
use super::voxels::coords::voxel_at_position;
use super::voxels::world::World;
use crate::error::Result;

pub struct Player {
    pub camera_state: CameraState,
    selected_voxel: VoxelId,
    palette_size: usize,
}

impl Player {
    /// Creates a player at `position` with the first palette entry selected.
    pub fn new(position: Point3<f32>, speed: f32, sensitivity: f32, palette_size: usize) -> Self {
        Self {
            camera_state: CameraState::new(position, speed, sensitivity),
            selected_voxel: if palette_size == 0 { EMPTY_VOXEL } else { 1 },
            palette_size,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera_state.camera
    }

    pub fn selected_voxel(&self) -> VoxelId {
        self.selected_voxel
    }

    /// Moves the selection by `delta` entries, wrapping within `1..=palette_size`.
    pub fn cycle_selection(&mut self, delta: i32) {
        if delta == 0 || self.palette_size == 0 {
            return;
        }
        let size = self.palette_size as i32;
        let index = (self.selected_voxel as i32 - 1 + delta).rem_euclid(size);
        self.selected_voxel = (index + 1) as VoxelId;
        log::debug!("Selected voxel type {}", self.selected_voxel);
    }

    /// The voxel the camera is inside of.
    pub fn target_voxel(&self) -> Point3<i32> {
        voxel_at_position(self.camera().position)
    }

    pub fn place_voxel(&self, world: &mut World) -> Result<()> {
        world.set_voxel(self.target_voxel(), self.selected_voxel)
    }

    pub fn remove_voxel(&self, world: &mut World) -> Result<()> {
        world.set_voxel(self.target_voxel(), EMPTY_VOXEL)
    }
}
