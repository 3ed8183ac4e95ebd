//! # Camera State Management
//!
//! This module handles camera-related functionality:
//! - Camera position and orientation tracking
//! - Player input processing for camera control
//! - Chunk-based position tracking for world streaming
//!
//! ## Core Components
//! - `Camera`: the camera's position and orientation in 3D space
//! - `CameraController`: turns player actions into camera motion

use camera::{Camera, CameraController};
use cgmath::{Deg, Point3};
use web_time::Duration;

use super::voxels::coords::chunk_at_position;
use super::PlayerAction;

pub mod camera;

/// The camera together with its controller.
pub struct CameraState {
    /// The current camera position and orientation
    pub camera: Camera,
    /// Handles player input and camera movement
    pub camera_controller: CameraController,
    current_chunk_position: Point3<i32>,
}

impl CameraState {
    /// Creates a camera at `position` looking along `+Z`.
    pub fn new(position: Point3<f32>, speed: f32, sensitivity: f32) -> Self {
        CameraState {
            camera: Camera::new(position, Deg(0.0), Deg(0.0)),
            camera_controller: CameraController::new(speed, sensitivity),
            current_chunk_position: chunk_at_position(position),
        }
    }

    /// Processes player input actions and updates the camera controller state.
    pub fn intake_actions(&mut self, actions: &PlayerAction) {
        self.camera_controller.intake_actions(actions);
    }

    /// Applies pending movement for a frame of length `dt`.
    ///
    /// # Returns
    /// - `Some(CameraUpdates)` if the camera moved into a different chunk
    /// - `None` otherwise
    pub fn update(&mut self, dt: Duration) -> Option<CameraUpdates> {
        if !self.camera_controller.has_updates() {
            return None;
        }
        self.camera_controller.apply_and_reset(&mut self.camera, dt);

        let new_chunk_position = chunk_at_position(self.camera.position);
        if new_chunk_position == self.current_chunk_position {
            return None;
        }
        self.current_chunk_position = new_chunk_position;
        Some(CameraUpdates { new_chunk_position })
    }
}

/// Returned by `CameraState::update()` when the camera enters a new chunk.
pub struct CameraUpdates {
    /// The chunk the camera is now in
    pub new_chunk_position: Point3<i32>,
}
