//! # Camera Implementation
//!
//! This module contains the core camera implementation:
//! - `Camera`: position plus yaw/pitch orientation in degrees
//! - `CameraController`: accumulates the actions of one frame and applies them
//!
//! ## Orientation
//!
//! Yaw 0 looks along `+Z`; positive yaw turns towards `+X`. World `+Y` is
//! down, so "up" movement decreases `y`. Pitch is clamped to `[-90°, 90°]` and
//! roll is always zero.

use cgmath::{Angle, Deg, Point3, Vector3};
use web_time::Duration;

use crate::engine_state::PlayerAction;

/// Pitch limit in degrees, straight up or straight down.
pub const MAX_PITCH: Deg<f32> = Deg(90.0);

/// The viewer: a position and a yaw/pitch orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub yaw: Deg<f32>,
    pub pitch: Deg<f32>,
}

/// Which movement keys are held this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveDirections {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl Camera {
    pub fn new<V: Into<Point3<f32>>, Y: Into<Deg<f32>>, P: Into<Deg<f32>>>(
        position: V,
        yaw: Y,
        pitch: P,
    ) -> Self {
        let mut camera = Self {
            position: position.into(),
            yaw: yaw.into(),
            pitch: pitch.into(),
        };
        camera.clamp_pitch();
        camera
    }

    /// Horizontal forward direction. Depends on yaw only.
    pub fn forward(&self) -> Vector3<f32> {
        let (yaw_sin, yaw_cos) = self.yaw.sin_cos();
        Vector3::new(yaw_sin, 0.0, yaw_cos)
    }

    /// Horizontal strafe-right direction.
    pub fn right(&self) -> Vector3<f32> {
        let (yaw_sin, yaw_cos) = self.yaw.sin_cos();
        Vector3::new(yaw_cos, 0.0, -yaw_sin)
    }

    /// Moves `distance` voxels along every held direction.
    ///
    /// Directions are applied independently, so holding forward and right
    /// together moves `distance` along each.
    pub fn advance(&mut self, directions: MoveDirections, distance: f32) {
        let forward = self.forward() * distance;
        let right = self.right() * distance;

        if directions.forward {
            self.position += forward;
        }
        if directions.backward {
            self.position -= forward;
        }
        if directions.right {
            self.position += right;
        }
        if directions.left {
            self.position -= right;
        }
        if directions.up {
            self.position.y -= distance;
        }
        if directions.down {
            self.position.y += distance;
        }
    }

    /// Adds to yaw and pitch, then clamps pitch.
    pub fn turn(&mut self, yaw: Deg<f32>, pitch: Deg<f32>) {
        self.yaw += yaw;
        self.pitch += pitch;
        self.clamp_pitch();
    }

    fn clamp_pitch(&mut self) {
        if self.pitch < -MAX_PITCH {
            self.pitch = -MAX_PITCH;
        } else if self.pitch > MAX_PITCH {
            self.pitch = MAX_PITCH;
        }
    }
}

/// Collects one frame of player actions and turns them into camera motion.
#[derive(Debug)]
pub struct CameraController {
    directions: MoveDirections,

    // Mouse motion accumulated this frame (pixels)
    rotate_horizontal: f32,
    rotate_vertical: f32,

    // Configuration
    speed: f32,
    sensitivity: f32,
}

impl CameraController {
    /// `speed` is in voxels per second, `sensitivity` in degrees per pixel per second.
    pub fn new(speed: f32, sensitivity: f32) -> Self {
        Self {
            directions: MoveDirections::default(),
            rotate_horizontal: 0.0,
            rotate_vertical: 0.0,
            speed,
            sensitivity,
        }
    }

    pub fn intake_actions(&mut self, actions: &PlayerAction) {
        self.directions = actions.movement;
        for &(delta_x, delta_y) in &actions.rotate_view {
            self.rotate_horizontal += delta_x as f32;
            self.rotate_vertical += delta_y as f32;
        }
    }

    pub fn has_updates(&self) -> bool {
        self.directions != MoveDirections::default()
            || self.rotate_horizontal != 0.0
            || self.rotate_vertical != 0.0
    }

    /// Rotates, then moves, the camera for a frame of length `dt`, and clears
    /// the accumulated input.
    pub fn apply_and_reset(&mut self, camera: &mut Camera, dt: Duration) {
        let dt = dt.as_secs_f32();

        camera.turn(
            Deg(self.rotate_horizontal * self.sensitivity * dt),
            Deg(self.rotate_vertical * self.sensitivity * dt),
        );
        camera.advance(self.directions, self.speed * dt);

        self.directions = MoveDirections::default();
        self.rotate_horizontal = 0.0;
        self.rotate_vertical = 0.0;
    }
}
