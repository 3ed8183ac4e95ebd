//! Rendering system for the voxel engine.
//!
//! This module turns the world mesh into pixels without a GPU or a depth
//! buffer:
//!
//! - `meshing`: builds each chunk's face list
//! - `pipeline`: transforms, culls and projects faces for one frame
//! - `sorting`: orders projected faces farthest first (painter's algorithm)
//! - `surface`: the 2D drawing target, with a CPU image implementation
//!
//! [`Renderer::render`] runs the whole frame: clear to the sky color,
//! project, sort, then fill (or stroke) every surviving face in order.

use crate::config::{EngineConfig, Rgb};
use crate::engine_state::camera_state::camera::Camera;

pub mod meshing;
pub mod pipeline;
pub mod sorting;
pub mod surface;

use meshing::Face;
use pipeline::{process_mesh, FrameView, ProjectedFace};
use sorting::SortStrategy;
use surface::RenderSurface;

/// Drawing options, taken from the engine configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub sky_color: Rgb,
    pub wireframe_color: Rgb,
    pub outline_color: Rgb,
    pub wireframe: bool,
    pub outline: bool,
    pub sort_strategy: SortStrategy,
    pub parallel_transform: bool,
    pub near_plane: f32,
}

impl From<&EngineConfig> for RenderSettings {
    fn from(config: &EngineConfig) -> Self {
        Self {
            sky_color: config.sky_color,
            wireframe_color: config.wireframe_color,
            outline_color: config.outline_color,
            wireframe: config.wireframe,
            outline: config.outline,
            sort_strategy: config.sort_strategy,
            parallel_transform: config.parallel_transform,
            near_plane: config.near_plane,
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

/// Face counts of one rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Faces in the world mesh handed to the renderer.
    pub faces_in_mesh: usize,
    /// Faces that survived culling and were drawn.
    pub faces_drawn: usize,
}

/// Manages the per-frame rendering pipeline.
pub struct Renderer {
    pub settings: RenderSettings,
    /// Projected faces of the last frame, in mesh order.
    projected: Vec<ProjectedFace>,
    /// Draw order of the last frame, indices into `projected`.
    order: Vec<usize>,
}

impl Renderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            projected: Vec::new(),
            order: Vec::new(),
        }
    }

    pub fn toggle_wireframe(&mut self) {
        self.settings.wireframe = !self.settings.wireframe;
        log::info!("Wireframe {}", if self.settings.wireframe { "on" } else { "off" });
    }

    /// Projected faces of the last frame, in draw order.
    pub fn drawn_faces(&self) -> impl Iterator<Item = &ProjectedFace> + '_ {
        self.order.iter().map(|&i| &self.projected[i])
    }

    /// Draws one frame of `mesh` as seen from `camera`.
    pub fn render(
        &mut self,
        mesh: &[Face],
        camera: &Camera,
        surface: &mut dyn RenderSurface,
    ) -> RenderStats {
        let view = FrameView::new(camera, surface.size(), self.settings.near_plane);
        self.projected = process_mesh(mesh, &view, self.settings.parallel_transform);

        let depths: Vec<f32> = self.projected.iter().map(|face| face.depth).collect();
        self.order = self.settings.sort_strategy.order(&depths);

        surface.clear(self.settings.sky_color);
        for &index in &self.order {
            let face = &self.projected[index];
            if self.settings.wireframe {
                surface.stroke_polygon(&face.points, self.settings.wireframe_color);
            } else {
                surface.fill_polygon(&face.points, face.color);
            }
            if self.settings.outline {
                surface.stroke_polygon(&face.points, self.settings.outline_color);
            }
        }

        RenderStats {
            faces_in_mesh: mesh.len(),
            faces_drawn: self.order.len(),
        }
    }
}
