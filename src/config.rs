//! # Engine Configuration
//!
//! Every tunable the engine reads at startup lives in [`EngineConfig`]. The
//! struct is deserialized from a JSON file; every field has a default so a
//! partial file (or no file at all) is valid.
//!
//! ```json
//! {
//!     "width": 640,
//!     "height": 480,
//!     "render_distance": 3,
//!     "sort_strategy": "comparison"
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine_state::rendering::meshing::NeighborPolicy;
use crate::engine_state::rendering::sorting::SortStrategy;
use crate::error::Result;

/// RGB color triple used by configuration, the palette and the surfaces.
pub type Rgb = [u8; 3];

/// How the world brings chunks into render distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StreamingMode {
    /// Load or generate on the main thread inside the frame that needs the chunk.
    #[default]
    Blocking,
    /// Hand loads to the worker pool and insert finished chunks on a later frame.
    Background,
}

/// Which procedural generator fills chunks that have never been saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorKind {
    /// Concentric rings of voxel types 1..=3 on the `y = 0` layer.
    #[default]
    Rings,
    /// A single layer of voxel type 1 at `y = 0`.
    Flat,
    /// 3D Perlin noise caves.
    Perlin,
    /// Nothing at all.
    Empty,
}

/// Startup configuration for the whole engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Upper bound on frames per second when frame pacing is enabled.
    pub max_fps: u32,
    /// Sleep between frames to honour `max_fps`.
    pub pace_frames: bool,
    /// Background color the surface is cleared to each frame.
    pub sky_color: Rgb,
    /// Stroke color used when drawing in wireframe mode.
    pub wireframe_color: Rgb,
    /// Stroke color used for face outlines.
    pub outline_color: Rgb,
    /// Stroke faces instead of filling them.
    pub wireframe: bool,
    /// Stroke an outline on top of each filled face.
    pub outline: bool,
    /// Painter's algorithm ordering strategy.
    pub sort_strategy: SortStrategy,
    /// Run the per-face transform over the mesh with rayon.
    pub parallel_transform: bool,
    /// Movement speed in voxels per second.
    pub player_speed: f32,
    /// Degrees of rotation per pixel of mouse motion per second.
    pub rotation_sensitivity: f32,
    /// Edge length, in chunks, of the cubic window kept loaded around the viewer.
    pub render_distance: u32,
    /// Minimum view-space depth a vertex may have before its face is dropped.
    pub near_plane: f32,
    /// How chunk-boundary neighbors are resolved while meshing.
    pub neighbor_policy: NeighborPolicy,
    /// Blocking or worker-pool chunk loading.
    pub streaming: StreamingMode,
    /// Worker threads used by [`StreamingMode::Background`].
    pub worker_threads: usize,
    /// Name of the world directory under `worlds_dir`.
    pub world_name: String,
    /// Root directory holding every saved world.
    pub worlds_dir: PathBuf,
    /// Generator used for chunks without saved data.
    pub generator: GeneratorKind,
    /// Camera start position.
    pub spawn_position: [f32; 3],
    /// Logical action name to winit key code name (for example `"move_forward": "KeyW"`).
    pub key_bindings: BTreeMap<String, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 1000,
            max_fps: 120,
            pace_frames: false,
            sky_color: [135, 206, 235],
            wireframe_color: [0, 127, 0],
            outline_color: [0, 0, 0],
            wireframe: false,
            outline: false,
            sort_strategy: SortStrategy::Insertion,
            parallel_transform: false,
            player_speed: 5.0,
            rotation_sensitivity: 15.0,
            render_distance: 4,
            near_plane: 0.1,
            neighbor_policy: NeighborPolicy::Isolated,
            streaming: StreamingMode::Blocking,
            worker_threads: 4,
            world_name: "world1".to_string(),
            worlds_dir: PathBuf::from("worlds"),
            generator: GeneratorKind::Rings,
            spawn_position: [0.0, -2.0, 0.0],
            key_bindings: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    /// Reads a config file, or returns the defaults when `path` does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&contents)?;
        log::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Writes the config as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Directory of the configured world.
    pub fn world_dir(&self) -> PathBuf {
        self.worlds_dir.join(&self.world_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "width": 320, "sort_strategy": "comparison" }"#).unwrap();

        assert_eq!(config.width, 320);
        assert_eq!(config.height, 1000);
        assert_eq!(config.sort_strategy, SortStrategy::Comparison);
        assert_eq!(config.render_distance, 4);
        assert_eq!(config.neighbor_policy, NeighborPolicy::Isolated);
    }

    #[test]
    fn missing_file_is_default() {
        let path = std::env::temp_dir().join("voxel-raster-missing-config-file.json");
        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.world_name, "world1");
        assert_eq!(config.streaming, StreamingMode::Blocking);
    }

    #[test]
    fn enums_use_snake_case_names() {
        let config: EngineConfig = serde_json::from_str(
            r#"{ "neighbor_policy": "loaded_neighbors", "streaming": "background", "generator": "perlin" }"#,
        )
        .unwrap();

        assert_eq!(config.neighbor_policy, NeighborPolicy::LoadedNeighbors);
        assert_eq!(config.streaming, StreamingMode::Background);
        assert_eq!(config.generator, GeneratorKind::Perlin);
    }
}
