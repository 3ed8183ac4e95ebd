//! # Application State Management
//!
//! This module owns everything one engine session needs and drives the frame
//! loop:
//! - Opening a world directory (metadata, palette, chunk store, generator)
//! - Input handling through an [`InputSource`]
//! - Frame timing, pacing and optional PNG capture
//! - Saving the world when the session ends

pub mod input_manager;
pub mod input_source;
pub mod input_state;
pub mod key_bindings;

use std::path::PathBuf;
use std::sync::Arc;

use web_time::{Duration, Instant};

use input_source::InputSource;

use crate::config::EngineConfig;
use crate::engine_state::rendering::surface::Canvas;
use crate::engine_state::voxels::block::{JsonPaletteStore, VoxelPalette};
use crate::engine_state::voxels::generation::{generator_for, TerrainGenerator};
use crate::engine_state::voxels::persistence::{FileChunkStore, WorldMetadata};
use crate::engine_state::EngineState;
use crate::error::Result;

/// File name of the palette document inside a world directory.
pub const PALETTE_FILE_NAME: &str = "palette.json";

/// Measurements of one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    /// Faces in the world mesh
    pub faces_in_mesh: usize,
    /// Faces that survived culling and were drawn
    pub faces_drawn: usize,
    /// Wall-clock time spent on the frame
    pub frame_time: Duration,
}

/// Where and how often rendered frames are written as PNG files.
#[derive(Debug, Clone)]
pub struct FrameCapture {
    pub directory: PathBuf,
    pub every: u64,
}

/// The on-disk world a session was opened from.
struct OpenWorld {
    directory: PathBuf,
    metadata: WorldMetadata,
}

/// The application context: the engine, its input, and the frame it draws into.
pub struct ApplicationState {
    /// The core engine state and logic
    pub engine_state: EngineState,

    /// The image every frame is rendered into
    pub canvas: Canvas,

    /// Supplies per-frame input
    input_source: Box<dyn InputSource>,

    /// Set when the session was opened from a world directory
    open_world: Option<OpenWorld>,

    capture: Option<FrameCapture>,

    /// Minimum frame duration, when frame pacing is enabled
    min_frame_time: Option<Duration>,

    /// Timestamp of the last frame for delta time calculations
    last_wait_time: Instant,

    frames_rendered: u64,
    last_frame: FrameStats,
}

impl ApplicationState {
    /// Wraps an already built engine. Nothing is written to disk by this session.
    pub fn new(engine_state: EngineState, input_source: Box<dyn InputSource>, config: &EngineConfig) -> Self {
        let min_frame_time = (config.pace_frames && config.max_fps > 0)
            .then(|| Duration::from_secs_f64(1.0 / config.max_fps as f64));

        Self {
            engine_state,
            canvas: Canvas::new(config.width, config.height),
            input_source,
            open_world: None,
            capture: None,
            min_frame_time,
            last_wait_time: Instant::now(),
            frames_rendered: 0,
            last_frame: FrameStats::default(),
        }
    }

    /// Opens (or creates) the configured world directory and builds the engine on it.
    ///
    /// The world directory holds `world.json`, `palette.json` and the chunk files.
    pub fn open(config: &EngineConfig, input_source: Box<dyn InputSource>) -> Result<Self> {
        let directory = config.world_dir();
        let metadata = WorldMetadata::load_or_create(&directory, &config.world_name, config.sky_color)?;

        let palette = VoxelPalette::fetch(&JsonPaletteStore::new(directory.join(PALETTE_FILE_NAME)))?;
        let store = Arc::new(FileChunkStore::open(&directory)?);
        let generator: Arc<dyn TerrainGenerator> =
            Arc::from(generator_for(config.generator, metadata.seed, palette.len()));
        log::info!(
            "Opened world {:?} at {:?}: {} voxel types, {:?} generator",
            metadata.name,
            directory,
            palette.len(),
            config.generator
        );

        let engine_state = EngineState::new(config, palette, store, generator)?;
        let mut application_state = Self::new(engine_state, input_source, config);
        application_state.open_world = Some(OpenWorld { directory, metadata });
        Ok(application_state)
    }

    /// Writes every `every`-th frame into `directory`.
    pub fn with_capture(mut self, directory: PathBuf, every: u64) -> Result<Self> {
        std::fs::create_dir_all(&directory)?;
        self.capture = Some(FrameCapture {
            directory,
            every: every.max(1),
        });
        Ok(self)
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn last_frame(&self) -> FrameStats {
        self.last_frame
    }

    /// Runs one frame: input, camera, world streaming, rendering.
    ///
    /// # Returns
    /// `false` once the input asked to quit.
    pub fn run_frame(&mut self) -> bool {
        let frame_start = Instant::now();
        let dt = self
            .input_source
            .fixed_timestep()
            .unwrap_or_else(|| frame_start.duration_since(self.last_wait_time));
        self.last_wait_time = frame_start;

        let input = self.input_source.next_frame();
        self.engine_state.set_input_commands(input);
        self.engine_state.process_input(dt);
        self.engine_state.process_tasks();
        let render_stats = self.engine_state.render(&mut self.canvas);

        self.frames_rendered += 1;
        self.last_frame = FrameStats {
            faces_in_mesh: render_stats.faces_in_mesh,
            faces_drawn: render_stats.faces_drawn,
            frame_time: frame_start.elapsed(),
        };
        log::trace!("Frame {}: {:?}", self.frames_rendered, self.last_frame);

        self.capture_frame();

        !self.engine_state.quit_requested()
    }

    /// Runs frames until the input quits or `max_frames` frames were drawn,
    /// then saves the world.
    ///
    /// # Returns
    /// The number of frames rendered.
    pub fn run(&mut self, max_frames: Option<u64>) -> Result<u64> {
        let started = Instant::now();
        let mut total_frame_time = Duration::ZERO;

        loop {
            let keep_running = self.run_frame();
            total_frame_time += self.last_frame.frame_time;

            if !keep_running || max_frames.is_some_and(|limit| self.frames_rendered >= limit) {
                break;
            }

            if let Some(min_frame_time) = self.min_frame_time {
                let elapsed = self.last_frame.frame_time;
                if elapsed < min_frame_time {
                    std::thread::sleep(min_frame_time - elapsed);
                }
            }
        }

        let average = total_frame_time / self.frames_rendered.max(1) as u32;
        log::info!(
            "Rendered {} frames in {:.2?} (average frame {:.2?}, last frame {} of {} faces drawn)",
            self.frames_rendered,
            started.elapsed(),
            average,
            self.last_frame.faces_drawn,
            self.last_frame.faces_in_mesh
        );

        self.save()?;
        Ok(self.frames_rendered)
    }

    /// Saves all loaded chunks and, for worlds opened from disk, the world metadata.
    pub fn save(&self) -> Result<()> {
        self.engine_state.save()?;
        if let Some(open_world) = &self.open_world {
            open_world.metadata.save(&open_world.directory)?;
            log::info!("Saved world {:?}", open_world.metadata.name);
        }
        Ok(())
    }

    fn capture_frame(&self) {
        let Some(capture) = &self.capture else {
            return;
        };
        if self.frames_rendered % capture.every != 0 {
            return;
        }

        let path = capture
            .directory
            .join(format!("frame_{:05}.png", self.frames_rendered));
        match self.canvas.save_png(&path) {
            Ok(()) => log::debug!("Captured {:?}", path),
            Err(e) => log::warn!("Could not capture frame to {:?}: {}", path, e),
        }
    }
}
