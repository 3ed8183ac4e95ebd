//! # Voxel Raster
//!
//! A software voxel engine: chunked voxel worlds streamed around a camera,
//! meshed into visible faces and drawn with the painter's algorithm into a CPU
//! image. No GPU and no depth buffer are involved.
//!
//! ## Key Modules
//!
//! * `application_state` - Session setup, input sources and the frame loop
//! * `engine_state` - Camera, player, world, meshing, rendering and worker threads
//! * `config` - The JSON engine configuration
//! * `error` - The engine error type
//!
//! ## Usage
//!
//! ```no_run
//! use voxel_raster::{config::EngineConfig, RunOptions};
//!
//! voxel_raster::init_logger();
//! let frames = voxel_raster::run(&EngineConfig::default(), &RunOptions::default()).unwrap();
//! ```

use std::path::PathBuf;

use application_state::input_source::{InputSource, ScriptedInput};
use application_state::key_bindings::KeyBindings;
use application_state::ApplicationState;
use config::EngineConfig;
use log::info;

pub mod application_state;
pub mod config;
pub mod engine_state;
pub mod error;

/// Frames the walk script runs when no frame limit is given.
pub const DEFAULT_WALK_FRAMES: usize = 600;

/// How a headless session is driven.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Stop after this many frames.
    pub max_frames: Option<u64>,
    /// Write captured frames here.
    pub output: Option<PathBuf>,
    /// Capture every n-th frame.
    pub capture_every: u64,
    /// Replay a forward walk with a slow pan instead of standing still.
    pub walk: bool,
}

/// Initializes `env_logger` from `RUST_LOG`, writing to stdout.
pub fn init_logger() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");
}

/// Opens the configured world, runs the frame loop and saves the world.
///
/// # Returns
/// The number of frames rendered.
pub fn run(config: &EngineConfig, options: &RunOptions) -> error::Result<u64> {
    let bindings = KeyBindings::from_config(&config.key_bindings)?;
    let script_frames = options
        .max_frames
        .map_or(DEFAULT_WALK_FRAMES, |frames| frames as usize);

    let input: Box<dyn InputSource> = if options.walk {
        Box::new(ScriptedInput::walk(script_frames, &bindings))
    } else {
        Box::new(ScriptedInput::new(vec![Default::default(); script_frames], &bindings))
    };

    let mut state = ApplicationState::open(config, input)?;
    if let Some(output) = &options.output {
        state = state.with_capture(output.clone(), options.capture_every)?;
    }
    state.run(options.max_frames)
}
