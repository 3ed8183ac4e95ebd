//! # Voxel Raster Entry Point
//!
//! Runs a headless session on a world directory, optionally capturing frames
//! as PNG files.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release -- --world demo --generator perlin --walk --frames 300 --output frames
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use voxel_raster::config::{EngineConfig, GeneratorKind};
use voxel_raster::RunOptions;

#[derive(Parser, Debug)]
#[command(name = "voxel-raster")]
#[command(about = "Software voxel renderer with chunk streaming")]
struct Args {
    /// Engine configuration file (JSON); defaults apply when it does not exist
    #[arg(short, long, default_value = "voxel-raster.json")]
    config: PathBuf,

    /// World name, overriding the configuration
    #[arg(short, long)]
    world: Option<String>,

    /// Stop after this many frames
    #[arg(short, long)]
    frames: Option<u64>,

    /// Directory to write captured frames to
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Capture every n-th frame
    #[arg(long, default_value_t = 1)]
    capture_every: u64,

    /// Terrain generator for chunks that were never saved
    #[arg(short, long, value_parser = parse_generator)]
    generator: Option<GeneratorKind>,

    /// Walk forward while slowly panning
    #[arg(long)]
    walk: bool,
}

fn parse_generator(name: &str) -> std::result::Result<GeneratorKind, String> {
    match name {
        "rings" => Ok(GeneratorKind::Rings),
        "flat" => Ok(GeneratorKind::Flat),
        "perlin" => Ok(GeneratorKind::Perlin),
        "empty" => Ok(GeneratorKind::Empty),
        other => Err(format!(
            "unknown generator {:?} (expected rings, flat, perlin or empty)",
            other
        )),
    }
}

fn main() -> Result<()> {
    voxel_raster::init_logger();
    let args = Args::parse();

    let mut config = EngineConfig::load(&args.config)
        .with_context(|| format!("Failed to load config {:?}", args.config))?;
    if let Some(world) = args.world {
        config.world_name = world;
    }
    if let Some(generator) = args.generator {
        config.generator = generator;
    }

    let options = RunOptions {
        max_frames: args.frames,
        output: args.output,
        capture_every: args.capture_every,
        walk: args.walk,
    };

    let frames = voxel_raster::run(&config, &options)
        .with_context(|| format!("Session on world {:?} failed", config.world_name))?;
    log::info!("Done after {} frames", frames);
    Ok(())
}
