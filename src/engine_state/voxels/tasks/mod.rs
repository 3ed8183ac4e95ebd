//! # Voxel Task System
//!
//! Tasks that move chunk loading off the main thread in background streaming
//! mode.

mod chunk_load_task;

pub use chunk_load_task::{ChunkLoadResult, ChunkLoadTask};
