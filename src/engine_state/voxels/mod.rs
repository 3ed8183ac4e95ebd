//! # Voxel World
//!
//! This module contains the voxel storage side of the engine: everything from
//! a single voxel id up to the streamed world.
//!
//! ## Architecture
//!
//! * **Block**: voxel ids, the palette, and the six sides of a voxel
//! * **Chunk**: fixed-size 3D arrays of voxel ids with their cached faces
//! * **Coords**: world ↔ (chunk, local) coordinate mapping
//! * **Generation**: procedural terrain for chunks that were never saved
//! * **Persistence**: chunk stores and world metadata
//! * **World**: streaming, voxel access and the aggregated world mesh
//! * **Tasks**: background chunk loading
//!
//! ## Data Flow
//!
//! 1. World receives requests for voxel access or modification
//! 2. World delegates to the owning chunk (loading it if necessary)
//! 3. Changes rebuild the chunk's faces and mark the world mesh dirty
//! 4. The renderer reads the world mesh once per frame

pub mod block;
pub mod chunk;
pub mod coords;
pub mod generation;
pub mod persistence;
pub mod tasks;
pub mod world;
