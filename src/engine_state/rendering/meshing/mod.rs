//! Mesh generation for voxel rendering.
//!
//! Converts a chunk's voxel grid into the list of faces the renderer draws.
//! The only culling done here is interior face culling: a face is emitted
//! exactly when the voxel on the other side of it is empty.
//!
//! # Architecture
//! - `face`: the `Face` record shared by the mesh builder and the renderer
//! - `neighbors`: how positions just outside a chunk are resolved
//!
//! Greedy merging of coplanar faces is not performed; every face is one voxel
//! side.

use cgmath::Point3;
use web_time::Instant;

use crate::engine_state::voxels::block::block_side::BlockSide;
use crate::engine_state::voxels::block::{VoxelPalette, EMPTY_VOXEL};
use crate::engine_state::voxels::chunk::{in_bounds, Chunk};
use crate::engine_state::voxels::coords::local_to_world;

mod face;
mod neighbors;

pub use face::Face;
pub use neighbors::{IsolatedNeighbors, NeighborLookup, NeighborPolicy};

/// Builds the visible faces of one chunk.
///
/// Visits every non-empty voxel and, for each of the six sides, inspects the
/// adjacent voxel. Neighbors inside the chunk are read directly; neighbors
/// outside it are resolved through `neighbors`.
///
/// # Panics
/// Panics if the chunk holds an id the palette does not know. Chunks entering
/// the world are validated first, so this indicates corrupted state.
pub fn build_chunk_mesh(
    chunk: &Chunk,
    palette: &VoxelPalette,
    neighbors: &dyn NeighborLookup,
) -> Vec<Face> {
    let start = Instant::now();
    let mut faces = Vec::new();

    for (local, id) in chunk.solid_voxels() {
        let color = palette.color(id);
        let world = local_to_world(chunk.position, local);

        for side in BlockSide::all() {
            let adjacent = local + side.offset();
            let neighbor = if in_bounds(adjacent) {
                chunk.voxel_at(adjacent)
            } else {
                neighbors.voxel_outside(chunk.position, adjacent)
            };
            if neighbor == EMPTY_VOXEL {
                faces.push(Face::new(world, side, color));
            }
        }
    }

    log::trace!(
        "Meshed chunk {:?}: {} faces in {:?}",
        chunk.position,
        faces.len(),
        start.elapsed()
    );
    faces
}

/// Faces contributed by the voxel at `world`, for tests and debugging.
pub fn faces_at(faces: &[Face], world: Point3<i32>) -> usize {
    faces.iter().filter(|face| face.position == world).count()
}
