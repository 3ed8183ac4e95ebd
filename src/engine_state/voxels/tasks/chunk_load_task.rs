use std::sync::Arc;

use cgmath::Point3;

use crate::engine_state::task_management::task::{Task, TaskResult};
use crate::engine_state::voxels::chunk::Chunk;
use crate::engine_state::voxels::generation::TerrainGenerator;
use crate::engine_state::voxels::persistence::ChunkStore;
use crate::engine_state::voxels::world::{fetch_chunk, World};

/// Loads (or generates) one chunk on a worker thread.
///
/// The task owns handles to the store and generator so it needs nothing from
/// the main thread while running. Meshing happens after the chunk is handed
/// back, because it may read neighboring chunks.
pub struct ChunkLoadTask {
    position: Point3<i32>,
    store: Arc<dyn ChunkStore>,
    generator: Arc<dyn TerrainGenerator>,
    palette_size: usize,
}

impl ChunkLoadTask {
    pub fn new(
        position: Point3<i32>,
        store: Arc<dyn ChunkStore>,
        generator: Arc<dyn TerrainGenerator>,
        palette_size: usize,
    ) -> Self {
        ChunkLoadTask {
            position,
            store,
            generator,
            palette_size,
        }
    }
}

impl Task for ChunkLoadTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        Box::new(ChunkLoadResult {
            chunk: fetch_chunk(
                self.position,
                self.store.as_ref(),
                self.generator.as_ref(),
                self.palette_size,
            ),
        })
    }
}

/// A chunk ready to be inserted into the world.
pub struct ChunkLoadResult {
    chunk: Chunk,
}

impl TaskResult for ChunkLoadResult {
    fn handle_result(self: Box<Self>, world: &mut World) -> Vec<Box<dyn Task + Send>> {
        world.accept_loaded_chunk(self.chunk);
        Vec::new()
    }
}
