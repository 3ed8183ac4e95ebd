//! # World Module
//!
//! This module provides the `World` struct which manages the collection of
//! loaded chunks. It is the central coordinator for chunk loading, unloading,
//! voxel access and the aggregated world mesh.
//!
//! ## Architecture
//!
//! The world uses a sparse storage approach: only the chunks inside a cubic
//! window around the viewer are kept in memory. Chunks leaving the window are
//! saved to the [`ChunkStore`] and dropped; chunks entering it are loaded from
//! the store, or generated by the [`TerrainGenerator`] when the store has never
//! seen them.
//!
//! ## Chunk Loading
//!
//! - **Blocking**: [`World::stream_chunks`] loads missing chunks inline.
//! - **Background**: [`World::stream_chunks_deferred`] publishes a
//!   [`ChunkLoadTask`] per missing chunk; finished chunks come back through
//!   [`World::accept_loaded_chunk`] on the main thread.
//!
//! Saves always happen inline on the main thread, so a reload of a chunk can
//! never read the store before the save of that chunk has finished.
//!
//! ## Meshes
//!
//! Every chunk caches its own faces, rebuilt whenever the chunk changes. The
//! world mesh is the concatenation of all chunk meshes in load order and is
//! only rebuilt when something marked the world dirty.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use cgmath::{Point3, Vector3};

use super::block::{VoxelId, VoxelPalette};
use super::chunk::Chunk;
use super::coords::{chunk_at_position, local_to_world, world_to_local};
use super::generation::TerrainGenerator;
use super::persistence::{validate_voxels, ChunkStore};
use super::tasks::ChunkLoadTask;
use crate::engine_state::rendering::meshing::{
    build_chunk_mesh, Face, IsolatedNeighbors, NeighborLookup, NeighborPolicy,
};
use crate::engine_state::task_management::TaskManager;
use crate::error::Result;

/// Offsets of the six chunks sharing a face with a chunk.
const FACE_NEIGHBORS: [[i32; 3]; 6] = [
    [0, 0, -1],
    [0, 0, 1],
    [-1, 0, 0],
    [1, 0, 0],
    [0, -1, 0],
    [0, 1, 0],
];

/// Resolves out-of-chunk queries against the chunks currently loaded.
struct LoadedChunks<'a> {
    chunks: &'a HashMap<Point3<i32>, Chunk>,
}

impl NeighborLookup for LoadedChunks<'_> {
    fn voxel_outside(&self, chunk: Point3<i32>, local: Point3<i32>) -> VoxelId {
        let (neighbor, neighbor_local) = world_to_local(local_to_world(chunk, local));
        self.chunks
            .get(&neighbor)
            .map(|chunk| chunk.voxel_at(neighbor_local))
            .unwrap_or_default()
    }
}

/// Reads a chunk from the store, falling back to the generator.
///
/// Never fails: store errors, corrupt data and generator errors are logged and
/// produce an empty chunk, so a bad chunk costs a hole in the world rather
/// than the session.
pub fn fetch_chunk(
    position: Point3<i32>,
    store: &dyn ChunkStore,
    generator: &dyn TerrainGenerator,
    palette_size: usize,
) -> Chunk {
    let loaded = match store.load(position) {
        Ok(Some(voxels)) => {
            log::debug!("[LOAD] Chunk {:?} from store", position);
            validate_voxels(position, voxels, palette_size)
        }
        Ok(None) => {
            log::debug!("[GEN] Chunk {:?} not saved yet, generating", position);
            generator
                .generate(position)
                .and_then(|voxels| validate_voxels(position, voxels, palette_size))
        }
        Err(e) => Err(e),
    };

    match loaded {
        Ok(voxels) => Chunk::from_voxels(position, voxels),
        Err(e) => {
            log::warn!("[LOAD] Chunk {:?} unavailable ({}), using empty chunk", position, e);
            Chunk::empty(position)
        }
    }
}

/// Represents the voxel world: the loaded chunks and their combined mesh.
pub struct World {
    /// Loaded chunks keyed by chunk-grid position. At most one per position.
    chunks: HashMap<Point3<i32>, Chunk>,
    /// Loaded chunk positions in the order they were loaded.
    load_order: Vec<Point3<i32>>,
    palette: Arc<VoxelPalette>,
    store: Arc<dyn ChunkStore>,
    generator: Arc<dyn TerrainGenerator>,
    neighbor_policy: NeighborPolicy,
    /// Edge length of the streaming window, in chunks.
    render_distance: i32,
    /// Window computed by the last streaming call.
    window: HashSet<Point3<i32>>,
    /// Chunks handed to the worker pool and not yet returned.
    pending_loads: HashSet<Point3<i32>>,
    dirty: bool,
    mesh: Vec<Face>,
}

impl World {
    /// Creates a world with no chunks loaded.
    pub fn new(
        palette: Arc<VoxelPalette>,
        store: Arc<dyn ChunkStore>,
        generator: Arc<dyn TerrainGenerator>,
        render_distance: u32,
        neighbor_policy: NeighborPolicy,
    ) -> Self {
        World {
            chunks: HashMap::new(),
            load_order: Vec::new(),
            palette,
            store,
            generator,
            neighbor_policy,
            render_distance: render_distance as i32,
            window: HashSet::new(),
            pending_loads: HashSet::new(),
            dirty: false,
            mesh: Vec::new(),
        }
    }

    pub fn palette(&self) -> &Arc<VoxelPalette> {
        &self.palette
    }

    pub fn neighbor_policy(&self) -> NeighborPolicy {
        self.neighbor_policy
    }

    /// The aggregated mesh produced by the last rebuild.
    pub fn mesh(&self) -> &[Face] {
        &self.mesh
    }

    /// Loaded chunk positions in load order.
    pub fn loaded_positions(&self) -> &[Point3<i32>] {
        &self.load_order
    }

    pub fn is_loaded(&self, position: Point3<i32>) -> bool {
        self.chunks.contains_key(&position)
    }

    pub fn chunk(&self, position: Point3<i32>) -> Option<&Chunk> {
        self.chunks.get(&position)
    }

    /// Number of chunk loads handed to workers that have not come back yet.
    pub fn pending_loads(&self) -> usize {
        self.pending_loads.len()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns the voxel at a world position, loading its chunk if needed.
    pub fn get_voxel(&mut self, world: Point3<i32>) -> VoxelId {
        let (chunk, local) = world_to_local(world);
        self.ensure_loaded(chunk);
        self.chunks
            .get(&chunk)
            .map(|chunk| chunk.voxel_at(local))
            .unwrap_or_default()
    }

    /// Writes a voxel at a world position.
    ///
    /// The id is checked against the palette before anything is touched. The
    /// owning chunk is loaded if needed and its mesh rebuilt. Under
    /// [`NeighborPolicy::LoadedNeighbors`], an edit on a chunk boundary also
    /// rebuilds the loaded chunks across that boundary.
    pub fn set_voxel(&mut self, world: Point3<i32>, id: VoxelId) -> Result<()> {
        self.palette.validate(id)?;

        let (position, local) = world_to_local(world);
        self.ensure_loaded(position);
        if let Some(chunk) = self.chunks.get_mut(&position) {
            chunk.set_voxel(local, id);
        }
        self.rebuild_chunk_mesh(position);

        if self.neighbor_policy == NeighborPolicy::LoadedNeighbors {
            for offset in Chunk::touching_neighbors(local) {
                self.rebuild_chunk_mesh(position + offset);
            }
        }
        self.dirty = true;
        Ok(())
    }

    /// Chunk positions of the streaming window around `viewer`, in scan order.
    ///
    /// For scan index `i`, the offset is `(i % R, (i / R) % R, i / R²)` and the
    /// window is centred by subtracting `R / 2` on every axis.
    pub fn target_window(&self, viewer: Point3<f32>) -> Vec<Point3<i32>> {
        let r = self.render_distance;
        let centre = chunk_at_position(viewer);
        let half = Vector3::new(r / 2, r / 2, r / 2);
        (0..r * r * r)
            .map(|i| centre + Vector3::new(i % r, (i / r) % r, i / (r * r)) - half)
            .collect()
    }

    /// Brings the loaded set in line with the window around `viewer`, loading
    /// missing chunks on the calling thread.
    pub fn stream_chunks(&mut self, viewer: Point3<f32>) {
        let targets = self.update_window(viewer);
        let unloaded = self.unload_outside_window();

        let mut loaded = 0;
        for position in targets {
            if !self.chunks.contains_key(&position) {
                let chunk = self.fetch(position);
                self.insert_chunk(chunk);
                loaded += 1;
            }
        }

        if loaded > 0 || unloaded > 0 {
            log::info!(
                "Streamed chunks: {} loaded, {} unloaded, {} resident",
                loaded,
                unloaded,
                self.chunks.len()
            );
        }
    }

    /// Like [`World::stream_chunks`], but missing chunks are loaded by the
    /// worker pool. Unloads still happen immediately.
    pub fn stream_chunks_deferred(&mut self, viewer: Point3<f32>, task_manager: &mut TaskManager) {
        let targets = self.update_window(viewer);
        self.unload_outside_window();

        for position in targets {
            if self.chunks.contains_key(&position) || self.pending_loads.contains(&position) {
                continue;
            }
            self.pending_loads.insert(position);
            task_manager.publish_task(Box::new(ChunkLoadTask::new(
                position,
                Arc::clone(&self.store),
                Arc::clone(&self.generator),
                self.palette.len(),
            )));
        }
    }

    /// Inserts a chunk loaded by a worker.
    ///
    /// Chunks that left the window while loading, or that were loaded inline
    /// in the meantime, are dropped. They were never modified, so nothing is lost.
    pub fn accept_loaded_chunk(&mut self, chunk: Chunk) {
        let position = chunk.position;
        self.pending_loads.remove(&position);

        if self.chunks.contains_key(&position) || !self.window.contains(&position) {
            log::debug!("Discarding stale background load of chunk {:?}", position);
            return;
        }
        self.insert_chunk(chunk);
    }

    /// Rebuilds the aggregated mesh if any chunk changed since the last rebuild.
    ///
    /// # Returns
    /// `true` if the mesh was rebuilt.
    pub fn rebuild_world_mesh(&mut self) -> bool {
        if !self.dirty {
            return false;
        }

        self.mesh.clear();
        for position in &self.load_order {
            if let Some(chunk) = self.chunks.get(position) {
                self.mesh.extend_from_slice(chunk.faces());
            }
        }
        self.dirty = false;
        log::debug!(
            "Rebuilt world mesh: {} faces from {} chunks",
            self.mesh.len(),
            self.load_order.len()
        );
        true
    }

    /// The per-frame world step in blocking mode.
    pub fn update(&mut self, viewer: Point3<f32>) {
        self.stream_chunks(viewer);
        self.rebuild_world_mesh();
    }

    /// Saves every loaded chunk.
    ///
    /// Every chunk is attempted; the first failure is returned.
    pub fn save_all(&self) -> Result<()> {
        let mut first_error = None;
        for position in &self.load_order {
            if let Some(chunk) = self.chunks.get(position) {
                if let Err(e) = self.store.save(*position, chunk.voxels()) {
                    log::warn!("[SAVE] Chunk {:?} failed: {}", position, e);
                    first_error.get_or_insert(e);
                }
            }
        }
        log::info!("Saved {} chunks", self.load_order.len());
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn fetch(&self, position: Point3<i32>) -> Chunk {
        fetch_chunk(
            position,
            self.store.as_ref(),
            self.generator.as_ref(),
            self.palette.len(),
        )
    }

    fn ensure_loaded(&mut self, position: Point3<i32>) {
        if !self.chunks.contains_key(&position) {
            let chunk = self.fetch(position);
            self.insert_chunk(chunk);
        }
    }

    fn update_window(&mut self, viewer: Point3<f32>) -> Vec<Point3<i32>> {
        let targets = self.target_window(viewer);
        self.window = targets.iter().copied().collect();
        targets
    }

    fn unload_outside_window(&mut self) -> usize {
        let leaving: Vec<Point3<i32>> = self
            .load_order
            .iter()
            .copied()
            .filter(|position| !self.window.contains(position))
            .collect();
        for &position in &leaving {
            self.unload_chunk(position);
        }
        leaving.len()
    }

    fn insert_chunk(&mut self, chunk: Chunk) {
        let position = chunk.position;
        self.chunks.insert(position, chunk);
        self.load_order.push(position);
        self.rebuild_chunk_mesh(position);
        self.rebuild_face_neighbors(position);
        self.dirty = true;
    }

    fn unload_chunk(&mut self, position: Point3<i32>) {
        let Some(chunk) = self.chunks.remove(&position) else {
            return;
        };
        self.load_order.retain(|p| *p != position);

        if let Err(e) = self.store.save(position, chunk.voxels()) {
            log::warn!("[SAVE] Chunk {:?} failed, unloading anyway: {}", position, e);
        } else {
            log::debug!("[SAVE] Chunk {:?} unloaded", position);
        }

        self.rebuild_face_neighbors(position);
        self.dirty = true;
    }

    fn rebuild_face_neighbors(&mut self, position: Point3<i32>) {
        if self.neighbor_policy != NeighborPolicy::LoadedNeighbors {
            return;
        }
        for offset in FACE_NEIGHBORS {
            self.rebuild_chunk_mesh(position + Vector3::from(offset));
        }
    }

    fn rebuild_chunk_mesh(&mut self, position: Point3<i32>) {
        let Some(chunk) = self.chunks.get(&position) else {
            return;
        };
        let faces = match self.neighbor_policy {
            NeighborPolicy::Isolated => build_chunk_mesh(chunk, &self.palette, &IsolatedNeighbors),
            NeighborPolicy::LoadedNeighbors => build_chunk_mesh(
                chunk,
                &self.palette,
                &LoadedChunks {
                    chunks: &self.chunks,
                },
            ),
        };
        if let Some(chunk) = self.chunks.get_mut(&position) {
            chunk.replace_faces(faces);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_side::BlockSide;
    use crate::engine_state::voxels::chunk::CHUNK_SIZE;
    use crate::engine_state::voxels::generation::{EmptyGenerator, FlatGenerator};
    use crate::engine_state::voxels::persistence::MemoryChunkStore;
    use crate::error::EngineError;

    struct FailingGenerator;

    impl TerrainGenerator for FailingGenerator {
        fn generate(&self, _position: Point3<i32>) -> Result<Vec<VoxelId>> {
            Err(EngineError::Generation("out of noise".to_string()))
        }
    }

    fn world_with(
        store: Arc<MemoryChunkStore>,
        generator: Arc<dyn TerrainGenerator>,
        render_distance: u32,
        policy: NeighborPolicy,
    ) -> World {
        World::new(
            Arc::new(VoxelPalette::default()),
            store,
            generator,
            render_distance,
            policy,
        )
    }

    fn flat_world(render_distance: u32) -> World {
        world_with(
            Arc::new(MemoryChunkStore::new()),
            Arc::new(FlatGenerator::new(0, 1)),
            render_distance,
            NeighborPolicy::Isolated,
        )
    }

    #[test]
    fn window_scan_order_and_centring() {
        let world = flat_world(2);
        let window = world.target_window(Point3::new(8.0, -2.0, 8.0));
        // Viewer chunk is (0, -1, 0); R / 2 = 1.
        assert_eq!(
            window,
            vec![
                Point3::new(-1, -2, -1),
                Point3::new(0, -2, -1),
                Point3::new(-1, -1, -1),
                Point3::new(0, -1, -1),
                Point3::new(-1, -2, 0),
                Point3::new(0, -2, 0),
                Point3::new(-1, -1, 0),
                Point3::new(0, -1, 0),
            ]
        );
    }

    #[test]
    fn streaming_loads_exactly_the_window_and_is_idempotent() {
        let mut world = flat_world(3);
        let viewer = Point3::new(8.0, -2.0, 8.0);
        world.stream_chunks(viewer);

        let window = world.target_window(viewer);
        assert_eq!(world.loaded_positions(), window.as_slice());
        assert!(world.rebuild_world_mesh());

        world.stream_chunks(viewer);
        assert_eq!(world.loaded_positions(), window.as_slice());
        assert!(!world.is_dirty());
    }

    #[test]
    fn moving_saves_and_unloads_chunks_that_leave() {
        let store = Arc::new(MemoryChunkStore::new());
        let mut world = world_with(
            Arc::clone(&store),
            Arc::new(EmptyGenerator),
            1,
            NeighborPolicy::Isolated,
        );

        world.stream_chunks(Point3::new(1.0, 1.0, 1.0));
        world.set_voxel(Point3::new(2, 2, 2), 3).unwrap();
        world.stream_chunks(Point3::new(40.0, 1.0, 1.0));

        assert_eq!(world.loaded_positions(), &[Point3::new(2, 0, 0)]);
        let saved = store.load(Point3::new(0, 0, 0)).unwrap().unwrap();
        assert_eq!(saved.iter().filter(|&&v| v == 3).count(), 1);

        // Coming back reads the saved edit rather than regenerating.
        world.stream_chunks(Point3::new(1.0, 1.0, 1.0));
        assert_eq!(world.get_voxel(Point3::new(2, 2, 2)), 3);
    }

    #[test]
    fn set_voxel_rejects_ids_outside_the_palette() {
        let mut world = flat_world(1);
        world.stream_chunks(Point3::new(0.0, 0.0, 0.0));
        world.rebuild_world_mesh();

        let result = world.set_voxel(Point3::new(3, 0, 3), 4);
        assert!(matches!(
            result,
            Err(EngineError::InvalidVoxelId { id: 4, palette_size: 3 })
        ));
        assert_eq!(world.get_voxel(Point3::new(3, 0, 3)), 1);
        assert!(!world.is_dirty());
    }

    #[test]
    fn set_voxel_rebuilds_mesh_and_marks_dirty() {
        let mut world = flat_world(1);
        world.stream_chunks(Point3::new(0.0, 0.0, 0.0));
        world.rebuild_world_mesh();
        let before = world.mesh().len();

        // +Y is down, so y = 1 sits directly under the layer.
        world.set_voxel(Point3::new(5, 1, 5), 2).unwrap();
        assert!(world.is_dirty());
        world.rebuild_world_mesh();
        // The new voxel shows five faces and hides one bottom face of the layer.
        assert_eq!(world.mesh().len(), before + 4);
    }

    #[test]
    fn negative_coordinates_map_to_the_previous_chunk() {
        let mut world = flat_world(1);
        world.set_voxel(Point3::new(-1, -1, -1), 2).unwrap();
        assert!(world.is_loaded(Point3::new(-1, -1, -1)));
        assert_eq!(
            world
                .chunk(Point3::new(-1, -1, -1))
                .map(|c| c.voxel_at(Point3::new(15, 15, 15))),
            Some(2)
        );
    }

    #[test]
    fn corrupt_and_failed_chunks_degrade_to_empty() {
        let store = Arc::new(MemoryChunkStore::new());
        store.insert_raw(Point3::new(0, 0, 0), vec![1; 10]);
        let mut bad_ids = vec![0; CHUNK_SIZE as usize];
        bad_ids[0] = 200;
        store.insert_raw(Point3::new(1, 0, 0), bad_ids);

        let mut world = world_with(
            store,
            Arc::new(FailingGenerator),
            1,
            NeighborPolicy::Isolated,
        );
        assert_eq!(world.get_voxel(Point3::new(0, 0, 0)), 0);
        assert_eq!(world.get_voxel(Point3::new(16, 0, 0)), 0);
        assert_eq!(world.get_voxel(Point3::new(40, 0, 0)), 0);
        assert_eq!(world.chunk(Point3::new(2, 0, 0)).map(Chunk::count_non_empty), Some(0));
    }

    fn boundary_faces(world: &World) -> usize {
        world
            .mesh()
            .iter()
            .filter(|f| {
                (f.position.x == 15 && f.side == BlockSide::RIGHT)
                    || (f.position.x == 16 && f.side == BlockSide::LEFT)
            })
            .count()
    }

    fn two_solid_chunks(policy: NeighborPolicy) -> World {
        let store = Arc::new(MemoryChunkStore::new());
        store.insert_raw(Point3::new(0, 0, 0), vec![1; CHUNK_SIZE as usize]);
        store.insert_raw(Point3::new(1, 0, 0), vec![2; CHUNK_SIZE as usize]);
        let mut world = world_with(store, Arc::new(EmptyGenerator), 1, policy);
        world.get_voxel(Point3::new(0, 0, 0));
        world.get_voxel(Point3::new(16, 0, 0));
        world.rebuild_world_mesh();
        world
    }

    #[test]
    fn isolated_policy_keeps_faces_between_chunks() {
        let world = two_solid_chunks(NeighborPolicy::Isolated);
        assert_eq!(boundary_faces(&world), 2 * 16 * 16);
    }

    #[test]
    fn loaded_neighbor_policy_culls_faces_between_chunks() {
        let mut world = two_solid_chunks(NeighborPolicy::LoadedNeighbors);
        assert_eq!(boundary_faces(&world), 0);

        // Carving the boundary exposes one face on each side of it.
        world.set_voxel(Point3::new(16, 4, 4), 0).unwrap();
        world.rebuild_world_mesh();
        let exposed = world
            .mesh()
            .iter()
            .filter(|f| f.position == Point3::new(15, 4, 4))
            .count();
        assert_eq!(exposed, 1);
    }
}
