//! # World Persistence
//!
//! Chunk storage behind the [`ChunkStore`] trait plus the per-world metadata
//! file.
//!
//! On disk a world looks like this:
//!
//! ```text
//! worlds/<name>/
//!     world.json                  WorldMetadata
//!     palette.json                ordered voxel types
//!     chunks/chunk_<x>_<y>_<z>.bin
//! ```
//!
//! Chunk files hold the raw voxel array, lz4-compressed with the size
//! prepended. Writes go to a `.tmp` file first and are renamed into place, so
//! a crash mid-save leaves the previous file intact.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use cgmath::Point3;
use lru::LruCache;
use serde::{Deserialize, Serialize};
use web_time::{SystemTime, UNIX_EPOCH};

use super::block::{VoxelId, EMPTY_VOXEL};
use super::chunk::{CHUNK_DIMENSION, CHUNK_SIZE};
use crate::config::Rgb;
use crate::error::{EngineError, Result};

/// Persistent storage for chunk voxel arrays.
///
/// Shared with worker threads in background streaming mode.
pub trait ChunkStore: Send + Sync {
    /// Reads a chunk. `Ok(None)` means the chunk was never saved.
    fn load(&self, position: Point3<i32>) -> Result<Option<Vec<VoxelId>>>;

    /// Writes a chunk, replacing any previous data.
    fn save(&self, position: Point3<i32>, voxels: &[VoxelId]) -> Result<()>;
}

/// Checks a voxel array read from storage.
///
/// The array must be exactly one chunk long and every id must be either empty
/// or inside the palette.
pub fn validate_voxels(
    position: Point3<i32>,
    voxels: Vec<VoxelId>,
    palette_size: usize,
) -> Result<Vec<VoxelId>> {
    if voxels.len() != CHUNK_SIZE as usize {
        return Err(EngineError::CorruptChunk {
            position,
            reason: format!("expected {} voxels, found {}", CHUNK_SIZE, voxels.len()),
        });
    }
    if let Some(&bad) = voxels.iter().find(|&&id| id as usize > palette_size) {
        return Err(EngineError::CorruptChunk {
            position,
            reason: format!("voxel id {} exceeds palette size {}", bad, palette_size),
        });
    }
    Ok(voxels)
}

/// Keeps saved chunks in memory. Used by tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryChunkStore {
    chunks: Mutex<HashMap<Point3<i32>, Vec<VoxelId>>>,
}

impl MemoryChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of chunks saved so far.
    pub fn len(&self) -> usize {
        self.chunks.lock().map(|chunks| chunks.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stores raw data without validation, for seeding corrupt chunks.
    pub fn insert_raw(&self, position: Point3<i32>, voxels: Vec<VoxelId>) {
        if let Ok(mut chunks) = self.chunks.lock() {
            chunks.insert(position, voxels);
        }
    }
}

impl ChunkStore for MemoryChunkStore {
    fn load(&self, position: Point3<i32>) -> Result<Option<Vec<VoxelId>>> {
        let chunks = self
            .chunks
            .lock()
            .map_err(|_| poisoned("memory chunk store"))?;
        Ok(chunks.get(&position).cloned())
    }

    fn save(&self, position: Point3<i32>, voxels: &[VoxelId]) -> Result<()> {
        let mut chunks = self
            .chunks
            .lock()
            .map_err(|_| poisoned("memory chunk store"))?;
        chunks.insert(position, voxels.to_vec());
        Ok(())
    }
}

fn poisoned(what: &str) -> EngineError {
    EngineError::Io(std::io::Error::other(format!("{} lock poisoned", what)))
}

/// Number of recently touched chunks kept decompressed in memory.
pub const CHUNK_CACHE_CAPACITY: usize = 64;

/// One lz4-compressed file per chunk under `<world>/chunks/`.
pub struct FileChunkStore {
    chunks_dir: PathBuf,
    cache: Mutex<LruCache<Point3<i32>, Vec<VoxelId>>>,
}

impl FileChunkStore {
    /// Opens (creating if needed) the chunk directory of a world.
    pub fn open(world_dir: &Path) -> Result<Self> {
        let chunks_dir = world_dir.join("chunks");
        std::fs::create_dir_all(&chunks_dir)?;
        let capacity = NonZeroUsize::new(CHUNK_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Ok(Self {
            chunks_dir,
            cache: Mutex::new(LruCache::new(capacity)),
        })
    }

    /// Path of the file holding the chunk at `position`.
    pub fn chunk_path(&self, position: Point3<i32>) -> PathBuf {
        self.chunks_dir.join(format!(
            "chunk_{}_{}_{}.bin",
            position.x, position.y, position.z
        ))
    }

    fn read_file(&self, position: Point3<i32>, path: &Path) -> Result<Vec<VoxelId>> {
        let compressed = std::fs::read(path)?;
        log::debug!("Read {} bytes from {:?}", compressed.len(), path);

        let corrupt = |reason: String| EngineError::CorruptChunk { position, reason };

        // The size prefix is checked before anything is allocated from it.
        let (prefix, block) = compressed
            .split_first_chunk::<4>()
            .ok_or_else(|| corrupt(format!("file is only {} bytes", compressed.len())))?;
        let stored_size = u32::from_le_bytes(*prefix) as usize;
        if stored_size != CHUNK_SIZE as usize {
            return Err(corrupt(format!(
                "header claims {} voxels, expected {}",
                stored_size, CHUNK_SIZE
            )));
        }

        let mut voxels = vec![EMPTY_VOXEL; CHUNK_SIZE as usize];
        let written = lz4_flex::block::decompress_into(block, &mut voxels)
            .map_err(|e| corrupt(format!("failed to decompress: {}", e)))?;
        if written != voxels.len() {
            return Err(corrupt(format!(
                "decompressed {} voxels, expected {}",
                written,
                voxels.len()
            )));
        }
        Ok(voxels)
    }
}

impl ChunkStore for FileChunkStore {
    fn load(&self, position: Point3<i32>) -> Result<Option<Vec<VoxelId>>> {
        if let Some(voxels) = self
            .cache
            .lock()
            .map_err(|_| poisoned("chunk cache"))?
            .get(&position)
        {
            return Ok(Some(voxels.clone()));
        }

        let path = self.chunk_path(position);
        if !path.exists() {
            return Ok(None);
        }

        let voxels = self.read_file(position, &path)?;
        self.cache
            .lock()
            .map_err(|_| poisoned("chunk cache"))?
            .put(position, voxels.clone());
        Ok(Some(voxels))
    }

    fn save(&self, position: Point3<i32>, voxels: &[VoxelId]) -> Result<()> {
        let path = self.chunk_path(position);
        let compressed = lz4_flex::compress_prepend_size(voxels);

        // Atomic write: write to temp file, then rename
        let temp_path = path.with_extension("tmp");
        std::fs::write(&temp_path, &compressed)?;
        std::fs::rename(&temp_path, &path)?;

        log::debug!(
            "Saved chunk ({}, {}, {}) ({} bytes compressed)",
            position.x,
            position.y,
            position.z,
            compressed.len()
        );

        self.cache
            .lock()
            .map_err(|_| poisoned("chunk cache"))?
            .put(position, voxels.to_vec());
        Ok(())
    }
}

/// Contents of `world.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldMetadata {
    pub name: String,
    pub chunk_size: i32,
    pub sky_color: Rgb,
    pub seed: u64,
    pub created_at_unix: u64,
}

impl WorldMetadata {
    /// File name of the metadata document inside a world directory.
    pub const FILE_NAME: &'static str = "world.json";

    /// Metadata for a world created now, with a fresh random seed.
    pub fn create(name: &str, sky_color: Rgb) -> Self {
        let created_at_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0);
        Self {
            name: name.to_string(),
            chunk_size: CHUNK_DIMENSION,
            sky_color,
            seed: fastrand::u64(..),
            created_at_unix,
        }
    }

    /// Reads `world.json` from `world_dir`, creating and writing it on first use.
    pub fn load_or_create(world_dir: &Path, name: &str, sky_color: Rgb) -> Result<Self> {
        let path = world_dir.join(Self::FILE_NAME);
        if path.exists() {
            let metadata: WorldMetadata = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
            log::info!("Opened world {:?} (seed {})", metadata.name, metadata.seed);
            return Ok(metadata);
        }

        std::fs::create_dir_all(world_dir)?;
        let metadata = Self::create(name, sky_color);
        metadata.save(world_dir)?;
        log::info!("Created world {:?} (seed {})", metadata.name, metadata.seed);
        Ok(metadata)
    }

    pub fn save(&self, world_dir: &Path) -> Result<()> {
        std::fs::write(
            world_dir.join(Self::FILE_NAME),
            serde_json::to_string_pretty(self)?,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_world_dir(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "voxel-raster-{}-{}",
            label,
            fastrand::u64(..)
        ))
    }

    fn sample_voxels() -> Vec<VoxelId> {
        (0..CHUNK_SIZE as usize).map(|i| (i % 4) as VoxelId).collect()
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryChunkStore::new();
        let position = Point3::new(-1, 0, 2);
        assert_eq!(store.load(position).unwrap(), None);

        store.save(position, &sample_voxels()).unwrap();
        assert_eq!(store.load(position).unwrap(), Some(sample_voxels()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn file_store_round_trip() {
        let dir = temp_world_dir("file-store");
        let position = Point3::new(3, -2, 0);
        {
            let store = FileChunkStore::open(&dir).unwrap();
            assert_eq!(store.load(position).unwrap(), None);
            store.save(position, &sample_voxels()).unwrap();
            assert!(dir.join("chunks/chunk_3_-2_0.bin").exists());
            assert!(!dir.join("chunks/chunk_3_-2_0.tmp").exists());
        }

        // A fresh store has a cold cache and must read the file.
        let reopened = FileChunkStore::open(&dir).unwrap();
        assert_eq!(reopened.load(position).unwrap(), Some(sample_voxels()));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn garbage_file_is_corrupt() {
        let dir = temp_world_dir("garbage");
        let store = FileChunkStore::open(&dir).unwrap();
        let position = Point3::new(0, 0, 0);
        std::fs::write(store.chunk_path(position), [16, 0, 0, 0, 0xFF]).unwrap();

        assert!(matches!(
            store.load(position),
            Err(EngineError::CorruptChunk { .. })
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn size_header_is_checked_before_decompressing() {
        let dir = temp_world_dir("header");
        let store = FileChunkStore::open(&dir).unwrap();

        let huge = Point3::new(1, 0, 0);
        std::fs::write(store.chunk_path(huge), [0xFF, 0xFF, 0xFF, 0x7F, 0x00]).unwrap();
        assert!(matches!(
            store.load(huge),
            Err(EngineError::CorruptChunk { reason, .. }) if reason.contains("header")
        ));

        let short = Point3::new(2, 0, 0);
        std::fs::write(store.chunk_path(short), [0x10, 0x00]).unwrap();
        assert!(matches!(store.load(short), Err(EngineError::CorruptChunk { .. })));

        let truncated = Point3::new(3, 0, 0);
        let mut bytes = lz4_flex::compress_prepend_size(&vec![1u8; CHUNK_SIZE as usize]);
        bytes.truncate(bytes.len() / 2);
        std::fs::write(store.chunk_path(truncated), bytes).unwrap();
        assert!(matches!(store.load(truncated), Err(EngineError::CorruptChunk { .. })));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn validation_rejects_bad_length_and_ids() {
        let position = Point3::new(0, 0, 0);
        assert!(validate_voxels(position, vec![0; 12], 3).is_err());

        let mut voxels = vec![0; CHUNK_SIZE as usize];
        voxels[100] = 4;
        assert!(validate_voxels(position, voxels.clone(), 3).is_err());
        voxels[100] = 3;
        assert!(validate_voxels(position, voxels, 3).is_ok());
    }

    #[test]
    fn metadata_is_created_once() {
        let dir = temp_world_dir("metadata");
        let created = WorldMetadata::load_or_create(&dir, "test", [1, 2, 3]).unwrap();
        let reopened = WorldMetadata::load_or_create(&dir, "ignored", [9, 9, 9]).unwrap();
        assert_eq!(created, reopened);
        assert_eq!(reopened.chunk_size, 16);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
