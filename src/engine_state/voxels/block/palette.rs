//! # Voxel Palette
//!
//! The palette maps voxel ids to colors. It is fetched once per session from a
//! [`PaletteStore`] and then shared read-only by the mesh builder, the player
//! (to bound the selected id) and the world (to validate writes).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{VoxelId, EMPTY_VOXEL};
use crate::config::Rgb;
use crate::error::{EngineError, Result};

/// One entry of the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoxelType {
    /// 1-based id, assigned by insertion order.
    pub id: VoxelId,
    /// Fill color of every face of this type.
    pub color: Rgb,
    /// Stored for the palette service; the renderer does not blend.
    pub transparent: bool,
}

/// Read-only id → color table for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoxelPalette {
    types: Vec<VoxelType>,
}

impl VoxelPalette {
    /// Builds a palette from an ordered list of types.
    ///
    /// Ids are reassigned from list position so that `types[i]` always has id `i + 1`.
    ///
    /// # Errors
    /// Fails when there are more types than non-empty voxel ids.
    pub fn new(types: Vec<VoxelType>) -> Result<Self> {
        let palette_size = types.len();
        let types = types
            .into_iter()
            .enumerate()
            .map(|(i, t)| {
                let id = VoxelId::try_from(i + 1).map_err(|_| EngineError::InvalidVoxelId {
                    id: VoxelId::MAX,
                    palette_size,
                })?;
                Ok(VoxelType { id, ..t })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { types })
    }

    /// Loads the palette from a palette service.
    pub fn fetch(store: &dyn PaletteStore) -> Result<Self> {
        let types = store.fetch_types()?;
        log::info!("Fetched {} voxel types", types.len());
        Self::new(types)
    }

    /// Number of non-empty voxel types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the palette has no non-empty voxel types.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// All types in id order.
    pub fn types(&self) -> &[VoxelType] {
        &self.types
    }

    /// Looks up a type; `None` for the empty id and for ids past the end.
    pub fn get(&self, id: VoxelId) -> Option<&VoxelType> {
        if id == EMPTY_VOXEL {
            return None;
        }
        self.types.get(id as usize - 1)
    }

    /// Color of a non-empty voxel id.
    ///
    /// # Panics
    /// Panics if `id` is empty or outside the palette. Ids reach the mesh builder only
    /// through validated writes, so a miss here means the voxel data is corrupt.
    pub fn color(&self, id: VoxelId) -> Rgb {
        match self.get(id) {
            Some(voxel_type) => voxel_type.color,
            None => panic!(
                "voxel id {} has no palette entry (palette size {})",
                id,
                self.types.len()
            ),
        }
    }

    /// Checks that `id` may be stored in a chunk (`0..=len`).
    pub fn validate(&self, id: VoxelId) -> Result<()> {
        if id as usize > self.types.len() {
            return Err(EngineError::InvalidVoxelId {
                id,
                palette_size: self.types.len(),
            });
        }
        Ok(())
    }
}

impl Default for VoxelPalette {
    fn default() -> Self {
        Self {
            types: default_types(),
        }
    }
}

fn default_types() -> Vec<VoxelType> {
    [[86, 125, 70], [134, 96, 67], [128, 128, 128]]
        .into_iter()
        .enumerate()
        .map(|(i, color)| VoxelType {
            id: (i + 1) as VoxelId,
            color,
            transparent: false,
        })
        .collect()
}

/// The voxel palette service.
pub trait PaletteStore {
    /// Returns every voxel type ordered by id.
    fn fetch_types(&self) -> Result<Vec<VoxelType>>;

    /// Appends a new type and returns its id.
    fn add_type(&mut self, color: Rgb, transparent: bool) -> Result<VoxelId>;
}

fn next_id(types: &[VoxelType]) -> Result<VoxelId> {
    if types.len() >= VoxelId::MAX as usize {
        return Err(EngineError::InvalidVoxelId {
            id: VoxelId::MAX,
            palette_size: types.len(),
        });
    }
    Ok((types.len() + 1) as VoxelId)
}

/// Palette held in memory, seeded with three earth tones.
#[derive(Debug, Clone)]
pub struct MemoryPaletteStore {
    types: Vec<VoxelType>,
}

impl MemoryPaletteStore {
    /// A store holding exactly `types`.
    pub fn with_types(types: Vec<VoxelType>) -> Self {
        Self { types }
    }
}

impl Default for MemoryPaletteStore {
    fn default() -> Self {
        Self {
            types: default_types(),
        }
    }
}

impl PaletteStore for MemoryPaletteStore {
    fn fetch_types(&self) -> Result<Vec<VoxelType>> {
        Ok(self.types.clone())
    }

    fn add_type(&mut self, color: Rgb, transparent: bool) -> Result<VoxelId> {
        let id = next_id(&self.types)?;
        self.types.push(VoxelType {
            id,
            color,
            transparent,
        });
        Ok(id)
    }
}

/// Palette persisted as a JSON array next to the world data.
///
/// A missing file is created with the default palette on first fetch.
#[derive(Debug, Clone)]
pub struct JsonPaletteStore {
    path: PathBuf,
}

impl JsonPaletteStore {
    /// A store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn write(&self, types: &[VoxelType]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(types)?)?;
        Ok(())
    }
}

impl PaletteStore for JsonPaletteStore {
    fn fetch_types(&self) -> Result<Vec<VoxelType>> {
        if !self.path.exists() {
            log::info!("No palette at {:?}, writing default palette", self.path);
            let types = default_types();
            self.write(&types)?;
            return Ok(types);
        }
        let contents = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn add_type(&mut self, color: Rgb, transparent: bool) -> Result<VoxelId> {
        let mut types = self.fetch_types()?;
        let id = next_id(&types)?;
        types.push(VoxelType {
            id,
            color,
            transparent,
        });
        self.write(&types)?;
        log::info!("Added voxel type {} with color {:?}", id, color);
        Ok(id)
    }
}
