//! # Terrain Generation
//!
//! Procedural sources for chunks that have no saved data. Every generator is a
//! pure function of the chunk coordinate (and, for the noise generator, the
//! world seed), so a chunk regenerated after an unload is identical to the one
//! that was dropped.
//!
//! Generators are shared with the worker pool in background streaming mode and
//! must therefore be `Send + Sync`.

use cgmath::Point3;
use noise::{NoiseFn, Perlin};

use super::block::{VoxelId, EMPTY_VOXEL};
use super::chunk::{to_3d, CHUNK_DIMENSION, CHUNK_SIZE};
use super::coords::local_to_world;
use crate::config::GeneratorKind;
use crate::error::Result;

/// Produces the voxel array of a chunk that has never been saved.
pub trait TerrainGenerator: Send + Sync {
    /// Returns exactly `CHUNK_SIZE` voxel ids for the chunk at `position`.
    fn generate(&self, position: Point3<i32>) -> Result<Vec<VoxelId>>;
}

/// Builds the generator selected in configuration.
pub fn generator_for(
    kind: GeneratorKind,
    seed: u64,
    palette_size: usize,
) -> Box<dyn TerrainGenerator> {
    match kind {
        GeneratorKind::Rings => Box::new(RingsGenerator),
        GeneratorKind::Flat => Box::new(FlatGenerator::new(0, 1)),
        GeneratorKind::Perlin => Box::new(PerlinGenerator::new(seed, palette_size)),
        GeneratorKind::Empty => Box::new(EmptyGenerator),
    }
}

/// Fills a fresh voxel array by calling `f` with the world position of every voxel.
fn fill_with(
    position: Point3<i32>,
    mut f: impl FnMut(Point3<i32>) -> VoxelId,
) -> Vec<VoxelId> {
    (0..CHUNK_SIZE as usize)
        .map(|index| f(local_to_world(position, to_3d(index))))
        .collect()
}

/// Generates nothing but air.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyGenerator;

impl TerrainGenerator for EmptyGenerator {
    fn generate(&self, _position: Point3<i32>) -> Result<Vec<VoxelId>> {
        Ok(vec![EMPTY_VOXEL; CHUNK_SIZE as usize])
    }
}

/// A single layer of one voxel type at a fixed world `y`.
#[derive(Debug, Clone, Copy)]
pub struct FlatGenerator {
    layer_y: i32,
    voxel: VoxelId,
}

impl FlatGenerator {
    pub fn new(layer_y: i32, voxel: VoxelId) -> Self {
        Self { layer_y, voxel }
    }
}

impl TerrainGenerator for FlatGenerator {
    fn generate(&self, position: Point3<i32>) -> Result<Vec<VoxelId>> {
        // Chunks that do not contain the layer skip the per-voxel pass.
        if self.layer_y.div_euclid(CHUNK_DIMENSION) != position.y {
            return EmptyGenerator.generate(position);
        }
        Ok(fill_with(position, |world| {
            if world.y == self.layer_y {
                self.voxel
            } else {
                EMPTY_VOXEL
            }
        }))
    }
}

/// Concentric rings of voxel types 1, 2 and 3 on the `y = 0` layer.
///
/// The ring index is taken per voxel from its world `x`/`z`, scaled by the
/// chunk size, so neighboring voxels usually differ in type.
#[derive(Debug, Clone, Copy, Default)]
pub struct RingsGenerator;

impl RingsGenerator {
    /// Voxel type of the layer at the world position `world`.
    pub fn ring_voxel(world: Point3<i32>) -> VoxelId {
        let scaled_x = world.x as f64 * CHUNK_DIMENSION as f64;
        let scaled_z = world.z as f64 * CHUNK_DIMENSION as f64;
        let distance = (scaled_x * scaled_x + scaled_z * scaled_z).sqrt();
        ((distance / 2.0).floor() as u64 % 3) as VoxelId + 1
    }
}

impl TerrainGenerator for RingsGenerator {
    fn generate(&self, position: Point3<i32>) -> Result<Vec<VoxelId>> {
        if position.y != 0 {
            return EmptyGenerator.generate(position);
        }
        Ok(fill_with(position, |world| {
            if world.y == 0 {
                Self::ring_voxel(world)
            } else {
                EMPTY_VOXEL
            }
        }))
    }
}

/// Threshold above which Perlin noise is considered solid.
pub const PERLIN_POSITIVE_THRESHOLD: f64 = 0.2;
/// Threshold below which Perlin noise is considered solid.
pub const PERLIN_NEGATIVE_THRESHOLD: f64 = -0.2;
/// Scaling factor applied to world coordinates when sampling Perlin noise.
pub const PERLIN_SCALE_FACTOR: f64 = 0.02;

/// 3D Perlin noise caves.
///
/// A voxel is solid where the sampled noise leaves the
/// `[PERLIN_NEGATIVE_THRESHOLD, PERLIN_POSITIVE_THRESHOLD]` band. Solid voxels
/// get a type drawn from a random stream seeded by the world seed and the chunk
/// position.
pub struct PerlinGenerator {
    perlin: Perlin,
    seed: u64,
    palette_size: usize,
}

impl PerlinGenerator {
    pub fn new(seed: u64, palette_size: usize) -> Self {
        Self {
            perlin: Perlin::new(seed as u32),
            seed,
            palette_size,
        }
    }

    fn to_perlin_pos(pos: Point3<i32>) -> [f64; 3] {
        [
            pos.x as f64 * PERLIN_SCALE_FACTOR,
            pos.y as f64 * PERLIN_SCALE_FACTOR,
            pos.z as f64 * PERLIN_SCALE_FACTOR,
        ]
    }

    fn chunk_seed(&self, position: Point3<i32>) -> u64 {
        let packed = ((position.x as u32 as u64) << 42)
            ^ ((position.y as u32 as u64) << 21)
            ^ (position.z as u32 as u64);
        self.seed.rotate_left(17) ^ packed.wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }
}

impl TerrainGenerator for PerlinGenerator {
    fn generate(&self, position: Point3<i32>) -> Result<Vec<VoxelId>> {
        if self.palette_size == 0 {
            return EmptyGenerator.generate(position);
        }
        let max_id = self.palette_size.min(VoxelId::MAX as usize) as VoxelId;
        let mut rng = fastrand::Rng::with_seed(self.chunk_seed(position));

        Ok(fill_with(position, |world| {
            let sample = self.perlin.get(Self::to_perlin_pos(world));
            if (PERLIN_NEGATIVE_THRESHOLD..=PERLIN_POSITIVE_THRESHOLD).contains(&sample) {
                EMPTY_VOXEL
            } else {
                rng.u8(1..=max_id)
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::chunk::to_flat;

    #[test]
    fn flat_fills_only_the_layer() {
        let generator = FlatGenerator::new(0, 1);
        let voxels = generator.generate(Point3::new(0, 0, 0)).unwrap();
        assert_eq!(voxels.len(), CHUNK_SIZE as usize);
        assert_eq!(voxels.iter().filter(|&&v| v == 1).count(), 256);
        assert_eq!(voxels[to_flat(Point3::new(3, 0, 9))], 1);
        assert_eq!(voxels[to_flat(Point3::new(3, 1, 9))], EMPTY_VOXEL);

        let above = generator.generate(Point3::new(0, -1, 0)).unwrap();
        assert!(above.iter().all(|&v| v == EMPTY_VOXEL));
    }

    #[test]
    fn flat_layer_in_negative_chunk() {
        let voxels = FlatGenerator::new(-3, 2).generate(Point3::new(2, -1, 0)).unwrap();
        // World y = -3 is local y = 13 of chunk y = -1.
        assert_eq!(voxels[to_flat(Point3::new(0, 13, 0))], 2);
        assert_eq!(voxels.iter().filter(|&&v| v != 0).count(), 256);
    }

    #[test]
    fn rings_vary_per_voxel() {
        assert_eq!(RingsGenerator::ring_voxel(Point3::new(0, 0, 0)), 1);
        // sqrt(16^2) / 2 = 8, 8 % 3 = 2
        assert_eq!(RingsGenerator::ring_voxel(Point3::new(1, 0, 0)), 3);
        // 32 / 2 = 16, 16 % 3 = 1
        assert_eq!(RingsGenerator::ring_voxel(Point3::new(0, 0, -2)), 2);

        let voxels = RingsGenerator.generate(Point3::new(0, 0, 0)).unwrap();
        assert_eq!(voxels[to_flat(Point3::new(0, 0, 0))], 1);
        assert_eq!(voxels[to_flat(Point3::new(1, 0, 0))], 3);
        assert_eq!(voxels[to_flat(Point3::new(0, 0, 2))], 2);
        assert_eq!(voxels[to_flat(Point3::new(1, 1, 0))], EMPTY_VOXEL);
        assert_eq!(voxels.iter().filter(|&&v| v != 0).count(), 256);

        // World x = 17 is local x = 1 of chunk x = 1: sqrt(272^2) / 2 = 136, 136 % 3 = 1
        let voxels = RingsGenerator.generate(Point3::new(1, 0, 0)).unwrap();
        assert_eq!(voxels[to_flat(Point3::new(1, 0, 0))], 2);

        assert!(RingsGenerator
            .generate(Point3::new(0, 1, 0))
            .unwrap()
            .iter()
            .all(|&v| v == EMPTY_VOXEL));
    }

    #[test]
    fn perlin_is_deterministic_and_in_palette() {
        let a = PerlinGenerator::new(7, 3).generate(Point3::new(1, -1, 2)).unwrap();
        let b = PerlinGenerator::new(7, 3).generate(Point3::new(1, -1, 2)).unwrap();
        assert_eq!(a, b);
        assert!(a.iter().all(|&v| v <= 3));
    }

    #[test]
    fn empty_is_empty() {
        let voxels = EmptyGenerator.generate(Point3::new(-4, 2, 9)).unwrap();
        assert!(voxels.iter().all(|&v| v == EMPTY_VOXEL));
    }
}
