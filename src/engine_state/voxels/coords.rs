//! # Coordinate Mapping
//!
//! Conversions between world voxel coordinates, chunk-grid coordinates and
//! chunk-local coordinates.
//!
//! Division and modulo are floored (`div_euclid` / `rem_euclid`), so voxel
//! `-1` lives in chunk `-1` at local `CHUNK_DIMENSION - 1` rather than in chunk
//! `0` at local `-1`.

use cgmath::{Point3, Vector3};

use super::chunk::CHUNK_DIMENSION;

/// Splits a world voxel coordinate into its chunk position and chunk-local position.
///
/// Every component of the local position is in `0..CHUNK_DIMENSION`.
pub fn world_to_local(world: Point3<i32>) -> (Point3<i32>, Point3<i32>) {
    let chunk = Point3::new(
        world.x.div_euclid(CHUNK_DIMENSION),
        world.y.div_euclid(CHUNK_DIMENSION),
        world.z.div_euclid(CHUNK_DIMENSION),
    );
    let local = Point3::new(
        world.x.rem_euclid(CHUNK_DIMENSION),
        world.y.rem_euclid(CHUNK_DIMENSION),
        world.z.rem_euclid(CHUNK_DIMENSION),
    );
    (chunk, local)
}

/// Inverse of [`world_to_local`].
pub fn local_to_world(chunk: Point3<i32>, local: Point3<i32>) -> Point3<i32> {
    chunk_origin(chunk) + Vector3::new(local.x, local.y, local.z)
}

/// World coordinate of a chunk's `(0, 0, 0)` voxel.
pub fn chunk_origin(chunk: Point3<i32>) -> Point3<i32> {
    Point3::new(
        chunk.x * CHUNK_DIMENSION,
        chunk.y * CHUNK_DIMENSION,
        chunk.z * CHUNK_DIMENSION,
    )
}

/// The voxel containing a floating-point world position.
pub fn voxel_at_position(position: Point3<f32>) -> Point3<i32> {
    Point3::new(
        position.x.floor() as i32,
        position.y.floor() as i32,
        position.z.floor() as i32,
    )
}

/// The chunk containing a floating-point world position.
pub fn chunk_at_position(position: Point3<f32>) -> Point3<i32> {
    world_to_local(voxel_at_position(position)).0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_covers_negative_coordinates() {
        for x in -40..40 {
            for y in [-33, -17, -16, -15, -1, 0, 1, 15, 16, 31] {
                let world = Point3::new(x, y, -x * 3);
                let (chunk, local) = world_to_local(world);

                assert_eq!(local_to_world(chunk, local), world);
                for axis in [local.x, local.y, local.z] {
                    assert!((0..CHUNK_DIMENSION).contains(&axis), "{:?} -> {:?}", world, local);
                }
            }
        }
    }

    #[test]
    fn minus_one_is_last_voxel_of_previous_chunk() {
        let (chunk, local) = world_to_local(Point3::new(-1, -16, -17));
        assert_eq!(chunk, Point3::new(-1, -1, -2));
        assert_eq!(local, Point3::new(15, 0, 15));
    }

    #[test]
    fn float_positions_floor() {
        assert_eq!(voxel_at_position(Point3::new(-0.2, 0.9, -2.0)), Point3::new(-1, 0, -2));
        assert_eq!(chunk_at_position(Point3::new(8.0, -2.0, 8.0)), Point3::new(0, -1, 0));
    }
}
