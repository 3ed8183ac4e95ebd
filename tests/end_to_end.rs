use std::sync::Arc;

use voxel_raster::application_state::input_source::{ScriptedFrame, ScriptedInput};
use voxel_raster::application_state::key_bindings::KeyBindings;
use voxel_raster::application_state::ApplicationState;
use voxel_raster::config::EngineConfig;
use voxel_raster::engine_state::voxels::block::block_side::BlockSide;
use voxel_raster::engine_state::voxels::block::VoxelPalette;
use voxel_raster::engine_state::voxels::generation::FlatGenerator;
use voxel_raster::engine_state::voxels::persistence::MemoryChunkStore;
use voxel_raster::engine_state::EngineState;

const SIZE: u32 = 200;

fn flat_world_session() -> ApplicationState {
    let config = EngineConfig {
        width: SIZE,
        height: SIZE,
        spawn_position: [8.0, -2.0, 8.0],
        ..Default::default()
    };
    let engine_state = EngineState::new(
        &config,
        VoxelPalette::default(),
        Arc::new(MemoryChunkStore::new()),
        Arc::new(FlatGenerator::new(0, 1)),
    )
    .unwrap();
    let input = ScriptedInput::new(vec![ScriptedFrame::default()], &KeyBindings::default());
    ApplicationState::new(engine_state, Box::new(input), &config)
}

#[test]
fn flat_layer_mesh_lies_on_the_ground() {
    let mut app = flat_world_session();
    assert!(app.run_frame());

    let mesh = app.engine_state.world.mesh();
    assert!(!mesh.is_empty());
    assert!(mesh.iter().all(|face| face.position.y == 0));

    // 4 x 4 chunks of 16 x 16 voxels on the y = 0 layer, one top face each.
    let top_faces = mesh.iter().filter(|face| face.side == BlockSide::TOP).count();
    assert_eq!(top_faces, 64 * 64);
}

#[test]
fn flat_layer_renders_ground_below_the_horizon() {
    let mut app = flat_world_session();
    assert!(app.run_frame());

    let sky = EngineConfig::default().sky_color;
    let ground = VoxelPalette::default().color(1);
    let canvas = &app.canvas;

    for y in 0..SIZE / 2 {
        assert_eq!(canvas.count_in_row(y, sky), SIZE as usize, "row {} is not all sky", y);
    }

    let mut ground_pixels = 0;
    let mut total = 0;
    for y in 120..SIZE {
        for x in 0..SIZE {
            let pixel = canvas.pixel(x, y).unwrap();
            total += 1;
            if pixel != sky {
                assert_eq!(pixel, ground, "unexpected color at ({}, {})", x, y);
                ground_pixels += 1;
            }
        }
    }
    assert!(
        ground_pixels * 10 > total * 9,
        "only {} of {} lower pixels are ground",
        ground_pixels,
        total
    );

    let stats = app.last_frame();
    assert!(stats.faces_drawn > 0);
    assert!(stats.faces_drawn < stats.faces_in_mesh);
}
