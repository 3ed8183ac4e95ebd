//! # Engine State Module
//!
//! The core engine module that manages the state and functionality of the voxel engine.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container for the engine
//! * `camera_state` - Handles camera positioning and movement
//! * `player` - The camera plus voxel selection, placement and removal
//! * `rendering` - Meshing, the per-frame projection pipeline and drawing surfaces
//! * `task_management` - Worker threads for background chunk loading
//! * `voxels` - Voxel data, chunks, persistence and world generation
//!
//! ## Architecture
//!
//! Each subsystem is responsible for one aspect of the engine. `EngineState`
//! owns all of them and drives one frame at a time:
//!
//! ```text
//! set_input_commands -> process_input -> process_tasks -> render
//! ```

use std::sync::Arc;

use cgmath::Point3;
use web_time::Duration;
use winit::event::MouseButton;

use camera_state::camera::MoveDirections;
use camera_state::CameraUpdates;
use player::Player;
use rendering::{surface::RenderSurface, RenderSettings, RenderStats, Renderer};
use task_management::TaskManager;
use voxels::{block::VoxelPalette, generation::TerrainGenerator, persistence::ChunkStore, world::World};

use crate::application_state::input_state::ProcessedInputState;
use crate::application_state::key_bindings::{Action, KeyBindings};
use crate::config::{EngineConfig, StreamingMode};
use crate::error::Result;

pub mod camera_state;
pub mod player;
pub mod rendering;
pub mod task_management;
pub mod voxels;

/// The main state container for the voxel engine.
///
/// # Examples
///
/// ```ignore
/// let mut engine_state = EngineState::new(&config, palette, store, generator)?;
///
/// loop {
///     engine_state.set_input_commands(input_source.next_frame());
///     engine_state.process_input(delta_time);
///     engine_state.process_tasks();
///     engine_state.render(&mut canvas);
/// }
/// ```
pub struct EngineState {
    /// The camera and the selected voxel type
    pub player: Player,
    /// Current player actions derived from input
    pub player_actions: PlayerAction,
    /// The voxel world containing all chunk data
    pub world: World,
    /// Per-frame rendering pipeline
    pub renderer: Renderer,
    /// Worker pool, present only in background streaming mode
    task_manager: Option<TaskManager>,
    key_bindings: KeyBindings,
}

impl EngineState {
    /// Creates a new engine state with all subsystems initialized and the
    /// chunks around the spawn position streamed in.
    ///
    /// # Errors
    /// Fails if a configured key binding names an unknown key.
    pub fn new(
        config: &EngineConfig,
        palette: VoxelPalette,
        store: Arc<dyn ChunkStore>,
        generator: Arc<dyn TerrainGenerator>,
    ) -> Result<Self> {
        let key_bindings = KeyBindings::from_config(&config.key_bindings)?;
        let palette = Arc::new(palette);

        let [x, y, z] = config.spawn_position;
        let player = Player::new(
            Point3::new(x, y, z),
            config.player_speed,
            config.rotation_sensitivity,
            palette.len(),
        );

        let world = World::new(
            palette,
            store,
            generator,
            config.render_distance,
            config.neighbor_policy,
        );

        let task_manager = match config.streaming {
            StreamingMode::Blocking => None,
            StreamingMode::Background => Some(TaskManager::new(config.worker_threads.max(1))),
        };

        let mut engine_state = Self {
            player,
            player_actions: PlayerAction::default(),
            world,
            renderer: Renderer::new(RenderSettings::from(config)),
            task_manager,
            key_bindings,
        };
        engine_state.process_tasks();
        Ok(engine_state)
    }

    pub fn key_bindings(&self) -> &KeyBindings {
        &self.key_bindings
    }

    /// Sets the input commands for the next frame.
    pub fn set_input_commands(&mut self, input: ProcessedInputState) {
        self.player_actions = self.translate_processed_input(&input);
    }

    /// Translates the processed input state into player actions.
    ///
    /// Movement follows held keys. Wireframe toggling, placing (right mouse
    /// button) and removing (left mouse button) only trigger on the press.
    pub fn translate_processed_input(&self, input: &ProcessedInputState) -> PlayerAction {
        let held = |action| input.get_key_state(self.key_bindings.key_for(action)).is_active();

        PlayerAction {
            movement: MoveDirections {
                forward: held(Action::MoveForward),
                backward: held(Action::MoveBackward),
                left: held(Action::MoveLeft),
                right: held(Action::MoveRight),
                up: held(Action::MoveUp),
                down: held(Action::MoveDown),
            },
            rotate_view: input.mouse_motion.clone(),
            change_selection: input.wheel_lines,
            place_voxel: input.get_mouse_button_state(MouseButton::Right).is_just_pressed(),
            remove_voxel: input.get_mouse_button_state(MouseButton::Left).is_just_pressed(),
            toggle_wireframe: input
                .get_key_state(self.key_bindings.key_for(Action::ToggleWireframe))
                .is_just_pressed(),
            quit: held(Action::Quit),
        }
    }

    /// Applies the current player actions for a frame of length `dt`: render
    /// toggles, selection, camera rotation and movement, then voxel edits.
    pub fn process_input(&mut self, dt: Duration) {
        if self.player_actions.toggle_wireframe {
            self.renderer.toggle_wireframe();
        }
        self.player.cycle_selection(self.player_actions.change_selection);

        self.player.camera_state.intake_actions(&self.player_actions);
        if let Some(CameraUpdates { new_chunk_position }) = self.player.camera_state.update(dt) {
            log::debug!("Camera entered chunk {:?}", new_chunk_position);
        }

        if self.player_actions.place_voxel {
            if let Err(e) = self.player.place_voxel(&mut self.world) {
                log::warn!("Could not place voxel: {}", e);
            }
        }
        if self.player_actions.remove_voxel {
            if let Err(e) = self.player.remove_voxel(&mut self.world) {
                log::warn!("Could not remove voxel: {}", e);
            }
        }
    }

    /// Streams chunks around the camera and rebuilds the world mesh.
    ///
    /// In background mode this also collects finished loads and feeds the
    /// worker pool.
    pub fn process_tasks(&mut self) {
        let viewer = self.player.camera().position;
        match &mut self.task_manager {
            None => self.world.update(viewer),
            Some(task_manager) => {
                task_manager.process_completed_tasks(&mut self.world);
                self.world.stream_chunks_deferred(viewer, task_manager);
                task_manager.process_queued_tasks();
                self.world.rebuild_world_mesh();
            }
        }
    }

    /// Renders the current frame into `surface`.
    pub fn render(&mut self, surface: &mut dyn RenderSurface) -> RenderStats {
        self.renderer
            .render(self.world.mesh(), self.player.camera(), surface)
    }

    /// Whether the last input asked to quit.
    pub fn quit_requested(&self) -> bool {
        self.player_actions.quit
    }

    /// True once no background load is outstanding. Always true in blocking mode.
    pub fn is_streaming_idle(&self) -> bool {
        self.world.pending_loads() == 0
            && self
                .task_manager
                .as_ref()
                .map_or(true, TaskManager::is_idle)
    }

    /// Saves every loaded chunk.
    pub fn save(&self) -> Result<()> {
        self.world.save_all()
    }
}

/// Player actions derived from one frame of input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerAction {
    /// Movement keys held this frame
    pub movement: MoveDirections,
    /// Mouse motion events, in arrival order
    pub rotate_view: Vec<(f64, f64)>,
    /// Wheel lines; moves the selected voxel type
    pub change_selection: i32,
    /// Actions that should only trigger on press, not hold
    pub place_voxel: bool,
    pub remove_voxel: bool,
    pub toggle_wireframe: bool,
    pub quit: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use winit::keyboard::KeyCode;

    use crate::application_state::input_state::RawInputState;
    use super::voxels::generation::FlatGenerator;
    use super::voxels::persistence::MemoryChunkStore;

    fn engine(config: &EngineConfig) -> EngineState {
        EngineState::new(
            config,
            VoxelPalette::default(),
            Arc::new(MemoryChunkStore::new()),
            Arc::new(FlatGenerator::new(0, 1)),
        )
        .unwrap()
    }

    fn small_config() -> EngineConfig {
        EngineConfig {
            render_distance: 3,
            spawn_position: [8.0, -2.0, 8.0],
            ..Default::default()
        }
    }

    fn keys(states: &[(KeyCode, RawInputState)]) -> ProcessedInputState {
        ProcessedInputState {
            keyboard_states: states.iter().copied().collect::<HashMap<_, _>>(),
            ..Default::default()
        }
    }

    #[test]
    fn translates_bound_keys() {
        let state = engine(&small_config());
        let actions = state.translate_processed_input(&keys(&[
            (KeyCode::KeyW, RawInputState::Held),
            (KeyCode::ShiftLeft, RawInputState::Pressed),
            (KeyCode::KeyE, RawInputState::Held),
        ]));

        assert!(actions.movement.forward);
        assert!(actions.movement.down);
        assert!(!actions.movement.backward);
        assert!(!actions.toggle_wireframe);
        assert!(!actions.quit);
    }

    #[test]
    fn rebound_keys_are_honoured() {
        let mut config = small_config();
        config
            .key_bindings
            .insert("move_forward".to_string(), "ArrowUp".to_string());
        let state = engine(&config);

        let actions = state.translate_processed_input(&keys(&[(KeyCode::ArrowUp, RawInputState::Held)]));
        assert!(actions.movement.forward);
        let actions = state.translate_processed_input(&keys(&[(KeyCode::KeyW, RawInputState::Held)]));
        assert!(!actions.movement.forward);
    }

    #[test]
    fn wireframe_toggles_once_per_press() {
        let mut state = engine(&small_config());
        assert!(!state.renderer.settings.wireframe);

        state.set_input_commands(keys(&[(KeyCode::KeyE, RawInputState::Pressed)]));
        state.process_input(Duration::from_millis(16));
        assert!(state.renderer.settings.wireframe);

        state.set_input_commands(keys(&[(KeyCode::KeyE, RawInputState::Held)]));
        state.process_input(Duration::from_millis(16));
        assert!(state.renderer.settings.wireframe);
    }

    #[test]
    fn forward_movement_scales_with_time() {
        let mut state = engine(&small_config());
        state.set_input_commands(keys(&[(KeyCode::KeyW, RawInputState::Held)]));
        state.process_input(Duration::from_millis(500));

        let position = state.player.camera().position;
        assert!((position.z - 10.5).abs() < 1e-4);
        assert!((position.x - 8.0).abs() < 1e-4);
    }

    #[test]
    fn right_click_places_the_selected_voxel() {
        let mut state = engine(&small_config());
        let mut input = ProcessedInputState::default();
        input
            .mouse_button_states
            .insert(MouseButton::Right, RawInputState::Pressed);
        input.wheel_lines = 1;

        state.set_input_commands(input);
        state.process_input(Duration::from_millis(16));
        assert_eq!(state.player.selected_voxel(), 2);
        assert_eq!(state.world.get_voxel(Point3::new(8, -2, 8)), 2);
    }

    #[test]
    fn initial_stream_fills_the_window() {
        let state = engine(&small_config());
        assert_eq!(state.world.loaded_positions().len(), 27);
        assert!(!state.world.mesh().is_empty());
        assert!(state.is_streaming_idle());
    }

    #[test]
    fn escape_requests_quit() {
        let mut state = engine(&small_config());
        state.set_input_commands(keys(&[(KeyCode::Escape, RawInputState::Pressed)]));
        assert!(state.quit_requested());
    }
}
