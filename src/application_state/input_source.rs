//! # Input Sources
//!
//! An [`InputSource`] hands the frame loop one [`ProcessedInputState`] per
//! frame. [`ScriptedInput`] replays a fixed list of frames, which is what the
//! headless binary and the tests drive the engine with.

use std::collections::VecDeque;
use std::time::Duration;

use winit::{event::MouseButton, keyboard::KeyCode};

use super::input_manager::InputManager;
use super::input_state::ProcessedInputState;
use super::key_bindings::{Action, KeyBindings};

/// Supplies per-frame input to the application.
pub trait InputSource {
    /// Input for the next frame.
    fn next_frame(&mut self) -> ProcessedInputState;

    /// Simulated frame duration, if this source wants deterministic time steps
    /// instead of wall-clock time.
    fn fixed_timestep(&self) -> Option<Duration> {
        None
    }
}

/// What is held down or moved during one scripted frame.
#[derive(Debug, Clone, Default)]
pub struct ScriptedFrame {
    pub held_keys: Vec<KeyCode>,
    pub held_buttons: Vec<MouseButton>,
    pub mouse_motion: Vec<(f64, f64)>,
    pub wheel_lines: i32,
}

impl ScriptedFrame {
    pub fn holding(keys: &[KeyCode]) -> Self {
        Self {
            held_keys: keys.to_vec(),
            ..Default::default()
        }
    }
}

/// Replays scripted frames, then presses the quit key.
pub struct ScriptedInput {
    input_manager: InputManager,
    frames: VecDeque<ScriptedFrame>,
    quit_key: KeyCode,
    timestep: Duration,
}

impl ScriptedInput {
    /// Default simulated frame duration (60 frames per second).
    pub const DEFAULT_TIMESTEP: Duration = Duration::from_micros(16_667);

    pub fn new(frames: Vec<ScriptedFrame>, bindings: &KeyBindings) -> Self {
        Self {
            input_manager: InputManager::new(bindings.keys()),
            frames: frames.into(),
            quit_key: bindings.key_for(Action::Quit),
            timestep: Self::DEFAULT_TIMESTEP,
        }
    }

    pub fn with_timestep(mut self, timestep: Duration) -> Self {
        self.timestep = timestep;
        self
    }

    /// `frame_count` frames of walking forward while panning slowly to the right.
    pub fn walk(frame_count: usize, bindings: &KeyBindings) -> Self {
        let frame = ScriptedFrame {
            held_keys: vec![bindings.key_for(Action::MoveForward)],
            mouse_motion: vec![(2.0, 0.0)],
            ..Default::default()
        };
        Self::new(vec![frame; frame_count], bindings)
    }

    /// Frames left before the quit key is pressed.
    pub fn remaining_frames(&self) -> usize {
        self.frames.len()
    }

    fn apply_frame(&mut self, frame: &ScriptedFrame) {
        let tracked: Vec<KeyCode> = self.input_manager.tracked_keys().collect();
        for key in tracked {
            self.input_manager.set_key(key, frame.held_keys.contains(&key));
        }

        for button in [MouseButton::Left, MouseButton::Right, MouseButton::Middle] {
            self.input_manager
                .set_mouse_button(button, frame.held_buttons.contains(&button));
        }

        for &delta in &frame.mouse_motion {
            self.input_manager.intake_mouse_motion(delta);
        }
        self.input_manager.intake_wheel(frame.wheel_lines);
    }
}

impl InputSource for ScriptedInput {
    fn next_frame(&mut self) -> ProcessedInputState {
        let frame = match self.frames.pop_front() {
            Some(frame) => frame,
            None => ScriptedFrame::holding(&[self.quit_key]),
        };
        self.apply_frame(&frame);
        self.input_manager.get_and_reset_processed_input()
    }

    fn fixed_timestep(&self) -> Option<Duration> {
        Some(self.timestep)
    }
}
