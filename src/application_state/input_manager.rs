//! # Input Manager
//!
//! Tracks pressed keys and buttons across frames and turns them into one
//! [`ProcessedInputState`] per frame:
//! - Keyboard input state tracking
//! - Mouse button, motion and wheel tracking
//! - Pressed / held / released derivation from two consecutive frames
//!
//! Input arrives through plain press/release calls, so any event source (a
//! window, a replayed script) can drive it.

use std::collections::HashMap;

use winit::{event::MouseButton, keyboard::KeyCode};

use super::input_state::{MouseInput, ProcessedInputState, RawInputState};

/// Mouse buttons tracked by every input manager.
const MOUSE_BUTTONS: [MouseButton; 3] = [MouseButton::Left, MouseButton::Right, MouseButton::Middle];

/// Manages input state for keyboard and mouse.
pub struct InputManager {
    /// Previous frame's keyboard states
    pub keyboard_inputs_old: HashMap<KeyCode, bool>,
    /// Current frame's keyboard states
    pub keyboard_inputs_new: HashMap<KeyCode, bool>,
    /// Mouse input state
    pub mouse_inputs: MouseInput,
}

impl InputManager {
    /// Creates an input manager tracking `keys` and the common mouse buttons.
    ///
    /// Keys outside `keys` are ignored.
    pub fn new(keys: impl IntoIterator<Item = KeyCode>) -> Self {
        let mut keyboard_inputs_old = HashMap::new();
        let mut keyboard_inputs_new = HashMap::new();
        for key_code in keys {
            keyboard_inputs_old.insert(key_code, false);
            keyboard_inputs_new.insert(key_code, false);
        }

        let mut mouse_inputs = MouseInput::default();
        for button in MOUSE_BUTTONS {
            mouse_inputs.mouse_button_inputs_old.insert(button, false);
            mouse_inputs.mouse_button_inputs_new.insert(button, false);
        }

        Self {
            keyboard_inputs_old,
            keyboard_inputs_new,
            mouse_inputs,
        }
    }

    /// Copies the current states into the previous-frame states.
    pub fn move_old_states(&mut self) {
        for (key, new_state) in self.keyboard_inputs_new.iter() {
            if let Some(old_state) = self.keyboard_inputs_old.get_mut(key) {
                *old_state = *new_state;
            }
        }

        for (button, new_state) in self.mouse_inputs.mouse_button_inputs_new.iter() {
            if let Some(old_state) = self.mouse_inputs.mouse_button_inputs_old.get_mut(button) {
                *old_state = *new_state;
            }
        }
    }

    pub fn set_key(&mut self, key: KeyCode, pressed: bool) {
        if let Some(key_state) = self.keyboard_inputs_new.get_mut(&key) {
            *key_state = pressed;
        }
    }

    pub fn set_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if let Some(button_state) = self.mouse_inputs.mouse_button_inputs_new.get_mut(&button) {
            *button_state = pressed;
        }
    }

    /// Records one mouse motion event.
    pub fn intake_mouse_motion(&mut self, delta: (f64, f64)) {
        self.mouse_inputs.mouse_motion.push(delta);
    }

    /// Records wheel movement in lines.
    pub fn intake_wheel(&mut self, lines: i32) {
        self.mouse_inputs.wheel_lines += lines;
    }

    /// Every key currently tracked.
    pub fn tracked_keys(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.keyboard_inputs_new.keys().copied()
    }

    /// Builds the processed input state for the current frame.
    pub fn create_processed_input_state(&self) -> ProcessedInputState {
        let keyboard_states = self
            .keyboard_inputs_new
            .iter()
            .map(|(key, &new_state)| {
                let old_state = self.keyboard_inputs_old.get(key).copied().unwrap_or(false);
                (*key, RawInputState::from_raw_states(old_state, new_state))
            })
            .collect();

        let mouse_button_states = self
            .mouse_inputs
            .mouse_button_inputs_new
            .iter()
            .map(|(button, &new_state)| {
                let old_state = self
                    .mouse_inputs
                    .mouse_button_inputs_old
                    .get(button)
                    .copied()
                    .unwrap_or(false);
                (*button, RawInputState::from_raw_states(old_state, new_state))
            })
            .collect();

        ProcessedInputState {
            keyboard_states,
            mouse_button_states,
            mouse_motion: self.mouse_inputs.mouse_motion.clone(),
            wheel_lines: self.mouse_inputs.wheel_lines,
        }
    }

    /// Builds this frame's input state and starts the next frame.
    pub fn get_and_reset_processed_input(&mut self) -> ProcessedInputState {
        let processed_input = self.create_processed_input_state();
        self.reset_inputs();
        processed_input
    }

    /// Starts a new frame: current states become previous states and
    /// per-frame accumulators are cleared.
    pub fn reset_inputs(&mut self) {
        self.move_old_states();
        self.mouse_inputs.wheel_lines = 0;
        self.mouse_inputs.mouse_motion.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_hold_release_across_frames() {
        let mut manager = InputManager::new([KeyCode::KeyW]);

        manager.set_key(KeyCode::KeyW, true);
        let first = manager.get_and_reset_processed_input();
        assert_eq!(first.get_key_state(KeyCode::KeyW), RawInputState::Pressed);

        let second = manager.get_and_reset_processed_input();
        assert_eq!(second.get_key_state(KeyCode::KeyW), RawInputState::Held);

        manager.set_key(KeyCode::KeyW, false);
        let third = manager.get_and_reset_processed_input();
        assert_eq!(third.get_key_state(KeyCode::KeyW), RawInputState::Released);
    }

    #[test]
    fn untracked_keys_are_ignored() {
        let mut manager = InputManager::new([KeyCode::KeyW]);
        manager.set_key(KeyCode::KeyZ, true);
        let input = manager.get_and_reset_processed_input();
        assert!(!input.keyboard_states.contains_key(&KeyCode::KeyZ));
    }

    #[test]
    fn motion_and_wheel_accumulate_per_frame() {
        let mut manager = InputManager::new([]);
        manager.intake_mouse_motion((1.0, 0.0));
        manager.intake_mouse_motion((2.0, -1.0));
        manager.intake_wheel(1);
        manager.intake_wheel(1);
        manager.set_mouse_button(MouseButton::Right, true);

        let input = manager.get_and_reset_processed_input();
        assert_eq!(input.mouse_motion, vec![(1.0, 0.0), (2.0, -1.0)]);
        assert_eq!(input.wheel_lines, 2);
        assert!(input.get_mouse_button_state(MouseButton::Right).is_just_pressed());

        let next = manager.get_and_reset_processed_input();
        assert!(next.mouse_motion.is_empty());
        assert_eq!(next.wheel_lines, 0);
        assert!(next.get_mouse_button_state(MouseButton::Right).is_active());
    }
}
