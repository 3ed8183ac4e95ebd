//! # Input State
//!
//! This module defines the input state types used by the input manager and
//! handed to the engine once per frame.

use std::collections::HashMap;
use winit::{event::MouseButton, keyboard::KeyCode};

/// Represents the state of an input (key or button) in the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawInputState {
    /// The input is not being pressed
    #[default]
    NotPressed,
    /// The input was just pressed this frame
    Pressed,
    /// The input has been held down for multiple frames
    Held,
    /// The input was just released this frame
    Released,
}

impl RawInputState {
    /// Returns true if the input is currently active (pressed or held)
    pub fn is_active(&self) -> bool {
        matches!(self, RawInputState::Pressed | RawInputState::Held)
    }

    /// Returns true if the input was just pressed this frame
    pub fn is_just_pressed(&self) -> bool {
        matches!(self, RawInputState::Pressed)
    }

    /// Returns true if the input was just released this frame
    pub fn is_just_released(&self) -> bool {
        matches!(self, RawInputState::Released)
    }

    /// Derives the frame state from the pressed flag of the previous and current frame.
    pub fn from_raw_states(previous: bool, current: bool) -> Self {
        match (previous, current) {
            (false, true) => RawInputState::Pressed,
            (true, true) => RawInputState::Held,
            (true, false) => RawInputState::Released,
            (false, false) => RawInputState::NotPressed,
        }
    }
}

/// Everything the player did during one frame.
#[derive(Debug, Clone, Default)]
pub struct ProcessedInputState {
    /// Current state of every tracked key
    pub keyboard_states: HashMap<KeyCode, RawInputState>,

    /// Current state of every tracked mouse button
    pub mouse_button_states: HashMap<MouseButton, RawInputState>,

    /// Mouse motion events of this frame, in arrival order
    pub mouse_motion: Vec<(f64, f64)>,

    /// Net mouse wheel movement in lines (positive is away from the user)
    pub wheel_lines: i32,
}

impl ProcessedInputState {
    pub fn get_key_state(&self, key: KeyCode) -> RawInputState {
        self.keyboard_states.get(&key).copied().unwrap_or_default()
    }

    pub fn get_mouse_button_state(&self, button: MouseButton) -> RawInputState {
        self.mouse_button_states
            .get(&button)
            .copied()
            .unwrap_or_default()
    }

    pub fn has_mouse_motion(&self) -> bool {
        !self.mouse_motion.is_empty()
    }
}

/// Tracks the state of mouse inputs between frames.
#[derive(Debug, Default)]
pub struct MouseInput {
    /// Previous frame's mouse button states
    pub mouse_button_inputs_old: HashMap<MouseButton, bool>,
    /// Current frame's mouse button states
    pub mouse_button_inputs_new: HashMap<MouseButton, bool>,
    /// Wheel lines accumulated since the last frame
    pub wheel_lines: i32,
    /// Mouse motion events since the last frame
    pub mouse_motion: Vec<(f64, f64)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions() {
        assert_eq!(RawInputState::from_raw_states(false, true), RawInputState::Pressed);
        assert_eq!(RawInputState::from_raw_states(true, true), RawInputState::Held);
        assert_eq!(RawInputState::from_raw_states(true, false), RawInputState::Released);
        assert!(RawInputState::Held.is_active());
        assert!(!RawInputState::Released.is_active());
        assert!(RawInputState::Released.is_just_released());
    }

    #[test]
    fn untracked_inputs_read_as_not_pressed() {
        let input = ProcessedInputState::default();
        assert_eq!(input.get_key_state(KeyCode::KeyW), RawInputState::NotPressed);
        assert_eq!(
            input.get_mouse_button_state(MouseButton::Left),
            RawInputState::NotPressed
        );
    }
}
