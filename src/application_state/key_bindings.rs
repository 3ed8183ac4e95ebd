//! # Key Bindings
//!
//! Maps logical player actions to physical keys. Bindings are configured by
//! action name and winit key-code name, for example `"move_up": "KeyR"`.

use std::collections::{BTreeMap, HashMap};

use phf::phf_map;
use winit::keyboard::KeyCode;

use crate::error::{EngineError, Result};

/// Key-code names accepted in configuration files.
static KEY_NAMES: phf::Map<&'static str, KeyCode> = phf_map! {
    "KeyA" => KeyCode::KeyA, "KeyB" => KeyCode::KeyB, "KeyC" => KeyCode::KeyC,
    "KeyD" => KeyCode::KeyD, "KeyE" => KeyCode::KeyE, "KeyF" => KeyCode::KeyF,
    "KeyG" => KeyCode::KeyG, "KeyH" => KeyCode::KeyH, "KeyI" => KeyCode::KeyI,
    "KeyJ" => KeyCode::KeyJ, "KeyK" => KeyCode::KeyK, "KeyL" => KeyCode::KeyL,
    "KeyM" => KeyCode::KeyM, "KeyN" => KeyCode::KeyN, "KeyO" => KeyCode::KeyO,
    "KeyP" => KeyCode::KeyP, "KeyQ" => KeyCode::KeyQ, "KeyR" => KeyCode::KeyR,
    "KeyS" => KeyCode::KeyS, "KeyT" => KeyCode::KeyT, "KeyU" => KeyCode::KeyU,
    "KeyV" => KeyCode::KeyV, "KeyW" => KeyCode::KeyW, "KeyX" => KeyCode::KeyX,
    "KeyY" => KeyCode::KeyY, "KeyZ" => KeyCode::KeyZ,
    "Digit0" => KeyCode::Digit0, "Digit1" => KeyCode::Digit1, "Digit2" => KeyCode::Digit2,
    "Digit3" => KeyCode::Digit3, "Digit4" => KeyCode::Digit4, "Digit5" => KeyCode::Digit5,
    "Digit6" => KeyCode::Digit6, "Digit7" => KeyCode::Digit7, "Digit8" => KeyCode::Digit8,
    "Digit9" => KeyCode::Digit9,
    "Space" => KeyCode::Space,
    "ShiftLeft" => KeyCode::ShiftLeft, "ShiftRight" => KeyCode::ShiftRight,
    "ControlLeft" => KeyCode::ControlLeft, "ControlRight" => KeyCode::ControlRight,
    "AltLeft" => KeyCode::AltLeft, "AltRight" => KeyCode::AltRight,
    "Tab" => KeyCode::Tab, "Enter" => KeyCode::Enter, "Escape" => KeyCode::Escape,
    "Backspace" => KeyCode::Backspace,
    "ArrowUp" => KeyCode::ArrowUp, "ArrowDown" => KeyCode::ArrowDown,
    "ArrowLeft" => KeyCode::ArrowLeft, "ArrowRight" => KeyCode::ArrowRight,
    "F1" => KeyCode::F1, "F2" => KeyCode::F2, "F3" => KeyCode::F3, "F4" => KeyCode::F4,
};

/// Looks up a key by its winit key-code name.
pub fn key_from_name(name: &str) -> Option<KeyCode> {
    KEY_NAMES.get(name).copied()
}

/// Logical actions that can be bound to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveForward,
    MoveBackward,
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    ToggleWireframe,
    Quit,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::MoveForward,
        Action::MoveBackward,
        Action::MoveLeft,
        Action::MoveRight,
        Action::MoveUp,
        Action::MoveDown,
        Action::ToggleWireframe,
        Action::Quit,
    ];

    /// Name used for this action in configuration files.
    pub fn name(self) -> &'static str {
        match self {
            Action::MoveForward => "move_forward",
            Action::MoveBackward => "move_backward",
            Action::MoveLeft => "move_left",
            Action::MoveRight => "move_right",
            Action::MoveUp => "move_up",
            Action::MoveDown => "move_down",
            Action::ToggleWireframe => "toggle_wireframe",
            Action::Quit => "quit",
        }
    }

    pub fn from_name(name: &str) -> Option<Action> {
        Action::ALL.into_iter().find(|action| action.name() == name)
    }

    fn default_key(self) -> KeyCode {
        match self {
            Action::MoveForward => KeyCode::KeyW,
            Action::MoveBackward => KeyCode::KeyS,
            Action::MoveLeft => KeyCode::KeyA,
            Action::MoveRight => KeyCode::KeyD,
            Action::MoveUp => KeyCode::Space,
            Action::MoveDown => KeyCode::ShiftLeft,
            Action::ToggleWireframe => KeyCode::KeyE,
            Action::Quit => KeyCode::Escape,
        }
    }
}

/// One key per action.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBindings {
    keys: HashMap<Action, KeyCode>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            keys: Action::ALL
                .into_iter()
                .map(|action| (action, action.default_key()))
                .collect(),
        }
    }
}

impl KeyBindings {
    /// Starts from the defaults and applies the configured overrides.
    ///
    /// An unknown key name is an error; an unknown action name is logged and skipped.
    pub fn from_config(overrides: &BTreeMap<String, String>) -> Result<Self> {
        let mut bindings = Self::default();

        for (action_name, key_name) in overrides {
            let key = key_from_name(key_name)
                .ok_or_else(|| EngineError::UnknownKey(key_name.clone()))?;

            match Action::from_name(action_name) {
                Some(action) => {
                    bindings.keys.insert(action, key);
                }
                None => log::warn!("Ignoring binding for unknown action {:?}", action_name),
            }
        }

        Ok(bindings)
    }

    pub fn key_for(&self, action: Action) -> KeyCode {
        self.keys
            .get(&action)
            .copied()
            .unwrap_or_else(|| action.default_key())
    }

    /// Every bound key, for registering with the input manager.
    pub fn keys(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.keys.values().copied()
    }
}
