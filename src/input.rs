// ==============================================================================
// input.rs — KEYBOARD STATE -> CONTROL INPUTS
// ------------------------------------------------------------------------------
// Display clients forward raw key-down / key-up events. The input task samples
// the held-key set on its own cadence and turns it into a ControlInputs
// snapshot for the player car.
// ==============================================================================

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlInputs {
    pub accelerate: bool,
    pub brake: bool, // brake, then reverse once stopped
    pub left: bool,
    pub right: bool,
    pub drift: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Accelerate,
    Brake,
    Left,
    Right,
    Drift,
}

impl Control {
    /// Accepts both `KeyboardEvent.key` and `KeyboardEvent.code` spellings.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" | "w" | "W" | "KeyW" => Some(Control::Accelerate),
            "ArrowDown" | "s" | "S" | "KeyS" => Some(Control::Brake),
            "ArrowLeft" | "a" | "A" | "KeyA" => Some(Control::Left),
            "ArrowRight" | "d" | "D" | "KeyD" => Some(Control::Right),
            " " | "Space" | "Spacebar" => Some(Control::Drift),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct KeyboardState {
    held: HashSet<String>,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys no control listens to are dropped, so the set stays bounded.
    pub fn set_key(&mut self, key: &str, pressed: bool) {
        if pressed {
            if Control::from_key(key).is_some() {
                self.held.insert(key.to_string());
            }
        } else {
            self.held.remove(key);
        }
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn snapshot(&self) -> ControlInputs {
        let mut inputs = ControlInputs::default();
        for control in self.held.iter().filter_map(|k| Control::from_key(k)) {
            match control {
                Control::Accelerate => inputs.accelerate = true,
                Control::Brake => inputs.brake = true,
                Control::Left => inputs.left = true,
                Control::Right => inputs.right = true,
                Control::Drift => inputs.drift = true,
            }
        }
        inputs
    }
}
