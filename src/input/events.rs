//! Raw input records reported by the platform input source

use super::key::{ControllerElement, KeyCode, MouseKey};

/// A raw input event, before any control-mode filtering
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawInput {
    /// Keyboard key edge
    Key {
        code: KeyCode,
        pressed: bool,
        /// Auto-repeat generated by the OS
        repeat: bool,
    },

    /// Relative pointer motion in screen units
    MouseMotion { dx: f32, dy: f32 },

    /// Mouse button edge (only the physical buttons are reported here)
    MouseButton { button: MouseKey, pressed: bool },

    /// Scroll delta in pixels (positive y scrolls up)
    Scroll { dx: f32, dy: f32 },

    /// Controller button edge
    ControllerButton {
        element: ControllerElement,
        pressed: bool,
    },

    /// Controller two-axis element, each axis in `-1.0..=1.0` with y pointing up
    ControllerAxis {
        element: ControllerElement,
        x: f32,
        y: f32,
    },
}

impl RawInput {
    /// Input category, used for per-category adapter selection
    pub fn category(&self) -> InputCategory {
        match self {
            RawInput::Key { .. } => InputCategory::Keyboard,
            RawInput::MouseMotion { .. } | RawInput::MouseButton { .. } | RawInput::Scroll { .. } => {
                InputCategory::Mouse
            }
            RawInput::ControllerButton { .. } | RawInput::ControllerAxis { .. } => {
                InputCategory::Controller
            }
        }
    }
}

/// Physical input category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputCategory {
    Keyboard,
    Mouse,
    Controller,
}
