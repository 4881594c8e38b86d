//! Control modes
//!
//! The active [`ControlMode`] decides, per input category, which adapter sees
//! raw input and whether it reaches the dispatcher at all. The
//! [`InputRouter`] applies mode changes atomically with respect to input
//! routing.

mod adapters;
mod router;

use crate::input::LogicalKey;
use crate::touch::Point;

pub use adapters::{AdapterCtx, AdapterSet, ControllerAdapter, KeyboardAdapter, MouseAdapter, Route};
pub use router::{ControlKeys, InputRouter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ControlMode {
    /// Keymapping disabled, input passes through untouched
    #[default]
    Off,
    /// A text field has focus; keys go to the app, pointer still taps
    TextInput,
    /// Mouse drives the camera with the cursor captured
    CameraRotate,
    /// Cursor free, clicks become touches
    ArbitraryClick,
    /// The keymap editor is capturing keys
    Editor,
}

impl ControlMode {
    /// Modes that must not leave any touch behind when entered
    pub fn clears_all(self) -> bool {
        matches!(self, ControlMode::Off | ControlMode::Editor)
    }
}

/// Host cursor collaborator
pub trait CursorControl: Send + Sync {
    fn hide(&self);
    fn unhide(&self);
    fn is_hidden(&self) -> bool;

    /// Current cursor position in screen space, if known
    fn location(&self) -> Option<Point>;
}

/// Observer of control mode changes
pub trait ModeObserver: Send + Sync {
    /// Called before the cursor is hidden or shown by a mode change
    fn cursor_will_change(&self, hidden: bool);

    /// Called after the mode has changed
    fn mode_changed(&self, _from: ControlMode, _to: ControlMode) {}
}

/// Keymap editor collaborator
pub trait EditorSink: Send + Sync {
    /// A key the user pressed while the editor was capturing
    fn key_captured(&self, key: LogicalKey);
}

/// External events that move the control mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeTrigger {
    TextFieldFocused,
    TextFieldUnfocused,
    /// Capture toggle key pressed
    ToggleCapture,
    /// Keymapping on/off key pressed
    ToggleKeymapping,
    EditorToggled,
    ControllerConnected,
    ControllerDisconnected,
}

impl ModeTrigger {
    pub fn reason(self) -> &'static str {
        match self {
            ModeTrigger::TextFieldFocused => "text field focused",
            ModeTrigger::TextFieldUnfocused => "text field unfocused",
            ModeTrigger::ToggleCapture => "capture toggled",
            ModeTrigger::ToggleKeymapping => "keymapping toggled",
            ModeTrigger::EditorToggled => "editor toggled",
            ModeTrigger::ControllerConnected => "controller connected",
            ModeTrigger::ControllerDisconnected => "controller disconnected",
        }
    }
}

/// Outcome of applying a trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub to: ControlMode,
    /// Mode to return to when the text field loses focus
    pub resume: Option<ControlMode>,
}

/// Mode automaton
///
/// `resume` is the mode remembered when a text field took focus.
pub fn next_mode(
    mode: ControlMode,
    trigger: ModeTrigger,
    keymap_loaded: bool,
    resume: Option<ControlMode>,
) -> Transition {
    use self::ControlMode::*;

    let active = if keymap_loaded { ArbitraryClick } else { Off };
    let stay = Transition { to: mode, resume };

    match (trigger, mode) {
        (ModeTrigger::TextFieldFocused, CameraRotate | ArbitraryClick) => Transition {
            to: TextInput,
            resume: Some(mode),
        },
        (ModeTrigger::TextFieldUnfocused, TextInput) => Transition {
            to: resume.unwrap_or(active),
            resume: None,
        },
        (ModeTrigger::ToggleCapture, CameraRotate) => Transition {
            to: ArbitraryClick,
            resume,
        },
        (ModeTrigger::ToggleCapture, ArbitraryClick) => Transition {
            to: CameraRotate,
            resume,
        },
        (ModeTrigger::ToggleKeymapping, Off) => Transition { to: active, resume },
        (ModeTrigger::ToggleKeymapping, TextInput | CameraRotate | ArbitraryClick) => Transition {
            to: Off,
            resume: None,
        },
        (ModeTrigger::EditorToggled, Editor) => Transition {
            to: active,
            resume: None,
        },
        (ModeTrigger::EditorToggled, _) => Transition {
            to: Editor,
            resume: None,
        },
        (ModeTrigger::ControllerConnected, Off) => Transition { to: active, resume },
        _ => stay,
    }
}
