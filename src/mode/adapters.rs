//! Per-category input adapters
//!
//! Each control mode picks one adapter per input category. An adapter turns a
//! raw event into dispatcher calls (or nothing) and reports whether the event
//! was consumed, so the host can suppress its default handling.

use std::collections::HashMap;

use super::{ControlMode, EditorSink, ModeTrigger};
use crate::dispatch::{ActionDispatcher, PriorityTier};
use crate::input::{ControllerElement, Direction, Directions, KeyCode, LogicalKey, MouseKey, RawInput};
use crate::mode::CursorControl;

/// Deflection at which an analog axis counts as a pressed direction
const AXIS_PRESS: f32 = 0.5;

/// What happened to one raw event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Route {
    /// The event was claimed and must not reach the host
    pub consumed: bool,
    /// The event asks for a mode change
    pub trigger: Option<ModeTrigger>,
}

impl Route {
    pub fn consumed(consumed: bool) -> Self {
        Self {
            consumed,
            trigger: None,
        }
    }

    pub fn trigger(trigger: ModeTrigger) -> Self {
        Self {
            consumed: true,
            trigger: Some(trigger),
        }
    }
}

/// Collaborators an adapter may use
pub struct AdapterCtx<'a> {
    pub dispatcher: &'a ActionDispatcher,
    pub cursor: &'a dyn CursorControl,
    pub editor: Option<&'a dyn EditorSink>,
    pub capture_toggle: Option<KeyCode>,
    pub stick_range: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardAdapter {
    Transparent,
    Touchscreen,
    Editor,
}

impl KeyboardAdapter {
    pub fn route(&mut self, ctx: &AdapterCtx<'_>, code: KeyCode, pressed: bool, repeat: bool) -> Route {
        match self {
            KeyboardAdapter::Transparent => Route::default(),
            KeyboardAdapter::Touchscreen => {
                if ctx.capture_toggle == Some(code) {
                    return if pressed && !repeat {
                        Route::trigger(ModeTrigger::ToggleCapture)
                    } else {
                        Route::consumed(true)
                    };
                }
                let key = LogicalKey::Key(code);
                if repeat {
                    return Route::consumed(ctx.dispatcher.is_bound(key));
                }
                Route::consumed(ctx.dispatcher.dispatch_key(key, pressed))
            }
            KeyboardAdapter::Editor => {
                if pressed
                    && !repeat
                    && let Some(editor) = ctx.editor
                {
                    editor.key_captured(LogicalKey::Key(code));
                }
                Route::consumed(true)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseAdapter {
    Transparent,
    /// Left button and motion drive the fake mouse
    Touchscreen,
    /// Motion drives the camera with the cursor hidden
    CameraControl,
    Editor,
}

impl MouseAdapter {
    pub fn cursor_hidden(&self) -> bool {
        matches!(self, MouseAdapter::CameraControl)
    }

    pub fn route(&mut self, ctx: &AdapterCtx<'_>, input: &RawInput) -> Route {
        match self {
            MouseAdapter::Transparent => Route::default(),
            MouseAdapter::Touchscreen => Route::consumed(Self::touchscreen(ctx, input)),
            MouseAdapter::CameraControl => Route::consumed(Self::camera(ctx, input)),
            MouseAdapter::Editor => Route::consumed(Self::editor(ctx, input)),
        }
    }

    fn touchscreen(ctx: &AdapterCtx<'_>, input: &RawInput) -> bool {
        let dispatcher = ctx.dispatcher;
        match *input {
            RawInput::MouseButton {
                button: MouseKey::Left,
                pressed,
            } => dispatcher.dispatch_key(LogicalKey::FAKE_MOUSE, pressed),
            RawInput::MouseButton { button, pressed } => {
                dispatcher.dispatch_key(LogicalKey::Mouse(button), pressed)
            }
            RawInput::MouseMotion { dx, dy } => {
                if dispatcher.priority(LogicalKey::POINTER) == Some(PriorityTier::Draggable) {
                    return dispatcher.dispatch_vector(LogicalKey::POINTER, dx, dy);
                }
                match ctx.cursor.location() {
                    Some([x, y]) => dispatcher.dispatch_vector(LogicalKey::FAKE_MOUSE, x, y),
                    None => false,
                }
            }
            RawInput::Scroll { dx, dy } => dispatcher.dispatch_vector(LogicalKey::SCROLL_DRAG, dx, dy),
            _ => false,
        }
    }

    fn camera(ctx: &AdapterCtx<'_>, input: &RawInput) -> bool {
        let dispatcher = ctx.dispatcher;
        match *input {
            RawInput::MouseButton { button, pressed } => {
                dispatcher.dispatch_key(LogicalKey::Mouse(button), pressed)
            }
            RawInput::MouseMotion { dx, dy } => dispatcher.dispatch_vector(LogicalKey::POINTER, dx, dy),
            RawInput::Scroll { dx, dy } => dispatcher.dispatch_vector(LogicalKey::SCROLL_SCALE, dx, dy),
            _ => false,
        }
    }

    fn editor(ctx: &AdapterCtx<'_>, input: &RawInput) -> bool {
        match *input {
            // The editor itself is operated with the left button and pointer
            RawInput::MouseButton {
                button: MouseKey::Left,
                ..
            } => false,
            RawInput::MouseButton { button, pressed } => {
                if pressed && let Some(editor) = ctx.editor {
                    editor.key_captured(LogicalKey::Mouse(button));
                }
                true
            }
            _ => false,
        }
    }
}

/// Last reading of a two-axis controller element
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StickMemory {
    last: [f32; 2],
    directions: Directions,
}

impl StickMemory {
    fn rest(&mut self) {
        self.last = [0.0, 0.0];
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControllerAdapter {
    Transparent,
    Touchscreen(HashMap<ControllerElement, StickMemory>),
    Editor(HashMap<ControllerElement, StickMemory>),
}

impl ControllerAdapter {
    pub fn route(&mut self, ctx: &AdapterCtx<'_>, input: &RawInput) -> Route {
        match self {
            ControllerAdapter::Transparent => Route::default(),
            ControllerAdapter::Touchscreen(sticks) => Route::consumed(Self::touchscreen(ctx, sticks, input)),
            ControllerAdapter::Editor(sticks) => {
                Self::editor(ctx, sticks, input);
                Route::consumed(true)
            }
        }
    }

    fn touchscreen(
        ctx: &AdapterCtx<'_>,
        sticks: &mut HashMap<ControllerElement, StickMemory>,
        input: &RawInput,
    ) -> bool {
        let dispatcher = ctx.dispatcher;
        match *input {
            RawInput::ControllerButton { element, pressed } => {
                dispatcher.dispatch_key(LogicalKey::Controller(element), pressed)
            }
            RawInput::ControllerAxis { element, x, y } => {
                let key = LogicalKey::Controller(element);
                let memory = sticks.entry(element).or_default();
                let [last_x, last_y] = memory.last;
                memory.last = [x, y];

                match dispatcher.priority(key) {
                    Some(PriorityTier::Camera) => dispatcher.dispatch_stick(key, x, y),
                    Some(_) => {
                        // Screen y grows downwards, stick y upwards
                        let range = ctx.stick_range;
                        dispatcher.dispatch_vector(key, (x - last_x) * range, (last_y - y) * range)
                    }
                    None => Self::directions(ctx, element, memory, x, y),
                }
            }
            _ => false,
        }
    }

    /// Presses and releases the element's four direction keys on threshold edges
    fn directions(
        ctx: &AdapterCtx<'_>,
        element: ControllerElement,
        memory: &mut StickMemory,
        x: f32,
        y: f32,
    ) -> bool {
        let Some(keys) = element.direction_keys() else {
            return false;
        };
        let current = Directions::from_axes(x, y, AXIS_PRESS);
        let changed = current ^ memory.directions;
        memory.directions = current;

        let mut consumed = false;
        for direction in Direction::ALL {
            if changed.contains(direction.flag()) {
                let key = LogicalKey::Controller(keys[direction.index()]);
                consumed |= ctx
                    .dispatcher
                    .dispatch_key(key, current.contains(direction.flag()));
            }
        }
        consumed
    }

    fn editor(ctx: &AdapterCtx<'_>, sticks: &mut HashMap<ControllerElement, StickMemory>, input: &RawInput) {
        let Some(editor) = ctx.editor else {
            return;
        };
        match *input {
            RawInput::ControllerButton {
                element,
                pressed: true,
            } => editor.key_captured(LogicalKey::Controller(element)),
            RawInput::ControllerAxis { element, x, y } => {
                let memory = sticks.entry(element).or_default();
                let engaged = !Directions::from_axes(x, y, AXIS_PRESS).is_empty();
                if engaged && memory.directions.is_empty() {
                    editor.key_captured(LogicalKey::Controller(element));
                }
                memory.directions = Directions::from_axes(x, y, AXIS_PRESS);
            }
            _ => {}
        }
    }

    /// Moves a joystick-bound stick from its last reading back to rest
    fn recentre(ctx: &AdapterCtx<'_>, key: LogicalKey, memory: StickMemory) {
        let [last_x, last_y] = memory.last;
        if last_x == 0.0 && last_y == 0.0 {
            return;
        }
        let range = ctx.stick_range;
        ctx.dispatcher.dispatch_vector(key, -last_x * range, last_y * range);
    }

    /// Takes over the stick readings of the previous mode's adapter
    ///
    /// Touchscreen modes share readings, so a held stick is not integrated
    /// twice. When the mode change invalidated the joysticks they restart
    /// from center, and the readings restart from rest with them. Leaving
    /// touchscreen input releases every stick first.
    pub fn take_over(
        &mut self,
        previous: &mut ControllerAdapter,
        ctx: &AdapterCtx<'_>,
        invalidated: bool,
    ) {
        if let (ControllerAdapter::Touchscreen(sticks), ControllerAdapter::Touchscreen(old)) =
            (&mut *self, &mut *previous)
        {
            *sticks = std::mem::take(old);
            if invalidated {
                sticks.values_mut().for_each(StickMemory::rest);
            }
            return;
        }
        previous.release_all(ctx);
    }

    /// Forgets stick positions after the joysticks were rebuilt or invalidated
    pub fn rest_sticks(&mut self) {
        if let ControllerAdapter::Touchscreen(sticks) = self {
            sticks.values_mut().for_each(StickMemory::rest);
        }
    }

    /// Lets go of everything a disconnected controller was holding
    pub fn release_all(&mut self, ctx: &AdapterCtx<'_>) {
        let ControllerAdapter::Touchscreen(sticks) = self else {
            return;
        };
        for (element, memory) in sticks.drain() {
            let key = LogicalKey::Controller(element);
            match ctx.dispatcher.priority(key) {
                Some(PriorityTier::Camera) => {
                    ctx.dispatcher.dispatch_stick(key, 0.0, 0.0);
                }
                Some(_) => {
                    Self::recentre(ctx, key, memory);
                }
                None => {
                    let mut released = memory;
                    Self::directions(ctx, element, &mut released, 0.0, 0.0);
                }
            }
        }
    }
}

/// The adapter triple of one control mode
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterSet {
    pub keyboard: KeyboardAdapter,
    pub mouse: MouseAdapter,
    pub controller: ControllerAdapter,
}

impl AdapterSet {
    pub fn for_mode(mode: ControlMode) -> Self {
        let touch_controller = || ControllerAdapter::Touchscreen(HashMap::new());
        let (keyboard, mouse, controller) = match mode {
            ControlMode::Off => (
                KeyboardAdapter::Transparent,
                MouseAdapter::Transparent,
                ControllerAdapter::Transparent,
            ),
            ControlMode::TextInput => (
                KeyboardAdapter::Transparent,
                MouseAdapter::Touchscreen,
                touch_controller(),
            ),
            ControlMode::CameraRotate => (
                KeyboardAdapter::Touchscreen,
                MouseAdapter::CameraControl,
                touch_controller(),
            ),
            ControlMode::ArbitraryClick => (
                KeyboardAdapter::Touchscreen,
                MouseAdapter::Touchscreen,
                touch_controller(),
            ),
            ControlMode::Editor => (
                KeyboardAdapter::Editor,
                MouseAdapter::Editor,
                ControllerAdapter::Editor(HashMap::new()),
            ),
        };
        Self {
            keyboard,
            mouse,
            controller,
        }
    }

    /// Whether this mode wants the host cursor hidden
    pub fn cursor_hidden(&self) -> bool {
        self.mouse.cursor_hidden()
    }

    pub fn route(&mut self, ctx: &AdapterCtx<'_>, input: &RawInput) -> Route {
        match *input {
            RawInput::Key {
                code,
                pressed,
                repeat,
            } => self.keyboard.route(ctx, code, pressed, repeat),
            RawInput::MouseMotion { .. } | RawInput::MouseButton { .. } | RawInput::Scroll { .. } => {
                self.mouse.route(ctx, input)
            }
            RawInput::ControllerButton { .. } | RawInput::ControllerAxis { .. } => {
                self.controller.route(ctx, input)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_table() {
        let cases = [
            (ControlMode::Off, KeyboardAdapter::Transparent, MouseAdapter::Transparent),
            (ControlMode::TextInput, KeyboardAdapter::Transparent, MouseAdapter::Touchscreen),
            (ControlMode::CameraRotate, KeyboardAdapter::Touchscreen, MouseAdapter::CameraControl),
            (ControlMode::ArbitraryClick, KeyboardAdapter::Touchscreen, MouseAdapter::Touchscreen),
            (ControlMode::Editor, KeyboardAdapter::Editor, MouseAdapter::Editor),
        ];
        for (mode, keyboard, mouse) in cases {
            let set = AdapterSet::for_mode(mode);
            assert_eq!(set.keyboard, keyboard, "{mode:?}");
            assert_eq!(set.mouse, mouse, "{mode:?}");
        }
        assert!(matches!(
            AdapterSet::for_mode(ControlMode::Off).controller,
            ControllerAdapter::Transparent
        ));
        assert!(matches!(
            AdapterSet::for_mode(ControlMode::TextInput).controller,
            ControllerAdapter::Touchscreen(_)
        ));
    }

    #[test]
    fn test_only_camera_control_hides_cursor() {
        for mode in [
            ControlMode::Off,
            ControlMode::TextInput,
            ControlMode::ArbitraryClick,
            ControlMode::Editor,
        ] {
            assert!(!AdapterSet::for_mode(mode).cursor_hidden(), "{mode:?}");
        }
        assert!(AdapterSet::for_mode(ControlMode::CameraRotate).cursor_hidden());
    }
}
