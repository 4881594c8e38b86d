//! Raw input collection from winit events

use winit::event::{DeviceEvent, ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::PhysicalKey;

use super::events::RawInput;
use super::key::{KeyCode, MouseKey};

/// Pixels per scroll line for line-based wheels
const LINE_SCROLL_PIXELS: f32 = 20.0;

/// Translates winit window and device events into [`RawInput`] records
///
/// Window events provide keys (with repeat flags), buttons, scrolling and the
/// absolute cursor location. Device events provide unaccelerated relative
/// motion, which is what camera control needs while the cursor is captured.
pub struct InputCollector {
    scale_factor: f32,
    /// DPI-scaled logical cursor location
    cursor_pos: Option<[f32; 2]>,
}

impl InputCollector {
    /// Creates a new input collector
    pub fn new() -> Self {
        Self {
            scale_factor: 1.0,
            cursor_pos: None,
        }
    }

    /// Update scale factor (DPI scaling)
    pub fn set_scale_factor(&mut self, scale_factor: f32) {
        if scale_factor > 0.0 {
            self.scale_factor = scale_factor;
        }
    }

    /// Last known cursor location in logical pixels
    pub fn cursor_pos(&self) -> Option<[f32; 2]> {
        self.cursor_pos
    }

    /// Handle a winit window event
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> Option<RawInput> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_pos = Some([
                    position.x as f32 / self.scale_factor,
                    position.y as f32 / self.scale_factor,
                ]);
                None
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor_pos = None;
                None
            }
            WindowEvent::MouseInput { state, button, .. } => {
                Self::mouse_button(*button, *state)
            }
            WindowEvent::MouseWheel { delta, .. } => Some(self.scroll(*delta)),
            WindowEvent::KeyboardInput { event, .. } => {
                Self::key(event.physical_key, event.state, event.repeat)
            }
            _ => None,
        }
    }

    /// Handle a winit device event
    pub fn handle_device_event(&mut self, event: &DeviceEvent) -> Option<RawInput> {
        match event {
            DeviceEvent::MouseMotion { delta } => Some(RawInput::MouseMotion {
                dx: delta.0 as f32,
                dy: delta.1 as f32,
            }),
            _ => None,
        }
    }

    fn key(key: PhysicalKey, state: ElementState, repeat: bool) -> Option<RawInput> {
        let PhysicalKey::Code(code) = key else {
            return None;
        };
        Some(RawInput::Key {
            code: KeyCode::from_winit(code)?,
            pressed: state.is_pressed(),
            repeat,
        })
    }

    fn mouse_button(button: winit::event::MouseButton, state: ElementState) -> Option<RawInput> {
        use winit::event::MouseButton as WB;
        let button = match button {
            WB::Left => MouseKey::Left,
            WB::Right => MouseKey::Right,
            WB::Middle => MouseKey::Middle,
            WB::Back => MouseKey::Back,
            WB::Forward => MouseKey::Forward,
            WB::Other(_) => return None,
        };
        Some(RawInput::MouseButton {
            button,
            pressed: state.is_pressed(),
        })
    }

    fn scroll(&self, delta: MouseScrollDelta) -> RawInput {
        // Convert MouseScrollDelta to consistent pixel units
        let [dx, dy] = match delta {
            MouseScrollDelta::LineDelta(x, y) => [x * LINE_SCROLL_PIXELS, y * LINE_SCROLL_PIXELS],
            MouseScrollDelta::PixelDelta(pos) => [
                pos.x as f32 / self.scale_factor,
                pos.y as f32 / self.scale_factor,
            ],
        };
        RawInput::Scroll { dx, dy }
    }
}

impl Default for InputCollector {
    fn default() -> Self {
        Self::new()
    }
}
