//! Logical key identifiers
//!
//! Every physical or synthetic signal that a keymap can bind to is a
//! [`LogicalKey`]. Keys have a stable display name (used by keymap files) and a
//! compact `u32` encoding used by the lock-free routing tables.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use thiserror::Error;

/// Declares a fieldless key enum together with its stable name table
macro_rules! named_keys {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u16)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every variant, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Stable name used in keymaps and logs
            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Parses a stable name back into a variant
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($label => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

named_keys! {
    /// Keyboard key code
    pub enum KeyCode {
        // Common keys
        Space => "Space",
        Enter => "Enter",
        Escape => "Escape",
        Backspace => "Backspace",
        Tab => "Tab",
        CapsLock => "CapsLock",
        Delete => "Delete",
        Insert => "Insert",
        Home => "Home",
        End => "End",
        PageUp => "PageUp",
        PageDown => "PageDown",

        // Letters
        A => "A",
        B => "B",
        C => "C",
        D => "D",
        E => "E",
        F => "F",
        G => "G",
        H => "H",
        I => "I",
        J => "J",
        K => "K",
        L => "L",
        M => "M",
        N => "N",
        O => "O",
        P => "P",
        Q => "Q",
        R => "R",
        S => "S",
        T => "T",
        U => "U",
        V => "V",
        W => "W",
        X => "X",
        Y => "Y",
        Z => "Z",

        // Numbers
        Num0 => "0",
        Num1 => "1",
        Num2 => "2",
        Num3 => "3",
        Num4 => "4",
        Num5 => "5",
        Num6 => "6",
        Num7 => "7",
        Num8 => "8",
        Num9 => "9",

        // Function keys
        F1 => "F1",
        F2 => "F2",
        F3 => "F3",
        F4 => "F4",
        F5 => "F5",
        F6 => "F6",
        F7 => "F7",
        F8 => "F8",
        F9 => "F9",
        F10 => "F10",
        F11 => "F11",
        F12 => "F12",

        // Arrows
        Left => "Left",
        Right => "Right",
        Up => "Up",
        Down => "Down",

        // Modifiers
        LeftShift => "LeftShift",
        RightShift => "RightShift",
        LeftControl => "LeftControl",
        RightControl => "RightControl",
        LeftAlt => "LeftAlt",
        RightAlt => "RightAlt",
        LeftMeta => "LeftMeta",
        RightMeta => "RightMeta",

        // Punctuation
        Minus => "-",
        Equal => "=",
        BracketLeft => "[",
        BracketRight => "]",
        Backslash => "\\",
        Semicolon => ";",
        Quote => "'",
        Backquote => "`",
        Comma => ",",
        Period => ".",
        Slash => "/",
    }
}

named_keys! {
    /// Mouse buttons plus the synthetic mouse channels
    pub enum MouseKey {
        Left => "LMB",
        Right => "RMB",
        Middle => "MMB",
        Back => "MB4",
        Forward => "MB5",
        /// Relative pointer motion
        Pointer => "Mouse",
        /// Touchscreen-emulation pointer (absolute cursor location)
        FakeMouse => "FakeMouse",
        /// Scroll wheel driving a drag gesture under the cursor
        ScrollDrag => "ScrollDrag",
        /// Scroll wheel driving a pinch gesture
        ScrollScale => "ScrollScale",
    }
}

named_keys! {
    /// Game controller elements, named the way controller frameworks alias them
    pub enum ControllerElement {
        ButtonA => "Button A",
        ButtonB => "Button B",
        ButtonX => "Button X",
        ButtonY => "Button Y",
        LeftShoulder => "Left Shoulder",
        RightShoulder => "Right Shoulder",
        LeftTrigger => "Left Trigger",
        RightTrigger => "Right Trigger",
        LeftThumbstickButton => "Left Thumbstick Button",
        RightThumbstickButton => "Right Thumbstick Button",
        ButtonMenu => "Button Menu",
        ButtonOptions => "Button Options",
        ButtonHome => "Button Home",

        LeftThumbstick => "Left Thumbstick",
        RightThumbstick => "Right Thumbstick",
        DirectionPad => "Direction Pad",

        LeftThumbstickUp => "Left Thumbstick Up",
        LeftThumbstickDown => "Left Thumbstick Down",
        LeftThumbstickLeft => "Left Thumbstick Left",
        LeftThumbstickRight => "Left Thumbstick Right",
        RightThumbstickUp => "Right Thumbstick Up",
        RightThumbstickDown => "Right Thumbstick Down",
        RightThumbstickLeft => "Right Thumbstick Left",
        RightThumbstickRight => "Right Thumbstick Right",
        DirectionPadUp => "Direction Pad Up",
        DirectionPadDown => "Direction Pad Down",
        DirectionPadLeft => "Direction Pad Left",
        DirectionPadRight => "Direction Pad Right",
    }
}

impl ControllerElement {
    /// Returns true for two-axis elements (thumbsticks and the direction pad)
    pub fn is_axis(self) -> bool {
        self.direction_keys().is_some()
    }

    /// The four digital direction elements of an axis element, indexed by [`Direction`]
    pub fn direction_keys(self) -> Option<[ControllerElement; 4]> {
        use ControllerElement::*;
        match self {
            LeftThumbstick => Some([
                LeftThumbstickUp,
                LeftThumbstickDown,
                LeftThumbstickLeft,
                LeftThumbstickRight,
            ]),
            RightThumbstick => Some([
                RightThumbstickUp,
                RightThumbstickDown,
                RightThumbstickLeft,
                RightThumbstickRight,
            ]),
            DirectionPad => Some([
                DirectionPadUp,
                DirectionPadDown,
                DirectionPadLeft,
                DirectionPadRight,
            ]),
            _ => None,
        }
    }
}

/// One of the four joystick directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Index into four-element direction arrays
    pub fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Flag for this direction in a [`Directions`] set
    pub fn flag(self) -> Directions {
        match self {
            Direction::Up => Directions::UP,
            Direction::Down => Directions::DOWN,
            Direction::Left => Directions::LEFT,
            Direction::Right => Directions::RIGHT,
        }
    }
}

bitflags! {
    /// Set of held directions
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Directions: u8 {
        const UP = 0b0001;
        const DOWN = 0b0010;
        const LEFT = 0b0100;
        const RIGHT = 0b1000;
    }
}

impl Directions {
    /// Digital reading of an analog two-axis value (y axis points up)
    pub fn from_axes(x: f32, y: f32, threshold: f32) -> Self {
        let mut dirs = Directions::empty();
        dirs.set(Directions::UP, y >= threshold);
        dirs.set(Directions::DOWN, y <= -threshold);
        dirs.set(Directions::LEFT, x <= -threshold);
        dirs.set(Directions::RIGHT, x >= threshold);
        dirs
    }

    /// Unit offset on screen axes, with opposite directions cancelling out
    pub fn axis_offset(self) -> [f32; 2] {
        let axis = |neg: Directions, pos: Directions| -> f32 {
            (self.contains(pos) as i8 - self.contains(neg) as i8) as f32
        };
        [
            axis(Directions::LEFT, Directions::RIGHT),
            axis(Directions::UP, Directions::DOWN),
        ]
    }
}

/// A stable identifier for a bindable input signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LogicalKey {
    Key(KeyCode),
    Mouse(MouseKey),
    Controller(ControllerElement),
}

const TAG_KEY: u32 = 1;
const TAG_MOUSE: u32 = 2;
const TAG_CONTROLLER: u32 = 3;

impl LogicalKey {
    /// Relative pointer motion key
    pub const POINTER: LogicalKey = LogicalKey::Mouse(MouseKey::Pointer);
    /// Touchscreen-emulation pointer key
    pub const FAKE_MOUSE: LogicalKey = LogicalKey::Mouse(MouseKey::FakeMouse);
    /// Scroll-drag key
    pub const SCROLL_DRAG: LogicalKey = LogicalKey::Mouse(MouseKey::ScrollDrag);
    /// Scroll-pinch key
    pub const SCROLL_SCALE: LogicalKey = LogicalKey::Mouse(MouseKey::ScrollScale);

    /// Compact encoding for atomic slot storage, never zero
    pub fn to_bits(self) -> u32 {
        let (tag, code) = match self {
            LogicalKey::Key(key) => (TAG_KEY, key as u16),
            LogicalKey::Mouse(key) => (TAG_MOUSE, key as u16),
            LogicalKey::Controller(element) => (TAG_CONTROLLER, element as u16),
        };
        (tag << 16) | code as u32
    }

    /// Stable name of the key
    pub fn name(self) -> &'static str {
        match self {
            LogicalKey::Key(key) => key.name(),
            LogicalKey::Mouse(key) => key.name(),
            LogicalKey::Controller(element) => element.name(),
        }
    }
}

impl fmt::Display for LogicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a key name is not recognized
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown key name {0:?}")]
pub struct UnknownKey(pub String);

impl FromStr for LogicalKey {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MouseKey::from_name(s)
            .map(LogicalKey::Mouse)
            .or_else(|| ControllerElement::from_name(s).map(LogicalKey::Controller))
            .or_else(|| KeyCode::from_name(s).map(LogicalKey::Key))
            .ok_or_else(|| UnknownKey(s.to_string()))
    }
}

impl TryFrom<String> for LogicalKey {
    type Error = UnknownKey;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LogicalKey> for String {
    fn from(key: LogicalKey) -> Self {
        key.name().to_string()
    }
}

impl serde::Serialize for LogicalKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> serde::Deserialize<'de> for LogicalKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

impl From<KeyCode> for LogicalKey {
    fn from(key: KeyCode) -> Self {
        LogicalKey::Key(key)
    }
}

impl From<MouseKey> for LogicalKey {
    fn from(key: MouseKey) -> Self {
        LogicalKey::Mouse(key)
    }
}

impl From<ControllerElement> for LogicalKey {
    fn from(element: ControllerElement) -> Self {
        LogicalKey::Controller(element)
    }
}

/// Convert from winit key code
impl KeyCode {
    pub fn from_winit(key: winit::keyboard::KeyCode) -> Option<Self> {
        use winit::keyboard::KeyCode as WK;
        let key = match key {
            WK::Space => Self::Space,
            WK::Enter => Self::Enter,
            WK::Escape => Self::Escape,
            WK::Backspace => Self::Backspace,
            WK::Tab => Self::Tab,
            WK::CapsLock => Self::CapsLock,
            WK::Delete => Self::Delete,
            WK::Insert => Self::Insert,
            WK::Home => Self::Home,
            WK::End => Self::End,
            WK::PageUp => Self::PageUp,
            WK::PageDown => Self::PageDown,

            WK::KeyA => Self::A,
            WK::KeyB => Self::B,
            WK::KeyC => Self::C,
            WK::KeyD => Self::D,
            WK::KeyE => Self::E,
            WK::KeyF => Self::F,
            WK::KeyG => Self::G,
            WK::KeyH => Self::H,
            WK::KeyI => Self::I,
            WK::KeyJ => Self::J,
            WK::KeyK => Self::K,
            WK::KeyL => Self::L,
            WK::KeyM => Self::M,
            WK::KeyN => Self::N,
            WK::KeyO => Self::O,
            WK::KeyP => Self::P,
            WK::KeyQ => Self::Q,
            WK::KeyR => Self::R,
            WK::KeyS => Self::S,
            WK::KeyT => Self::T,
            WK::KeyU => Self::U,
            WK::KeyV => Self::V,
            WK::KeyW => Self::W,
            WK::KeyX => Self::X,
            WK::KeyY => Self::Y,
            WK::KeyZ => Self::Z,

            WK::Digit0 => Self::Num0,
            WK::Digit1 => Self::Num1,
            WK::Digit2 => Self::Num2,
            WK::Digit3 => Self::Num3,
            WK::Digit4 => Self::Num4,
            WK::Digit5 => Self::Num5,
            WK::Digit6 => Self::Num6,
            WK::Digit7 => Self::Num7,
            WK::Digit8 => Self::Num8,
            WK::Digit9 => Self::Num9,

            WK::F1 => Self::F1,
            WK::F2 => Self::F2,
            WK::F3 => Self::F3,
            WK::F4 => Self::F4,
            WK::F5 => Self::F5,
            WK::F6 => Self::F6,
            WK::F7 => Self::F7,
            WK::F8 => Self::F8,
            WK::F9 => Self::F9,
            WK::F10 => Self::F10,
            WK::F11 => Self::F11,
            WK::F12 => Self::F12,

            WK::ArrowLeft => Self::Left,
            WK::ArrowRight => Self::Right,
            WK::ArrowUp => Self::Up,
            WK::ArrowDown => Self::Down,

            WK::ShiftLeft => Self::LeftShift,
            WK::ShiftRight => Self::RightShift,
            WK::ControlLeft => Self::LeftControl,
            WK::ControlRight => Self::RightControl,
            WK::AltLeft => Self::LeftAlt,
            WK::AltRight => Self::RightAlt,
            WK::SuperLeft => Self::LeftMeta,
            WK::SuperRight => Self::RightMeta,

            WK::Minus => Self::Minus,
            WK::Equal => Self::Equal,
            WK::BracketLeft => Self::BracketLeft,
            WK::BracketRight => Self::BracketRight,
            WK::Backslash => Self::Backslash,
            WK::Semicolon => Self::Semicolon,
            WK::Quote => Self::Quote,
            WK::Backquote => Self::Backquote,
            WK::Comma => Self::Comma,
            WK::Period => Self::Period,
            WK::Slash => Self::Slash,

            _ => return None,
        };
        Some(key)
    }
}
