//! Keymap binding records
//!
//! The keymap is owned by an external store; the engine only consumes the
//! record shape below. Geometry is normalized to the screen (`x`, `y` in
//! `0..1`, `size` as a fraction of the screen width).

mod store;

use std::collections::HashSet;

use enum_map::EnumMap;
use semver::Version;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dispatch::PriorityTier;
use crate::input::LogicalKey;
use crate::touch::{Point, ScreenBounds};

pub use store::{FileKeymapStore, KeymapStore};

/// Newest keymap format major version this engine understands
pub const SUPPORTED_MAJOR: u64 = 2;

/// Errors raised while loading or validating a keymap
#[derive(Debug, Error)]
pub enum KeymapError {
    #[error("failed to access keymap {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid keymap: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize keymap: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid keymap version {version:?}: {source}")]
    Version {
        version: String,
        #[source]
        source: semver::Error,
    },

    #[error("keymap format {found} is newer than supported major version {supported}")]
    Unsupported { found: Version, supported: u64 },
}

/// Normalized placement of a binding
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Transform {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub size: f32,
}

impl Transform {
    /// Screen-space anchor point
    pub fn point(&self, screen: &ScreenBounds) -> Point {
        screen.denormalize(self.x, self.y)
    }

    /// Screen-space size
    pub fn absolute_size(&self, screen: &ScreenBounds) -> f32 {
        self.size * screen.width
    }
}

/// A plain or draggable button
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ButtonBinding {
    pub key: LogicalKey,
    pub transform: Transform,
}

/// The four keys of a digital joystick
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DirectionKeys {
    pub up: LogicalKey,
    pub down: LogicalKey,
    pub left: LogicalKey,
    pub right: LogicalKey,
}

impl DirectionKeys {
    /// Keys indexed by [`crate::input::Direction::index`]
    pub fn as_array(&self) -> [LogicalKey; 4] {
        [self.up, self.down, self.left, self.right]
    }
}

/// A joystick; digital when `keys` is present, analog when only `key` is
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JoystickBinding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<LogicalKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<DirectionKeys>,
    pub transform: Transform,
}

/// Resolved joystick shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JoystickShape {
    Digital(DirectionKeys),
    Analog(LogicalKey),
}

impl JoystickBinding {
    /// Digital or analog, or `None` for a binding with no keys at all
    pub fn shape(&self) -> Option<JoystickShape> {
        match (self.keys, self.key) {
            (Some(keys), _) => Some(JoystickShape::Digital(keys)),
            (None, Some(key)) => Some(JoystickShape::Analog(key)),
            (None, None) => None,
        }
    }
}

/// A camera-look area
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MouseAreaBinding {
    pub key: LogicalKey,
    pub transform: Transform,
}

/// Complete bindings record of one app
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Keymap {
    /// Format version (semver)
    pub version: String,
    #[serde(default)]
    pub buttons: Vec<ButtonBinding>,
    #[serde(default)]
    pub draggable_buttons: Vec<ButtonBinding>,
    #[serde(default)]
    pub joysticks: Vec<JoystickBinding>,
    #[serde(default)]
    pub mouse_areas: Vec<MouseAreaBinding>,
}

impl Keymap {
    /// An empty keymap at the current format version
    pub fn new() -> Self {
        Self {
            version: format!("{SUPPORTED_MAJOR}.0.0"),
            buttons: Vec::new(),
            draggable_buttons: Vec::new(),
            joysticks: Vec::new(),
            mouse_areas: Vec::new(),
        }
    }

    /// Parses a keymap from TOML
    pub fn from_toml_str(source: &str) -> Result<Self, KeymapError> {
        Ok(toml::from_str(source)?)
    }

    /// Serializes the keymap to TOML
    pub fn to_toml_string(&self) -> Result<String, KeymapError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Parsed format version
    pub fn format_version(&self) -> Result<Version, KeymapError> {
        Version::parse(&self.version).map_err(|source| KeymapError::Version {
            version: self.version.clone(),
            source,
        })
    }

    /// Rejects keymaps written by a newer major format
    pub fn check_version(&self) -> Result<Version, KeymapError> {
        let found = self.format_version()?;
        if found.major > SUPPORTED_MAJOR {
            return Err(KeymapError::Unsupported {
                found,
                supported: SUPPORTED_MAJOR,
            });
        }
        Ok(found)
    }

    /// Returns true when the keymap binds nothing
    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
            && self.draggable_buttons.is_empty()
            && self.joysticks.is_empty()
            && self.mouse_areas.is_empty()
    }

    /// Distinct continuous keys a build will register per tier
    ///
    /// Draggable handlers are transient and at most two are live at a time
    /// (pointer drag and the fake mouse), so they are counted as such.
    pub fn continuous_demand(&self) -> EnumMap<PriorityTier, usize> {
        let mut camera: HashSet<LogicalKey> = self.mouse_areas.iter().map(|area| area.key).collect();
        camera.insert(LogicalKey::SCROLL_DRAG);
        if !self.mouse_areas.is_empty() {
            camera.insert(LogicalKey::SCROLL_SCALE);
        }

        let default: HashSet<LogicalKey> = self
            .joysticks
            .iter()
            .filter_map(|joystick| match joystick.shape() {
                Some(JoystickShape::Analog(key)) => Some(key),
                _ => None,
            })
            .collect();

        let draggable = if self.draggable_buttons.is_empty() { 1 } else { 2 };

        let mut demand = EnumMap::default();
        demand[PriorityTier::Draggable] = draggable;
        demand[PriorityTier::Default] = default.len();
        demand[PriorityTier::Camera] = camera.len();
        demand
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new()
    }
}
