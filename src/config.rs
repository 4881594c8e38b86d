//! Engine configuration
//!
//! Supports multiple profiles (debug, release) with different settings.

use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::input::KeyCode;
use crate::touch::ScreenBounds;

/// Screen geometry the keymap is laid out against
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScreenConfig {
    /// Screen width in logical pixels
    pub width: f32,
    /// Screen height in logical pixels
    pub height: f32,
}

impl ScreenConfig {
    pub fn bounds(&self) -> ScreenBounds {
        ScreenBounds::new(self.width, self.height)
    }
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

/// Timing and threshold constants for the touch state machines
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TuningConfig {
    /// Swipe watchdog period in milliseconds
    pub swipe_watchdog_ms: u64,
    /// Consecutive idle watchdog ticks before a swipe is lifted
    pub swipe_stale_ticks: u32,
    /// Events over which an oversized swipe delta is projected
    pub swipe_min_events: u32,
    /// Pause after a swipe ends before another may begin, in milliseconds
    pub swipe_cooldown_ms: u64,
    /// Manhattan deadzone of the digital joystick
    pub joystick_deadzone: f32,
    /// Manhattan deadzone of the continuous joystick
    pub continuous_deadzone: f32,
    /// Delay before a free joystick moves off its center, in milliseconds
    pub free_joystick_delay_ms: u64,
    /// Joystick radius above which the joystick runs in free mode
    pub free_joystick_threshold: f32,
    /// Offset used by free-mode joysticks
    pub free_joystick_travel: f32,
    /// Camera look sensitivity
    pub camera_sensitivity: f32,
    /// Continuous joystick sensitivity
    pub joystick_sensitivity: f32,
    /// Draggable button sensitivity
    pub drag_sensitivity: f32,
    /// Scroll-drag gain
    pub scroll_drag_gain: f32,
    /// Analog stick poll period in milliseconds
    pub stick_poll_ms: u64,
    /// Analog stick magnitude below which polling stops
    pub stick_threshold: f32,
    /// Camera units per poll at full stick deflection
    pub stick_camera_speed: f32,
    /// Joystick units at full stick deflection
    pub stick_joystick_range: f32,
    /// Concurrent touch identifiers
    pub max_touches: u32,
}

impl TuningConfig {
    pub fn swipe_watchdog(&self) -> Duration {
        Duration::from_millis(self.swipe_watchdog_ms)
    }

    pub fn swipe_cooldown(&self) -> Duration {
        Duration::from_millis(self.swipe_cooldown_ms)
    }

    pub fn free_joystick_delay(&self) -> Duration {
        Duration::from_millis(self.free_joystick_delay_ms)
    }

    pub fn stick_poll(&self) -> Duration {
        Duration::from_millis(self.stick_poll_ms.max(1))
    }
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            swipe_watchdog_ms: 100,
            swipe_stale_ticks: 4,
            swipe_min_events: 16,
            swipe_cooldown_ms: 20,
            joystick_deadzone: 8.0,
            continuous_deadzone: 16.0,
            free_joystick_delay_ms: 40,
            free_joystick_threshold: 200.0,
            free_joystick_travel: 80.0,
            camera_sensitivity: 0.5,
            joystick_sensitivity: 1.0,
            drag_sensitivity: 1.0,
            scroll_drag_gain: 4.0,
            stick_poll_ms: 16,
            stick_threshold: 0.1,
            stick_camera_speed: 20.0,
            stick_joystick_range: 100.0,
            max_touches: 20,
        }
    }
}

/// Host-level control keys
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControlsConfig {
    /// Key that flips between camera rotation and arbitrary clicking
    pub capture_toggle: String,
    /// Key that turns keymapping on and off
    pub keymapping_toggle: String,
}

impl ControlsConfig {
    /// Parsed capture toggle key
    pub fn capture_toggle_key(&self) -> Option<KeyCode> {
        KeyCode::from_name(&self.capture_toggle)
    }

    /// Parsed keymapping toggle key
    pub fn keymapping_toggle_key(&self) -> Option<KeyCode> {
        KeyCode::from_name(&self.keymapping_toggle)
    }
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            capture_toggle: KeyCode::LeftAlt.name().to_string(),
            keymapping_toggle: KeyCode::F12.name().to_string(),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// The active profile (debug, release, etc.)
    pub profile: String,
    /// Screen geometry
    #[serde(default)]
    pub screen: ScreenConfig,
    /// State machine tuning
    #[serde(default)]
    pub tuning: TuningConfig,
    /// Control keys
    #[serde(default)]
    pub controls: ControlsConfig,
}

impl EngineConfig {
    /// Loads configuration based on the specified profile
    ///
    /// Profiles are loaded from config files in the following order:
    /// 1. config/{profile}.toml (profile-specific configuration)
    /// 2. Environment variables with prefix KEYTOUCH_ (e.g., KEYTOUCH_SCREEN__WIDTH=1920)
    ///
    /// Config files are searched for in:
    /// 1. Next to the executable (target/debug/config or target/release/config)
    /// 2. In the current directory (./config)
    pub fn load(profile: &str) -> Result<Self, ConfigError> {
        let config_dir = Self::find_config_dir();

        let mut builder = Config::builder();

        if let Some(ref dir) = config_dir {
            let profile_path = dir.join(profile);
            builder = builder.add_source(File::from(profile_path.as_path()).required(false));
        } else {
            builder =
                builder.add_source(File::with_name(&format!("config/{}", profile)).required(false));
        }

        // Use __ as separator for nested fields (e.g., KEYTOUCH_TUNING__STICK_POLL_MS)
        builder = builder.add_source(
            Environment::with_prefix("KEYTOUCH")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.set_override("profile", profile)?.build()?;

        config.try_deserialize()
    }

    /// Finds the config directory by searching in multiple locations
    fn find_config_dir() -> Option<std::path::PathBuf> {
        if let Ok(exe_path) = std::env::current_exe()
            && let Some(exe_dir) = exe_path.parent()
        {
            let config_dir = exe_dir.join("config");
            if config_dir.exists() {
                return Some(config_dir);
            }
        }

        let cwd_config = std::path::PathBuf::from("config");
        if cwd_config.exists() {
            return Some(cwd_config);
        }

        None
    }

    /// Loads configuration using the KEYTOUCH_PROFILE environment variable,
    /// defaulting to "release"
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let profile = std::env::var("KEYTOUCH_PROFILE").unwrap_or_else(|_| "release".to_string());
        Self::load(&profile)
    }

    /// Built-in configuration, without consulting files or the environment
    pub fn builtin(profile: &str) -> Self {
        Self {
            profile: profile.to_string(),
            screen: ScreenConfig::default(),
            tuning: TuningConfig::default(),
            controls: ControlsConfig::default(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::load("release").unwrap_or_else(|_| Self::builtin("release"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuning_defaults() {
        let tuning = TuningConfig::default();
        assert_eq!(tuning.swipe_watchdog(), Duration::from_millis(100));
        assert_eq!(tuning.swipe_stale_ticks, 4);
        assert_eq!(tuning.swipe_min_events, 16);
        assert_eq!(tuning.swipe_cooldown(), Duration::from_millis(20));
        assert_eq!(tuning.joystick_deadzone, 8.0);
        assert_eq!(tuning.continuous_deadzone, 16.0);
    }

    #[test]
    fn test_partial_tuning_keeps_defaults() {
        let tuning: TuningConfig = toml::from_str("swipe_min_events = 8").unwrap();
        assert_eq!(tuning.swipe_min_events, 8);
        assert_eq!(tuning.swipe_stale_ticks, 4);
    }

    #[test]
    fn test_controls_parse_key_names() {
        let controls = ControlsConfig::default();
        assert_eq!(controls.capture_toggle_key(), Some(KeyCode::LeftAlt));
        assert_eq!(controls.keymapping_toggle_key(), Some(KeyCode::F12));
    }

    #[test]
    fn test_profile_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.toml");
        std::fs::write(
            &path,
            "[screen]\nwidth = 1000.0\nheight = 500.0\n\n[tuning]\nstick_poll_ms = 8\n",
        )
        .unwrap();

        let config: EngineConfig = Config::builder()
            .add_source(File::from(path.as_path()))
            .set_override("profile", "bench")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.profile, "bench");
        assert_eq!(config.screen.width, 1000.0);
        assert_eq!(config.tuning.stick_poll_ms, 8);
        assert_eq!(config.tuning.swipe_min_events, 16);
    }
}
