//! Configuration health check

use crate::config::EngineConfig;
use crate::health::check::{CheckResult, CheckStatus, Findings, SystemCheck};
use crate::touch::MAX_TOUCHES;

/// Checks that every profile loads and carries usable settings
pub struct ConfigCheck {
    profiles: Vec<&'static str>,
}

impl ConfigCheck {
    /// Checks the debug and release profiles
    pub fn new() -> Self {
        Self {
            profiles: vec!["debug", "release"],
        }
    }

    pub fn with_profiles(profiles: Vec<&'static str>) -> Self {
        Self { profiles }
    }

    fn validate(findings: &mut Findings, config: &EngineConfig) {
        let profile = &config.profile;

        if config.screen.width <= 0.0 || config.screen.height <= 0.0 {
            findings.record(
                CheckStatus::Fail,
                format!(
                    "Profile '{}': empty screen {}x{}",
                    profile, config.screen.width, config.screen.height
                ),
            );
        }

        if config.tuning.max_touches == 0 || config.tuning.max_touches > MAX_TOUCHES {
            findings.record(
                CheckStatus::Fail,
                format!(
                    "Profile '{}': max_touches {} outside 1..={}",
                    profile, config.tuning.max_touches, MAX_TOUCHES
                ),
            );
        }

        if config.tuning.swipe_min_events == 0 || config.tuning.swipe_stale_ticks == 0 {
            findings.record(
                CheckStatus::Warn,
                format!("Profile '{}': swipe projection or watchdog disabled", profile),
            );
        }

        if config.controls.capture_toggle_key().is_none() {
            findings.record(
                CheckStatus::Warn,
                format!(
                    "Profile '{}': unknown capture toggle key {:?}",
                    profile, config.controls.capture_toggle
                ),
            );
        }
        if config.controls.keymapping_toggle_key().is_none() {
            findings.record(
                CheckStatus::Warn,
                format!(
                    "Profile '{}': unknown keymapping toggle key {:?}",
                    profile, config.controls.keymapping_toggle
                ),
            );
        }
    }
}

impl Default for ConfigCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemCheck for ConfigCheck {
    fn name(&self) -> &'static str {
        "Configuration"
    }

    fn description(&self) -> Option<&'static str> {
        Some("Validates configuration profiles, tuning and control keys")
    }

    fn check(&self) -> CheckResult {
        let mut findings = Findings::new();

        for profile in &self.profiles {
            match EngineConfig::load(profile) {
                Ok(config) => {
                    findings.record(
                        CheckStatus::Pass,
                        format!(
                            "Profile '{}': loaded (screen: {}x{}, watchdog: {}ms)",
                            profile,
                            config.screen.width,
                            config.screen.height,
                            config.tuning.swipe_watchdog_ms
                        ),
                    );
                    Self::validate(&mut findings, &config);
                }
                Err(e) => {
                    findings.record(
                        CheckStatus::Fail,
                        format!("Profile '{}': failed to load - {}", profile, e),
                    );
                }
            }
        }

        match EngineConfig::load_from_env() {
            Ok(config) => findings.record(
                CheckStatus::Pass,
                format!("Environment config: profile '{}' loaded", config.profile),
            ),
            Err(e) => findings.record(CheckStatus::Warn, format!("Environment config: {}", e)),
        }

        let validated = format!("{} profiles validated", self.profiles.len());
        findings.finish(
            &validated,
            "Config loaded with warnings",
            "Invalid or unreadable config profile",
        )
    }
}
