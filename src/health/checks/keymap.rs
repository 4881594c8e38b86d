//! Keymap health check

use std::path::{Path, PathBuf};

use crate::dispatch::{PriorityTier, TIER_CAPACITY};
use crate::health::check::{CheckResult, CheckStatus, Findings, SystemCheck};
use crate::keymap::{FileKeymapStore, JoystickShape, Keymap, KeymapError, KeymapStore};

enum Source {
    File(PathBuf),
    Inline(Box<Keymap>),
}

/// Validates a keymap before it is handed to a session
///
/// Fails on keymaps the engine would reject. Warns when a tier would run out
/// of slots, since the extra continuous bindings would be dropped.
pub struct KeymapCheck {
    source: Source,
}

impl KeymapCheck {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self {
            source: Source::File(path.as_ref().to_path_buf()),
        }
    }

    pub fn new(keymap: Keymap) -> Self {
        Self {
            source: Source::Inline(Box::new(keymap)),
        }
    }

    fn load(&self) -> Result<Keymap, KeymapError> {
        match &self.source {
            Source::File(path) => FileKeymapStore::new(path).load_bindings(),
            Source::Inline(keymap) => Ok((**keymap).clone()),
        }
    }

    fn validate(findings: &mut Findings, keymap: &Keymap) {
        match keymap.check_version() {
            Ok(version) => findings.record(CheckStatus::Pass, format!("Format version {}", version)),
            Err(e) => findings.record(CheckStatus::Fail, e.to_string()),
        }

        if keymap.is_empty() {
            findings.record(CheckStatus::Warn, "Keymap binds nothing");
        }

        findings.note(format!(
            "Bindings: {} buttons, {} draggable, {} joysticks, {} mouse areas",
            keymap.buttons.len(),
            keymap.draggable_buttons.len(),
            keymap.joysticks.len(),
            keymap.mouse_areas.len()
        ));

        let unkeyed = keymap
            .joysticks
            .iter()
            .filter(|joystick| joystick.shape().is_none())
            .count();
        if unkeyed > 0 {
            findings.record(
                CheckStatus::Warn,
                format!("{} joysticks have no keys and will be skipped", unkeyed),
            );
        }
        let analog = keymap
            .joysticks
            .iter()
            .filter(|joystick| matches!(joystick.shape(), Some(JoystickShape::Analog(_))))
            .count();
        if analog > 0 {
            findings.note(format!("{} continuous joysticks", analog));
        }

        let demand = keymap.continuous_demand();
        for tier in PriorityTier::ALL {
            if demand[tier] > TIER_CAPACITY {
                findings.record(
                    CheckStatus::Warn,
                    format!(
                        "{:?} tier needs {} slots, only {} exist",
                        tier, demand[tier], TIER_CAPACITY
                    ),
                );
            }
        }
    }
}

impl SystemCheck for KeymapCheck {
    fn name(&self) -> &'static str {
        "Keymap"
    }

    fn description(&self) -> Option<&'static str> {
        Some("Validates keymap version and tier capacity")
    }

    fn check(&self) -> CheckResult {
        let keymap = match self.load() {
            Ok(keymap) => keymap,
            Err(e) => {
                return CheckResult::fail("Keymap could not be loaded")
                    .with_details([format!("  ✗ {}", e)]);
            }
        };

        let mut findings = Findings::new();
        Self::validate(&mut findings, &keymap);
        findings.finish(
            "Keymap is loadable",
            "Keymap loads with warnings",
            "Keymap would be rejected",
        )
    }
}
