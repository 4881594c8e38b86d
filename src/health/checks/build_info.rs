//! Build information health check

use crate::build_info;
use crate::health::check::{CheckResult, SystemCheck};

/// Reports build metadata; warns on builds from a dirty tree
#[derive(Default)]
pub struct BuildInfoCheck;

impl BuildInfoCheck {
    pub fn new() -> Self {
        Self
    }
}

impl SystemCheck for BuildInfoCheck {
    fn name(&self) -> &'static str {
        "Build Info"
    }

    fn description(&self) -> Option<&'static str> {
        Some("Reports build metadata (git, rustc, target)")
    }

    fn check(&self) -> CheckResult {
        let details = [
            format!("  Version: {}", build_info::version_string()),
            format!(
                "  Git: {}@{} (dirty: {})",
                build_info::git_branch(),
                build_info::git_sha_short(),
                build_info::is_git_dirty()
            ),
            format!("  Build time: {}", build_info::BUILD_TIMESTAMP),
            format!(
                "  Rustc: {} ({})",
                build_info::RUSTC_SEMVER,
                build_info::RUSTC_CHANNEL
            ),
            format!("  Opt level: {}", build_info::CARGO_OPT_LEVEL),
        ];

        if build_info::is_git_dirty() {
            CheckResult::warn("Built from a dirty working tree").with_details(details)
        } else {
            CheckResult::pass("Build metadata accessible").with_details(details)
        }
    }
}
