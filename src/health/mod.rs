//! Health checks for validating engine startup
//!
//! Useful for:
//! - Validating configuration profiles and keymaps before a session starts
//! - CI/CD health checks
//! - Debugging a host integration
//!
//! # Example
//!
//! ```no_run
//! use keytouch::health::{HealthCheckRunner, checks::*};
//!
//! let report = HealthCheckRunner::new()
//!     .add_check(ConfigCheck::new())
//!     .add_check(KeymapCheck::from_path("keymaps/shooter.toml"))
//!     .add_check(WorkQueueCheck::new())
//!     .run();
//!
//! if report.is_healthy() {
//!     println!("All systems operational!");
//! }
//! ```

pub mod check;
pub mod checks;
pub mod reporter;
pub mod runner;

use std::path::Path;

pub use check::{CheckResult, CheckStatus, Findings, SystemCheck};
pub use reporter::{format_details, format_report, print_report};
pub use runner::{HealthCheckReport, HealthCheckRunner};

fn default_runner() -> HealthCheckRunner {
    HealthCheckRunner::new()
        .add_check(checks::ConfigCheck::new())
        .add_check(checks::BuildInfoCheck::new())
        .add_check(checks::SystemInfoCheck::new())
        .add_check(checks::WorkQueueCheck::new())
}

/// Runs all default health checks and returns a report
pub fn run_all_checks() -> HealthCheckReport {
    default_runner().run()
}

/// Runs the default checks plus validation of the keymap at `path`
pub fn run_all_checks_with_keymap(path: impl AsRef<Path>) -> HealthCheckReport {
    default_runner()
        .add_check(checks::KeymapCheck::from_path(path))
        .run()
}
