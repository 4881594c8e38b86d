//! Runner that executes health checks and aggregates their results

use std::time::Instant;

use tracing::{debug, warn};

use super::check::{CheckResult, CheckStatus, SystemCheck};

/// Results from running a health check suite
#[derive(Debug)]
pub struct HealthCheckReport {
    /// Individual check results with their system names
    pub results: Vec<(String, CheckResult)>,
    pub total: usize,
    pub passed: usize,
    pub warned: usize,
    pub failed: usize,
}

impl HealthCheckReport {
    /// Returns true if no check failed
    pub fn is_healthy(&self) -> bool {
        self.failed == 0
    }

    pub fn has_warnings(&self) -> bool {
        self.warned > 0
    }

    /// Result of the named check, if it ran
    pub fn result(&self, name: &str) -> Option<&CheckResult> {
        self.results
            .iter()
            .find(|(system, _)| system == name)
            .map(|(_, result)| result)
    }

    /// Process exit code for this report
    /// 0 = all pass, 1 = any fail, 2 = any warn (but no fail)
    pub fn exit_code(&self) -> i32 {
        if self.failed > 0 {
            1
        } else if self.warned > 0 {
            2
        } else {
            0
        }
    }
}

/// Orchestrates running health checks and collecting results
#[derive(Default)]
pub struct HealthCheckRunner {
    checks: Vec<Box<dyn SystemCheck>>,
}

impl HealthCheckRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_check<C: SystemCheck + 'static>(mut self, check: C) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    /// Runs all registered checks in order and returns a report
    pub fn run(self) -> HealthCheckReport {
        let mut report = HealthCheckReport {
            results: Vec::with_capacity(self.checks.len()),
            total: 0,
            passed: 0,
            warned: 0,
            failed: 0,
        };

        for check in self.checks {
            let name = check.name();
            let start = Instant::now();
            let result = check.check().with_duration(start.elapsed());

            match result.status {
                CheckStatus::Pass => {
                    report.passed += 1;
                    debug!(check = name, duration = ?result.duration, "health check passed");
                }
                CheckStatus::Warn => {
                    report.warned += 1;
                    warn!(check = name, message = %result.message, "health check warned");
                }
                CheckStatus::Fail => {
                    report.failed += 1;
                    warn!(check = name, message = %result.message, "health check failed");
                }
            }

            report.results.push((name.to_string(), result));
        }

        report.total = report.results.len();
        report
    }
}
