//! Host system health check

use sysinfo::System;

use crate::health::check::{CheckResult, CheckStatus, Findings, SystemCheck};

/// Reports the host and warns when it cannot run the input host and the work
/// queue side by side
#[derive(Default)]
pub struct SystemInfoCheck;

impl SystemInfoCheck {
    pub fn new() -> Self {
        Self
    }
}

impl SystemCheck for SystemInfoCheck {
    fn name(&self) -> &'static str {
        "System Info"
    }

    fn description(&self) -> Option<&'static str> {
        Some("Reports OS and CPU, warns on single-core hosts")
    }

    fn check(&self) -> CheckResult {
        let mut sys = System::new();
        sys.refresh_cpu_all();
        sys.refresh_memory();

        let mut findings = Findings::new();
        findings.note(format!(
            "OS: {} {}",
            System::name().unwrap_or_else(|| "Unknown".to_string()),
            System::os_version().unwrap_or_else(|| "Unknown".to_string())
        ));
        if let Some(hostname) = System::host_name() {
            findings.note(format!("Hostname: {}", hostname));
        }

        let logical_cores = sys.cpus().len();
        match logical_cores {
            0 => findings.record(CheckStatus::Warn, "Unable to detect CPU cores"),
            1 => findings.record(
                CheckStatus::Warn,
                "Single logical core: input and touch delivery share it",
            ),
            cores => findings.record(CheckStatus::Pass, format!("CPU cores: {} logical", cores)),
        }

        findings.note(format!(
            "Memory: {:.1} GB total",
            sys.total_memory() as f64 / 1_073_741_824.0
        ));

        findings.finish(
            "System info gathered",
            "System info gathered with warnings",
            "System info unavailable",
        )
    }
}
