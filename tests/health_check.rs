//! Integration tests for the health check system

use keytouch::health::{self, CheckStatus, HealthCheckRunner, SystemCheck, checks::*};
use keytouch::input::{KeyCode, LogicalKey};
use keytouch::keymap::{ButtonBinding, FileKeymapStore, Keymap, KeymapStore, Transform};

#[test]
fn test_all_health_checks() {
    let report = health::run_all_checks();

    if !report.is_healthy() {
        eprintln!("\n{}", health::format_report(&report));
        eprintln!("{}", health::format_details(&report));
    }

    assert!(
        report.is_healthy(),
        "Health checks failed: {} failures, {} warnings",
        report.failed,
        report.warned
    );
}

#[test]
fn test_config_check() {
    let result = ConfigCheck::new().check();
    assert!(
        result.status.is_ok(),
        "Config check failed: {}",
        result.message
    );
}

#[test]
fn test_build_info_check() {
    let result = BuildInfoCheck::new().check();
    assert!(
        result.status.is_ok(),
        "Build info check failed: {}",
        result.message
    );
    assert!(!result.details.is_empty());
}

#[test]
fn test_system_info_check() {
    let result = SystemInfoCheck::new().check();
    assert!(
        result.status.is_ok(),
        "System info check failed: {}",
        result.message
    );
}

#[test]
fn test_work_queue_check_delivers_a_tap() {
    let result = WorkQueueCheck::new().check();
    assert_eq!(
        result.status,
        CheckStatus::Pass,
        "{}: {:?}",
        result.message,
        result.details
    );
}

#[test]
fn test_keymap_check_reads_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("keymap.toml");
    let mut keymap = Keymap::new();
    keymap.buttons.push(ButtonBinding {
        key: LogicalKey::Key(KeyCode::Space),
        transform: Transform {
            x: 0.5,
            y: 0.5,
            size: 0.05,
        },
    });
    FileKeymapStore::new(&path).save(&keymap).unwrap();

    let report = health::run_all_checks_with_keymap(&path);
    let result = report.result("Keymap").unwrap();
    assert_eq!(result.status, CheckStatus::Pass, "{:?}", result.details);
}

#[test]
fn test_sample_keymap_is_loadable() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/keymaps/shooter.toml");
    let result = KeymapCheck::from_path(path).check();
    assert_eq!(result.status, CheckStatus::Pass, "{:?}", result.details);
}

#[test]
fn test_runner_collects_all_checks() {
    let report = HealthCheckRunner::new()
        .add_check(ConfigCheck::new())
        .add_check(KeymapCheck::new(Keymap::new()))
        .run();

    assert_eq!(report.total, 2, "Expected 2 checks in report");
    assert_eq!(report.passed + report.warned + report.failed, report.total);
    assert!(report.result("Keymap").is_some());
}

#[test]
fn test_report_exit_codes() {
    let warned = HealthCheckRunner::new()
        .add_check(KeymapCheck::new(Keymap::new()))
        .run();
    assert_eq!(warned.exit_code(), 2);

    let failed = HealthCheckRunner::new()
        .add_check(KeymapCheck::new(Keymap {
            version: "4.0.0".to_string(),
            ..Keymap::new()
        }))
        .run();
    assert!(!failed.is_healthy());
    assert_eq!(failed.exit_code(), 1);
}
