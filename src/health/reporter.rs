//! Formatting and reporting for health check results

use colored::Colorize;
use tabled::{
    builder::Builder,
    settings::{Alignment, Modify, Style, object::Rows},
};

use super::runner::HealthCheckReport;

/// Formats a health check report as a table followed by a summary
pub fn format_report(report: &HealthCheckReport) -> String {
    let mut builder = Builder::default();
    builder.push_record(["System", "Status", "Duration", "Message"]);

    for (name, result) in &report.results {
        builder.push_record([
            name.as_str(),
            &result.status.as_colored_str(),
            &format!("{:.2?}", result.duration),
            &result.message,
        ]);
    }

    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    let mut output = table.to_string();
    output.push('\n');
    output.push_str(&format_summary(report));
    output
}

/// Formats the detail lines of every check that produced any
pub fn format_details(report: &HealthCheckReport) -> String {
    let mut output = String::new();
    for (name, result) in &report.results {
        if result.details.is_empty() {
            continue;
        }
        output.push_str(&format!("\n{} Details:\n", name.bold()));
        for line in &result.details {
            output.push_str(line);
            output.push('\n');
        }
    }
    output
}

fn format_summary(report: &HealthCheckReport) -> String {
    let mut summary = format!("\n{}\n", "Summary".bold().underline());
    summary.push_str(&format!("  Total checks: {}\n", report.total));
    summary.push_str(&format!("  {} Passed: {}\n", "✓".green(), report.passed));

    if report.warned > 0 {
        summary.push_str(&format!("  {} Warned: {}\n", "⚠".yellow(), report.warned));
    }
    if report.failed > 0 {
        summary.push_str(&format!("  {} Failed: {}\n", "✗".red(), report.failed));
    }

    summary.push('\n');
    let overall = match (report.is_healthy(), report.has_warnings()) {
        (false, _) => "Overall: UNHEALTHY".red().bold(),
        (true, true) => "Overall: HEALTHY (with warnings)".yellow().bold(),
        (true, false) => "Overall: HEALTHY".green().bold(),
    };
    summary.push_str(&format!("  {}\n", overall));
    summary
}

/// Prints a health check report and its details to stdout
pub fn print_report(report: &HealthCheckReport) {
    println!("{}", format_report(report));
    print!("{}", format_details(report));
}
