//! Human-readable formatter for run outcomes.

use super::Formatter;
use anyhow::Result;
use colored::*;
use lockcheck_core::{
    CheckReport, DiffLine, DiffOutcome, DiffReport, Finding, RunOutcome, Severity,
};
use std::fmt::Write;

pub const PASSED_MESSAGE: &str = "lockcheck: checks passed.";
pub const FAILED_MESSAGE: &str = "Package lock file failed validation.";

pub struct HumanFormatter;

impl Formatter for HumanFormatter {
    fn render(&self, outcome: &RunOutcome, verbose: bool) -> Result<String> {
        let mut out = String::new();
        match outcome {
            RunOutcome::Check(report) => write_check(&mut out, report)?,
            RunOutcome::Diff(diff) => write_diff(&mut out, diff, verbose)?,
        }
        Ok(out)
    }
}

fn severity_tag(severity: Severity) -> ColoredString {
    match severity {
        Severity::Error => "[ERROR]".red(),
        Severity::Warning => "[WARN]".yellow(),
        Severity::Info => "[INFO]".cyan(),
    }
}

fn write_finding(out: &mut String, finding: &Finding) -> std::fmt::Result {
    writeln!(out, "{} {}", severity_tag(finding.severity), finding.message)?;
    for detail in &finding.details {
        writeln!(out, "- {}", detail)?;
    }
    writeln!(out)
}

fn write_check(out: &mut String, report: &CheckReport) -> std::fmt::Result {
    for finding in report.findings() {
        write_finding(out, finding)?;
    }

    if report.passed() {
        writeln!(out, "{}", PASSED_MESSAGE)
    } else {
        writeln!(out, "{}", FAILED_MESSAGE.red().bold())
    }
}

fn write_summary(out: &mut String, report: &DiffReport) -> std::fmt::Result {
    let summary = report.summary();
    let groups = [
        ("New packages", &summary.new_packages),
        ("Removed packages", &summary.removed_packages),
        ("Changed packages", &summary.changed_packages),
    ];

    for (label, names) in groups {
        if !names.is_empty() {
            writeln!(out, "{} {}: {}", severity_tag(Severity::Info), label, names.join(", "))?;
        }
    }
    if !report.is_empty() {
        writeln!(out)?;
    }
    Ok(())
}

/// A diff line with color. Without color support this equals `line.to_string()`.
fn colorize(line: &DiffLine) -> String {
    match line {
        DiffLine::RemovedPackage(name) => format!("- {}", name.red()),
        DiffLine::PackageHeader(name) => name.bold().to_string(),
        DiffLine::RemovedVersion(version) => format!("- {}", version.red()),
        DiffLine::AddedVersion { version, urls } => format!(
            "+ {} {}",
            version.green(),
            format!("[{}]", urls.join(", ")).green().dimmed()
        ),
        DiffLine::ChangedVersion(version) => format!("  ~ {}", version.yellow()),
        DiffLine::AddedUrl(url) => format!("    + {}", url.green()),
        DiffLine::RemovedUrl(url) => format!("    - {}", url.red()),
    }
}

fn write_diff(out: &mut String, diff: &DiffOutcome, verbose: bool) -> std::fmt::Result {
    let Some(report) = &diff.report else {
        return writeln!(
            out,
            "{} No baseline available from {}",
            severity_tag(Severity::Warning),
            diff.baseline
        );
    };

    if verbose {
        write_summary(out, report)?;
    }

    if report.is_empty() {
        return writeln!(out, "lockcheck: no dependency changes.");
    }

    for line in report.lines() {
        writeln!(out, "{}", colorize(&line))?;
    }
    Ok(())
}
