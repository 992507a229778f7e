//! Human-readable rendering of run reports.
//!
//! Reports are rendered into a `String` so they can be checked in tests;
//! `console` drops the styling when stdout is not a terminal.

use console::style;
use framescan_core::format_duration;
use framescan_core::reporting::RunReport;
use std::fmt::Write;

/// Renders `report` as the text block printed after each video.
pub fn render_report(report: &RunReport) -> String {
    let mut out = String::new();
    let line = "=".repeat(50);

    let _ = writeln!(out, "{}", style(&line).blue());
    let _ = writeln!(out, " {}", style(report.source.display()).bold());
    let _ = writeln!(out, "{}", style(&line).blue());

    match &report.outcome {
        Ok(summary) => {
            let _ = writeln!(out, "  {:<20}{}", "Frames extracted:", summary.frames_extracted);
            let _ = writeln!(out, "  {:<20}{}", "Duplicates removed:", summary.duplicates_removed);
            let _ = writeln!(
                out,
                "  {:<20}{} ({} clean, {} flagged, {} errored)",
                "Frames analyzed:",
                summary.frames_analyzed,
                summary.clean,
                summary.findings.len(),
                summary.errored.len()
            );
            let _ = writeln!(
                out,
                "  {:<20}{}",
                "Duration:",
                format_duration(report.duration().as_secs_f64())
            );

            if summary.findings.is_empty() {
                let _ = writeln!(out, "\n  {}", style("No anomalies found").green());
            } else {
                let _ = writeln!(out, "\n  {}", style("Findings").red().bold());
                for finding in &summary.findings {
                    let at = finding.frame.timestamp(report.sampling_rate).as_secs_f64();
                    let _ = writeln!(
                        out,
                        "  [{}] {}",
                        style(format_duration(at)).cyan(),
                        finding.frame.name()
                    );
                    for detail_line in finding.detail.lines().filter(|l| !l.trim().is_empty()) {
                        let _ = writeln!(out, "      {}", detail_line.trim_end());
                    }
                }
            }

            if !summary.errored.is_empty() {
                let _ = writeln!(out, "\n  {}", style("Frames not analyzed").yellow().bold());
                for errored in &summary.errored {
                    let _ = writeln!(out, "  {}: {}", errored.frame.name(), errored.reason);
                }
            }
        }
        Err(e) => {
            let stage = report
                .failed_stage
                .map(|stage| format!(" during {stage}"))
                .unwrap_or_default();
            let _ = writeln!(out, "  {}{}: {}", style("Failed").red().bold(), stage, e);
        }
    }

    if let Some(cleanup) = &report.cleanup_error {
        let _ = writeln!(out, "\n  {} {}", style("Warning:").yellow().bold(), cleanup);
    }
    out
}

/// Prints an error message with red styling to stderr.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), message);
}
