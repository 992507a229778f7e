//! Run reports.
//!
//! A run always ends in a [`RunReport`]: either the inspection summary or
//! the error that stopped the run, plus a cleanup notice when removing the
//! transient storage failed.

use crate::aggregate::InspectionSummary;
use crate::error::{CoreError, CoreResult};
use crate::pipeline::PipelineStage;
use crate::utils::format_duration;

use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use std::path::PathBuf;
use std::time::Duration;

/// Outcome of inspecting one source.
#[derive(Debug)]
pub struct RunReport {
    pub source: PathBuf,
    /// Transient storage used by the run, if it got that far.
    pub storage: Option<PathBuf>,
    /// Frames per second the source was sampled at.
    pub sampling_rate: f64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: CoreResult<InspectionSummary>,
    /// Stage in which the run failed; `None` on success.
    pub failed_stage: Option<PipelineStage>,
    /// Cleanup failure. Never replaces an error in `outcome`.
    pub cleanup_error: Option<CoreError>,
}

impl RunReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    #[must_use]
    pub fn summary(&self) -> Option<&InspectionSummary> {
        self.outcome.as_ref().ok()
    }

    #[must_use]
    pub fn error(&self) -> Option<&CoreError> {
        self.outcome.as_ref().err()
    }

    #[must_use]
    pub fn has_findings(&self) -> bool {
        self.summary().is_some_and(InspectionSummary::has_findings)
    }

    /// Wall-clock duration of the run.
    #[must_use]
    pub fn duration(&self) -> Duration {
        (self.finished_at - self.started_at)
            .to_std()
            .unwrap_or_default()
    }

    /// Consumes the report, keeping only the run outcome.
    pub fn into_result(self) -> CoreResult<InspectionSummary> {
        self.outcome
    }

    /// Renders the report as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut value = json!({
            "type": "report",
            "source": self.source.display().to_string(),
            "started_at": self.started_at.to_rfc3339(),
            "finished_at": self.finished_at.to_rfc3339(),
            "duration_seconds": self.duration().as_secs_f64(),
            "success": self.is_success(),
            "cleanup_error": self.cleanup_error.as_ref().map(ToString::to_string),
        });

        match &self.outcome {
            Ok(summary) => {
                value["summary"] = json!({
                    "frames_extracted": summary.frames_extracted,
                    "duplicates_removed": summary.duplicates_removed,
                    "frames_analyzed": summary.frames_analyzed,
                    "clean": summary.clean,
                    "findings": summary.findings.iter().map(|finding| json!({
                        "frame": finding.frame.name(),
                        "ordinal": finding.frame.ordinal,
                        "timestamp": format_duration(
                            finding.frame.timestamp(self.sampling_rate).as_secs_f64()
                        ),
                        "detail": finding.detail,
                    })).collect::<Vec<_>>(),
                    "errored": summary.errored.iter().map(|errored| json!({
                        "frame": errored.frame.name(),
                        "ordinal": errored.frame.ordinal,
                        "reason": errored.reason,
                    })).collect::<Vec<_>>(),
                });
            }
            Err(e) => {
                value["error"] = json!({
                    "message": e.to_string(),
                    "stage": self.failed_stage,
                });
            }
        }
        value
    }
}
