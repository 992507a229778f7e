//! Classification and accumulation of analysis results.
//!
//! Every result coming out of the worker pool is classified as flagged,
//! clean or errored. Flagged results are kept together with the frame they
//! came from, in the order they completed.

use crate::frames::Frame;
use crate::pool::{AnalysisResult, AnalysisStatus};
use crate::utils::first_line;

use log::{debug, info, warn};

/// Response prefix that marks a finding.
pub const FLAG_TOKEN: &str = "Found";

/// Markdown bold marker some models put in front of the token.
const EMPHASIS_MARKER: &str = "**";

/// Classification of a single result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The response reports an anomaly; carries the full response text.
    Flagged(String),
    Clean,
    /// The task failed; carries the failure reason.
    Errored(String),
}

/// Returns true when `text` starts with "Found", optionally preceded by a
/// bold marker. The match is case-sensitive.
#[must_use]
pub fn is_flagged_response(text: &str) -> bool {
    let text = text.strip_prefix(EMPHASIS_MARKER).unwrap_or(text);
    text.starts_with(FLAG_TOKEN)
}

/// Classifies one analysis result.
#[must_use]
pub fn classify(result: &AnalysisResult) -> Outcome {
    match &result.status {
        AnalysisStatus::Failed(reason) => Outcome::Errored(reason.clone()),
        AnalysisStatus::Completed(classification) if is_flagged_response(&classification.text) => {
            Outcome::Flagged(classification.text.clone())
        }
        AnalysisStatus::Completed(_) => Outcome::Clean,
    }
}

/// A frame whose analysis reported an anomaly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlaggedFinding {
    pub frame: Frame,
    pub detail: String,
}

/// A frame whose analysis could not be completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErroredFrame {
    pub frame: Frame,
    pub reason: String,
}

/// Final tally of one inspection run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InspectionSummary {
    /// Frames written by the frame producer.
    pub frames_extracted: usize,
    /// Frames discarded as byte-identical repeats.
    pub duplicates_removed: usize,
    /// Results received from the pool.
    pub frames_analyzed: usize,
    pub clean: usize,
    /// Flagged frames, in completion order.
    pub findings: Vec<FlaggedFinding>,
    pub errored: Vec<ErroredFrame>,
}

impl InspectionSummary {
    #[must_use]
    pub fn has_findings(&self) -> bool {
        !self.findings.is_empty()
    }
}

/// Accumulates classified results from a single consumer.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    analyzed: usize,
    clean: usize,
    findings: Vec<FlaggedFinding>,
    errored: Vec<ErroredFrame>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies `result`, records it, and returns its outcome.
    pub fn record(&mut self, result: AnalysisResult) -> Outcome {
        let outcome = classify(&result);
        self.analyzed += 1;
        match &outcome {
            Outcome::Flagged(detail) => {
                info!("Found in {}: {}", result.frame.name(), first_line(detail));
                self.findings.push(FlaggedFinding {
                    frame: result.frame,
                    detail: detail.clone(),
                });
            }
            Outcome::Clean => {
                debug!("{} is clean", result.frame.name());
                self.clean += 1;
            }
            Outcome::Errored(reason) => {
                warn!("Analysis of {} failed: {}", result.frame.name(), reason);
                self.errored.push(ErroredFrame {
                    frame: result.frame,
                    reason: reason.clone(),
                });
            }
        }
        outcome
    }

    /// Drains `results` to completion.
    pub fn consume<I>(&mut self, results: I)
    where
        I: IntoIterator<Item = AnalysisResult>,
    {
        for result in results {
            self.record(result);
        }
    }

    #[must_use]
    pub fn findings(&self) -> &[FlaggedFinding] {
        &self.findings
    }

    #[must_use]
    pub fn analyzed(&self) -> usize {
        self.analyzed
    }

    /// Produces the run summary. Counts from earlier stages are supplied by
    /// the caller.
    #[must_use]
    pub fn finish(self, frames_extracted: usize, duplicates_removed: usize) -> InspectionSummary {
        InspectionSummary {
            frames_extracted,
            duplicates_removed,
            frames_analyzed: self.analyzed,
            clean: self.clean,
            findings: self.findings,
            errored: self.errored,
        }
    }
}
