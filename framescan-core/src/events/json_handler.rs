//! JSON progress handler for structured progress output
//!
//! This module provides a JSON-based event handler that writes one JSON
//! object per line for consumption by external tools.

use super::{Event, EventHandler};
use crate::aggregate::Outcome;
use serde_json::json;
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Event handler that outputs progress events as JSON lines
pub struct JsonProgressHandler {
    output: Mutex<Box<dyn Write + Send>>,
}

impl JsonProgressHandler {
    /// Create a new JSON progress handler that writes to stdout
    pub fn new() -> Self {
        Self {
            output: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Create a new JSON progress handler with a custom writer
    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            output: Mutex::new(writer),
        }
    }

    /// Get current timestamp as seconds since Unix epoch
    fn get_timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    /// Write a JSON progress event to the output
    fn write_json(&self, value: serde_json::Value) {
        if let Ok(mut output) = self.output.lock() {
            if let Ok(json_str) = serde_json::to_string(&value) {
                let _ = writeln!(output, "{}", json_str);
                let _ = output.flush();
            }
        }
    }
}

/// Short label and optional text for an outcome.
fn outcome_fields(outcome: &Outcome) -> (&'static str, Option<&str>) {
    match outcome {
        Outcome::Flagged(detail) => ("flagged", Some(detail.as_str())),
        Outcome::Clean => ("clean", None),
        Outcome::Errored(reason) => ("errored", Some(reason.as_str())),
    }
}

impl EventHandler for JsonProgressHandler {
    fn handle(&self, event: &Event) {
        let timestamp = Self::get_timestamp();

        match event {
            Event::RunStarted { source } => {
                self.write_json(json!({
                    "type": "run_started",
                    "source": source,
                    "timestamp": timestamp
                }));
            }

            Event::StageChanged { stage } => {
                self.write_json(json!({
                    "type": "stage",
                    "stage": stage,
                    "timestamp": timestamp
                }));
            }

            Event::DeduplicationComplete { kept, removed } => {
                self.write_json(json!({
                    "type": "deduplication_complete",
                    "kept": kept,
                    "removed": removed,
                    "timestamp": timestamp
                }));
            }

            Event::FrameAnalyzed {
                completed,
                total,
                frame,
                ordinal,
                outcome,
            } => {
                let (label, detail) = outcome_fields(outcome);
                let percent = if *total > 0 {
                    (*completed as f64 / *total as f64 * 100.0).round()
                } else {
                    100.0
                };
                self.write_json(json!({
                    "type": "frame_analyzed",
                    "frame": frame,
                    "ordinal": ordinal,
                    "outcome": label,
                    "detail": detail,
                    "completed": completed,
                    "total": total,
                    "percent": percent,
                    "timestamp": timestamp
                }));
            }

            Event::RunComplete {
                source,
                findings,
                errored,
                duration,
            } => {
                self.write_json(json!({
                    "type": "run_complete",
                    "source": source,
                    "findings": findings,
                    "errored": errored,
                    "duration_seconds": duration.as_secs_f64(),
                    "timestamp": timestamp
                }));
            }

            Event::Error {
                title,
                message,
                stage,
            } => {
                self.write_json(json!({
                    "type": "error",
                    "title": title,
                    "message": message,
                    "stage": stage,
                    "timestamp": timestamp
                }));
            }

            Event::Warning { message } => {
                self.write_json(json!({
                    "type": "warning",
                    "message": message,
                    "timestamp": timestamp
                }));
            }

            // Frame counts and pool start are covered by the events around them
            Event::FramesExtracted { .. } | Event::AnalysisStarted { .. } => {}
        }
    }
}

impl Default for JsonProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}
