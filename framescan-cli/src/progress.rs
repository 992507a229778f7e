// ============================================================================
// framescan-cli/src/progress.rs
// ============================================================================
//
// PROGRESS REPORTING: Terminal progress bar for inspection runs
//
// Listens to pipeline events and draws an indicatif bar on stderr while
// frames are being analyzed. Findings are printed above the bar as they
// arrive. Only installed when stderr is a terminal and JSON output is off.
//
// KEY COMPONENTS:
// - TerminalProgress: EventHandler owning the current bar
//
// AI-ASSISTANT-INFO: indicatif-based progress display driven by core events

// ---- Internal crate imports ----
use framescan_core::aggregate::Outcome;
use framescan_core::events::{Event, EventHandler};
use framescan_core::pipeline::PipelineStage;
use framescan_core::utils::first_line;

// ---- External crate imports ----
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

// ---- Standard library imports ----
use std::sync::Mutex;
use std::time::Duration;

const BAR_TEMPLATE: &str =
    "{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len} ({elapsed_precise}, eta {eta})";

/// Progress display for one pipeline. Bars are created per run.
#[derive(Default)]
pub struct TerminalProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl TerminalProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn start_bar(&self, total: usize, concurrency: usize) {
        let pb = ProgressBar::new(total as u64);
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░ ");
        pb.set_style(style);
        pb.set_message(format!("Analyzing ({concurrency} workers)"));
        pb.enable_steady_tick(Duration::from_millis(100));
        self.replace(Some(pb));
    }

    fn replace(&self, next: Option<ProgressBar>) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.take() {
                old.finish_and_clear();
            }
            *guard = next;
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                f(pb);
            }
        }
    }
}

impl EventHandler for TerminalProgress {
    fn handle(&self, event: &Event) {
        match event {
            Event::AnalysisStarted { total, concurrency } => self.start_bar(*total, *concurrency),
            Event::FrameAnalyzed {
                completed,
                frame,
                outcome,
                ..
            } => self.with_bar(|pb| {
                pb.set_position(*completed as u64);
                if let Outcome::Flagged(detail) = outcome {
                    pb.println(format!(
                        "{} {}: {}",
                        style("Found").red().bold(),
                        frame,
                        first_line(detail)
                    ));
                }
            }),
            Event::StageChanged {
                stage: PipelineStage::Reporting | PipelineStage::CleaningUp,
            }
            | Event::Error { .. } => self.replace(None),
            _ => {}
        }
    }
}
