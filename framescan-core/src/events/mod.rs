//! Run events.
//!
//! The pipeline reports what it is doing through [`Event`]s sent to every
//! registered [`EventHandler`]. Handlers are shared across threads and must
//! not block for long; the CLI uses them for its progress bar and for JSON
//! output.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use log::warn;

use crate::aggregate::Outcome;
use crate::pipeline::PipelineStage;
use crate::pool::panic_message;

pub mod json_handler;

pub use json_handler::JsonProgressHandler;

#[derive(Debug, Clone)]
pub enum Event {
    // Run lifecycle
    RunStarted {
        source: String,
    },

    StageChanged {
        stage: PipelineStage,
    },

    // Stage results
    FramesExtracted {
        count: usize,
    },

    DeduplicationComplete {
        kept: usize,
        removed: usize,
    },

    AnalysisStarted {
        total: usize,
        concurrency: usize,
    },

    FrameAnalyzed {
        completed: usize,
        total: usize,
        frame: String,
        ordinal: u32,
        outcome: Outcome,
    },

    RunComplete {
        source: String,
        findings: usize,
        errored: usize,
        duration: Duration,
    },

    // Failures
    Error {
        title: String,
        message: String,
        stage: PipelineStage,
    },

    Warning {
        message: String,
    },
}

pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &Event);
}

#[derive(Clone)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    /// Sends `event` to every handler. A panicking handler is logged and
    /// skipped; it never unwinds into the pipeline.
    pub fn emit(&self, event: Event) {
        for handler in &self.handlers {
            let delivered = panic::catch_unwind(AssertUnwindSafe(|| handler.handle(&event)));
            if let Err(payload) = delivered {
                warn!(
                    "Event handler panicked on {:?}: {}",
                    event,
                    panic_message(payload.as_ref())
                );
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
