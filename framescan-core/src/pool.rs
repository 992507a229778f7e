// ============================================================================
// framescan-core/src/pool.rs
// ============================================================================
//
// ANALYSIS WORKER POOL: Bounded-Concurrency Dispatch to the Capability
//
// Each unique frame becomes one task. A fixed set of worker threads pulls
// task ids from a shared queue, reads the frame, calls the capability and
// sends the outcome back over a channel. The consumer sees results in the
// order they complete.
//
// KEY COMPONENTS:
// - analyze: Starts the workers and returns the result stream
// - AnalysisStream: Iterator over results; dropping it stops the pool
// - AnalysisResult / AnalysisStatus: One outcome per frame
//
// TASK IDENTITY:
// Frames live in an arena indexed by `TaskId`. Workers and messages carry
// only the id; the stream maps an id back to its frame when the result
// arrives, so nothing is keyed on a live thread or handle.
//
// CANCELLATION:
// Dropping the stream raises a stop flag. Workers finish the call they are
// in, take no new task, and exit; the drop joins them so no worker is still
// reading a frame once the caller moves on to cleanup.

// ---- Internal crate imports ----
use crate::capability::{AnalysisCapability, CapabilityError, Classification};
use crate::config::{RetryPolicy, validate_concurrency};
use crate::error::CoreResult;
use crate::frames::Frame;

// ---- External crate imports ----
use log::{debug, error, warn};

// ---- Standard library imports ----
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

// ============================================================================
// TYPES
// ============================================================================

/// Stable identifier of a task within one `analyze` call.
pub type TaskId = usize;

/// Outcome of one analysis task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisStatus {
    /// The capability answered.
    Completed(Classification),
    /// The capability (or reading the frame) failed; carries the reason.
    Failed(String),
}

/// Result of analysing one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    pub frame: Frame,
    pub status: AnalysisStatus,
}

impl AnalysisResult {
    /// Classification text when the task completed.
    #[must_use]
    pub fn classification(&self) -> Option<&str> {
        match &self.status {
            AnalysisStatus::Completed(classification) => Some(&classification.text),
            AnalysisStatus::Failed(_) => None,
        }
    }
}

/// State shared between the stream and its workers.
struct Shared {
    frames: Arc<[Frame]>,
    pending: Mutex<VecDeque<TaskId>>,
    stop: AtomicBool,
    instruction: String,
    retry: RetryPolicy,
}

impl Shared {
    fn next_task(&self) -> Option<TaskId> {
        if self.stop.load(Ordering::SeqCst) {
            return None;
        }
        // A poisoned queue only means a worker panicked while popping; the
        // ids left in it are still valid.
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.pop_front()
    }
}

// ============================================================================
// ENTRY POINT
// ============================================================================

/// Starts analysing `frames` with at most `concurrency` capability calls in
/// flight and returns the stream of results.
///
/// The stream yields exactly one result per frame, in completion order.
/// Capability failures and panics become `AnalysisStatus::Failed` results and
/// never stop the other tasks.
///
/// Fails with `CoreError::Configuration` when `concurrency` is zero, before
/// any task starts.
///
/// # Examples
///
/// ```rust,no_run
/// use framescan_core::capability::OllamaClient;
/// use framescan_core::config::{OllamaConfig, RetryPolicy};
/// use framescan_core::frames::Frame;
/// use framescan_core::pool::analyze;
/// use std::sync::Arc;
///
/// let capability = Arc::new(OllamaClient::new(OllamaConfig::default()).unwrap());
/// let frames = vec![Frame::new("/tmp/run/frame_0001.png", 1)];
/// for result in analyze(frames, "Answer OK or Found.", 4, capability, RetryPolicy::NONE).unwrap() {
///     println!("{} -> {:?}", result.frame.name(), result.status);
/// }
/// ```
pub fn analyze<C>(
    frames: Vec<Frame>,
    instruction: &str,
    concurrency: usize,
    capability: Arc<C>,
    retry: RetryPolicy,
) -> CoreResult<AnalysisStream>
where
    C: AnalysisCapability + ?Sized + 'static,
{
    validate_concurrency(concurrency)?;

    let total = frames.len();
    let shared = Arc::new(Shared {
        frames: frames.into(),
        pending: Mutex::new((0..total).collect()),
        stop: AtomicBool::new(false),
        instruction: instruction.to_string(),
        retry,
    });

    let (sender, receiver) = mpsc::channel();
    let worker_count = concurrency.min(total);
    debug!("Starting {worker_count} analysis workers for {total} frames");

    let mut workers = Vec::with_capacity(worker_count);
    for index in 0..worker_count {
        let worker_shared = Arc::clone(&shared);
        let capability = Arc::clone(&capability);
        let sender = sender.clone();
        let spawned = thread::Builder::new()
            .name(format!("framescan-worker-{index}"))
            .spawn(move || worker_loop(&worker_shared, capability.as_ref(), &sender));
        match spawned {
            Ok(handle) => workers.push(handle),
            Err(e) => {
                if workers.is_empty() {
                    shared.stop.store(true, Ordering::SeqCst);
                    return Err(e.into());
                }
                warn!("Could only start {} of {} analysis workers: {}", workers.len(), worker_count, e);
                break;
            }
        }
    }

    Ok(AnalysisStream {
        shared,
        receiver,
        workers,
        remaining: total,
    })
}

fn worker_loop<C>(shared: &Shared, capability: &C, sender: &Sender<(TaskId, AnalysisStatus)>)
where
    C: AnalysisCapability + ?Sized,
{
    while let Some(id) = shared.next_task() {
        let frame = &shared.frames[id];
        let status = run_task(frame, capability, &shared.instruction, shared.retry);
        if sender.send((id, status)).is_err() {
            // Consumer is gone; nothing left to report to.
            break;
        }
    }
}

fn run_task<C>(frame: &Frame, capability: &C, instruction: &str, retry: RetryPolicy) -> AnalysisStatus
where
    C: AnalysisCapability + ?Sized,
{
    let content = match std::fs::read(&frame.path) {
        Ok(content) => content,
        Err(e) => {
            return AnalysisStatus::Failed(format!(
                "failed to read {}: {}",
                frame.path.display(),
                e
            ));
        }
    };

    let attempts = retry.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| capability.infer(&content, instruction)));
        let error = match outcome {
            Ok(Ok(classification)) => {
                debug!("{}: {}", frame.path.display(), classification.text.trim_end());
                return AnalysisStatus::Completed(classification);
            }
            Ok(Err(e)) => e,
            Err(payload) => CapabilityError::Other(format!(
                "analysis panicked: {}",
                panic_message(payload.as_ref())
            )),
        };

        if attempt < attempts && error.is_transient() {
            warn!(
                "Attempt {}/{} for {} failed, retrying: {}",
                attempt,
                attempts,
                frame.path.display(),
                error
            );
            attempt += 1;
            continue;
        }

        error!("Error processing {}: {}", frame.path.display(), error);
        return AnalysisStatus::Failed(error.to_string());
    }
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

// ============================================================================
// RESULT STREAM
// ============================================================================

/// Lazily yields analysis results as tasks complete.
///
/// Consuming the stream is what the caller waits on; the workers run in the
/// background from the moment `analyze` returns. Dropping the stream early
/// stops new tasks from starting and waits for in-flight calls to finish.
pub struct AnalysisStream {
    shared: Arc<Shared>,
    receiver: Receiver<(TaskId, AnalysisStatus)>,
    workers: Vec<JoinHandle<()>>,
    remaining: usize,
}

impl AnalysisStream {
    /// Number of frames submitted to this stream.
    #[must_use]
    pub fn total(&self) -> usize {
        self.shared.frames.len()
    }

    /// Number of results not yet yielded.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    fn shutdown(&mut self) {
        self.shared.stop.store(true, Ordering::SeqCst);
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                error!("An analysis worker terminated abnormally");
            }
        }
    }
}

impl Iterator for AnalysisStream {
    type Item = AnalysisResult;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        match self.receiver.recv() {
            Ok((id, status)) => {
                self.remaining -= 1;
                Some(AnalysisResult {
                    frame: self.shared.frames[id].clone(),
                    status,
                })
            }
            Err(_) => {
                error!(
                    "Analysis workers exited with {} results outstanding",
                    self.remaining
                );
                self.remaining = 0;
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

impl Drop for AnalysisStream {
    fn drop(&mut self) {
        if self.remaining > 0 {
            debug!(
                "Analysis abandoned with {} results outstanding; waiting for in-flight tasks",
                self.remaining
            );
        }
        self.shutdown();
    }
}
