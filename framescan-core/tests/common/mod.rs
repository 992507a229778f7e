// framescan-core/tests/common/mod.rs
//
// Test doubles shared by the integration tests: a scripted analysis
// capability, a frame producer that writes frames from memory, and a cleaner
// that records every call.

#![allow(dead_code)]

use framescan_core::capability::{AnalysisCapability, CapabilityError, Classification};
use framescan_core::error::{CoreError, CoreResult};
use framescan_core::external::FrameProducer;
use framescan_core::temp_files::{FsCleaner, StorageCleaner};

use std::io;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

type Responder = dyn Fn(&[u8]) -> Result<Classification, CapabilityError> + Send + Sync;

// --- Analysis capability ---

/// Capability answering from a closure over the frame content, while
/// tracking how many calls were made and how many overlapped.
pub struct ScriptedCapability {
    respond: Box<Responder>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    instructions: Mutex<Vec<String>>,
}

impl ScriptedCapability {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&[u8]) -> Result<Classification, CapabilityError> + Send + Sync + 'static,
    {
        Self {
            respond: Box::new(respond),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            instructions: Mutex::new(Vec::new()),
        }
    }

    /// Answers with the frame content itself, so frames can script their
    /// own classification ("OK", "Found: ...").
    pub fn echo() -> Self {
        Self::new(|content| Ok(Classification::new(String::from_utf8_lossy(content))))
    }

    /// Holds every call for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn instructions(&self) -> Vec<String> {
        self.instructions.lock().unwrap().clone()
    }
}

impl AnalysisCapability for ScriptedCapability {
    fn infer(&self, content: &[u8], instruction: &str) -> Result<Classification, CapabilityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.instructions.lock().unwrap().push(instruction.to_string());

        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        let answer = (self.respond)(content);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        answer
    }
}

// --- Frame producer ---

enum Failure {
    None,
    /// Write the frames, then report a failed extraction.
    ExitAfterWriting,
    /// Replace the frame with this ordinal by one that cannot be read.
    UnreadableFrame(u32),
}

/// Writes `frame_<NNNN>.png` files from in-memory contents.
pub struct InMemoryFrameProducer {
    frames: Vec<Vec<u8>>,
    failure: Failure,
    destinations: Mutex<Vec<PathBuf>>,
}

impl InMemoryFrameProducer {
    pub fn new<I, B>(frames: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        Self {
            frames: frames.into_iter().map(|f| f.as_ref().to_vec()).collect(),
            failure: Failure::None,
            destinations: Mutex::new(Vec::new()),
        }
    }

    /// Extraction fails with a non-zero exit after writing its frames.
    pub fn failing(mut self) -> Self {
        self.failure = Failure::ExitAfterWriting;
        self
    }

    /// The frame with `ordinal` is a link to `/proc/self/mem`: it looks like
    /// a regular file but every read fails.
    pub fn with_unreadable_frame(mut self, ordinal: u32) -> Self {
        self.failure = Failure::UnreadableFrame(ordinal);
        self
    }

    /// Storage directories the producer was asked to populate.
    pub fn destinations(&self) -> Vec<PathBuf> {
        self.destinations.lock().unwrap().clone()
    }
}

impl FrameProducer for InMemoryFrameProducer {
    fn frame_extension(&self) -> &str {
        "png"
    }

    fn extract(&self, source: &Path, destination: &Path, _sampling_rate: f64) -> CoreResult<()> {
        self.destinations
            .lock()
            .unwrap()
            .push(destination.to_path_buf());

        for (index, content) in self.frames.iter().enumerate() {
            let ordinal = index as u32 + 1;
            let path = destination.join(format!("frame_{ordinal:04}.png"));
            match self.failure {
                Failure::UnreadableFrame(bad) if bad == ordinal => {
                    std::os::unix::fs::symlink("/proc/self/mem", &path)?;
                }
                _ => std::fs::write(&path, content)?,
            }
        }

        if let Failure::ExitAfterWriting = self.failure {
            return Err(CoreError::Extraction {
                source_path: source.to_path_buf(),
                status: ExitStatus::from_raw(1 << 8),
                stderr: format!("{}: Invalid data found when processing input", source.display()),
            });
        }
        Ok(())
    }
}

// --- Storage cleaner ---

/// Records every removal, then removes for real unless told to fail.
#[derive(Default)]
pub struct RecordingCleaner {
    calls: Mutex<Vec<PathBuf>>,
    fail: bool,
}

impl RecordingCleaner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every removal fails and leaves the storage in place.
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }
}

impl StorageCleaner for RecordingCleaner {
    fn remove_all(&self, location: &Path) -> CoreResult<()> {
        self.calls.lock().unwrap().push(location.to_path_buf());
        if self.fail {
            return Err(CoreError::Cleanup {
                path: location.to_path_buf(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "storage is busy"),
            });
        }
        FsCleaner.remove_all(location)
    }
}

// --- Helpers ---

/// Writes one file per content into `dir` and returns them as frames.
pub fn write_frames(dir: &Path, contents: &[&str]) -> Vec<framescan_core::frames::Frame> {
    contents
        .iter()
        .enumerate()
        .map(|(index, content)| {
            let ordinal = index as u32 + 1;
            let path = dir.join(format!("frame_{ordinal:04}.png"));
            std::fs::write(&path, content).unwrap();
            framescan_core::frames::Frame::new(path, ordinal)
        })
        .collect()
}
