// ============================================================================
// framescan-core/src/external/frame_producer.rs
// ============================================================================
//
// FRAME PRODUCER: Sampling a Video Into Frame Files
//
// The pipeline only needs a directory of `frame_<NNNN>.<ext>` files sampled
// at a fixed rate. This module defines that seam and the ffmpeg-backed
// implementation used in production.
//
// KEY COMPONENTS:
// - FrameProducer: Trait for anything that can populate a frame directory
// - FfmpegFrameProducer: Runs `ffmpeg -i <src> -vf fps=<rate> <dir>/frame_%04d.<ext>`

// ---- Internal crate imports ----
use super::ffmpeg_events::ExtractionEventHandler;
use super::ffmpeg_executor::{FfmpegProcess, FfmpegSpawner, SidecarSpawner};
use crate::config::DEFAULT_FRAME_EXTENSION;
use crate::error::{CoreError, CoreResult};
use crate::frames::frame_pattern;

// ---- External crate imports ----
use ffmpeg_sidecar::command::FfmpegCommand;
use log::{debug, error, info};

// ---- Standard library imports ----
use std::path::Path;

/// Writes sampled frames of `source` into `destination`.
///
/// Implementations must name frames `frame_<NNNN>.<ext>` with ordinals
/// starting at 1, and fail with `CoreError::Extraction` when the underlying
/// tool reports failure.
pub trait FrameProducer {
    /// Extension of the frame files this producer writes.
    fn frame_extension(&self) -> &str;

    fn extract(&self, source: &Path, destination: &Path, sampling_rate: f64) -> CoreResult<()>;
}

impl<T: FrameProducer + ?Sized> FrameProducer for &T {
    fn frame_extension(&self) -> &str {
        (**self).frame_extension()
    }

    fn extract(&self, source: &Path, destination: &Path, sampling_rate: f64) -> CoreResult<()> {
        (**self).extract(source, destination, sampling_rate)
    }
}

/// Frame producer backed by the ffmpeg binary.
#[derive(Debug, Clone)]
pub struct FfmpegFrameProducer<S: FfmpegSpawner = SidecarSpawner> {
    spawner: S,
    extension: String,
}

impl FfmpegFrameProducer<SidecarSpawner> {
    /// Producer writing PNG frames through ffmpeg-sidecar.
    #[must_use]
    pub fn new() -> Self {
        Self::with_spawner(SidecarSpawner)
    }
}

impl Default for FfmpegFrameProducer<SidecarSpawner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: FfmpegSpawner> FfmpegFrameProducer<S> {
    pub fn with_spawner(spawner: S) -> Self {
        Self {
            spawner,
            extension: DEFAULT_FRAME_EXTENSION.to_string(),
        }
    }

    /// Sets the image format by extension ("png", "jpg", ...).
    #[must_use]
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn spawner(&self) -> &S {
        &self.spawner
    }
}

/// Builds the ffmpeg command that samples `source` at `sampling_rate` frames
/// per second into `destination`.
pub fn build_extraction_command(
    source: &Path,
    destination: &Path,
    sampling_rate: f64,
    extension: &str,
) -> FfmpegCommand {
    let output = destination.join(frame_pattern(extension));
    let mut cmd = FfmpegCommand::new();
    cmd.args(["-hide_banner", "-nostdin"]);
    cmd.input(source.to_string_lossy().as_ref());
    cmd.arg("-vf");
    cmd.arg(format!("fps={sampling_rate}"));
    cmd.output(output.to_string_lossy().as_ref());
    cmd
}

impl<S: FfmpegSpawner> FrameProducer for FfmpegFrameProducer<S> {
    fn frame_extension(&self) -> &str {
        &self.extension
    }

    fn extract(&self, source: &Path, destination: &Path, sampling_rate: f64) -> CoreResult<()> {
        let cmd = build_extraction_command(source, destination, sampling_rate, &self.extension);
        debug!("Running frame extraction command: {:?}", cmd);

        let mut handler = ExtractionEventHandler::new();
        let mut process = self.spawner.spawn(cmd)?;
        process.handle_events(|event| handler.handle_event(event))?;
        let status = process.wait()?;

        if !status.success() {
            error!("Frame extraction failed for {}: {}", source.display(), status);
            return Err(CoreError::Extraction {
                source_path: source.to_path_buf(),
                status,
                stderr: handler.stderr_buffer().to_string(),
            });
        }

        info!(
            "Extracted frames from {} at {} fps",
            source.display(),
            sampling_rate
        );
        debug!("ffmpeg reported {} frames written", handler.frames_written());
        Ok(())
    }
}
