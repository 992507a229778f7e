//! `FFmpeg` event handling for frame extraction
//!
//! Turns the event stream of an extraction run into log output and keeps
//! the error lines so a failed run can report why ffmpeg gave up.

use crate::error::CoreResult;
use ffmpeg_sidecar::event::{FfmpegEvent, FfmpegProgress, LogLevel as FfmpegLogLevel};

/// Collects state from the events of one extraction run
#[derive(Debug, Default)]
pub struct ExtractionEventHandler {
    frames_written: u32,
    stderr_buffer: String,
}

impl ExtractionEventHandler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles an `FFmpeg` event
    pub fn handle_event(&mut self, event: FfmpegEvent) -> CoreResult<()> {
        match event {
            FfmpegEvent::Progress(progress) => self.handle_progress(&progress),
            FfmpegEvent::Log(level, message) => self.handle_log(&level, &message),
            FfmpegEvent::Error(error) => self.handle_error(&error),
            _ => {}
        }
        Ok(())
    }

    /// Frame count last reported by ffmpeg's progress lines
    #[must_use]
    pub fn frames_written(&self) -> u32 {
        self.frames_written
    }

    /// Gets the accumulated error lines
    #[must_use]
    pub fn stderr_buffer(&self) -> &str {
        &self.stderr_buffer
    }

    fn handle_progress(&mut self, progress: &FfmpegProgress) {
        if progress.frame > self.frames_written {
            self.frames_written = progress.frame;
            log::trace!(
                target: "ffmpeg_log",
                "extracted {} frames (time {})",
                progress.frame,
                progress.time
            );
        }
    }

    fn handle_log(&mut self, level: &FfmpegLogLevel, message: &str) {
        let log_level = map_ffmpeg_log_level(level);
        if log_level == log::Level::Error {
            self.push_stderr(message);
        }
        if log_level == log::Level::Info {
            log::debug!(target: "ffmpeg_log", "{message}");
        } else {
            log::log!(target: "ffmpeg_log", log_level, "{message}");
        }
    }

    fn handle_error(&mut self, error: &str) {
        if is_non_critical_ffmpeg_error(error) {
            log::debug!("ffmpeg non-critical message: {error}");
            return;
        }
        log::debug!("ffmpeg stderr error: {error}");
        self.push_stderr(error);
    }

    fn push_stderr(&mut self, line: &str) {
        self.stderr_buffer.push_str(line);
        self.stderr_buffer.push('\n');
    }
}

/// Maps `FFmpeg` log level to Rust log level
fn map_ffmpeg_log_level(level: &FfmpegLogLevel) -> log::Level {
    match level {
        FfmpegLogLevel::Fatal | FfmpegLogLevel::Error => log::Level::Error,
        FfmpegLogLevel::Warning => log::Level::Warn,
        FfmpegLogLevel::Info => log::Level::Info,
        _ => log::Level::Trace,
    }
}

/// Messages ffmpeg prints on stderr that do not indicate a failed extraction.
fn is_non_critical_ffmpeg_error(error: &str) -> bool {
    error.contains("deprecated pixel format")
        || error.contains("No accelerated colorspace conversion")
        || error.contains("automatically inserted filter")
        || error.contains("first frame is no keyframe")
}
