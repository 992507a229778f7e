// ============================================================================
// framescan-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with External CLI Tools
//
// This module encapsulates interactions with the ffmpeg command-line tool.
// It provides abstractions through traits and concrete implementations to
// make the external dependency testable.
//
// KEY COMPONENTS:
// - Traits for ffmpeg process interaction (FfmpegSpawner, FfmpegProcess)
// - FrameProducer and its ffmpeg-backed implementation
// - Dependency checking
//
// AI-ASSISTANT-INFO: External tool interactions and abstractions for ffmpeg

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::io;
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Event handling for extraction runs
pub mod ffmpeg_events;

/// Contains traits and implementations for executing ffmpeg commands
pub mod ffmpeg_executor;

/// Frame producer seam and the ffmpeg implementation
pub mod frame_producer;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg_executor::{FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner};
pub use frame_producer::{FfmpegFrameProducer, FrameProducer, build_extraction_command};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks that an external command is on `PATH` and answers `-version`.
///
/// # Errors
///
/// * `CoreError::DependencyNotFound` - the command is missing or exits with
///   a failure status
/// * `CoreError::CommandStart` - the command exists but failed to start
///
/// # Examples
///
/// ```rust,no_run
/// use framescan_core::external::check_dependency;
///
/// match check_dependency("ffmpeg") {
///     Ok(()) => println!("ffmpeg is available"),
///     Err(e) => eprintln!("ffmpeg check failed: {}", e),
/// }
/// ```
pub fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let status = Command::new(cmd_name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match status {
        Ok(status) if status.success() => {
            log::debug!("Found dependency: {}", cmd_name);
            Ok(())
        }
        Ok(status) => {
            log::warn!("Dependency '{}' exited with {} on -version", cmd_name, status);
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{}' not found.", cmd_name);
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{}': {}", cmd_name, e);
            Err(CoreError::CommandStart(cmd_name.to_string(), e))
        }
    }
}
