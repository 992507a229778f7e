// ============================================================================
// framescan-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Custom Error Types for framescan-core
//
// This module defines the error types used throughout the framescan-core
// library. `CoreError` covers every failure that can end a run; the per-frame
// `CapabilityError` lives in the capability module and is normally carried as
// data inside an analysis result rather than raised.
//
// KEY COMPONENTS:
// - CoreError: Main error enum for run-level failures
// - CoreResult: Type alias for Result<T, CoreError>
// - Helper functions for creating command errors

// ---- External crate imports ----
use thiserror::Error;

// ---- Standard library imports ----
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

// ---- Internal crate imports ----
use crate::capability::CapabilityError;

/// Custom error types for framescan
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The frame producer did not produce frames for the source video.
    #[error("Frame extraction failed for {}: {status}{}", .source_path.display(), format_stderr(.stderr))]
    Extraction {
        source_path: PathBuf,
        status: ExitStatus,
        stderr: String,
    },

    /// A frame's content could not be read while fingerprinting.
    #[error("Failed to read frame {}: {source}", .path.display())]
    FrameRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Removing the transient storage failed. Reported, never escalated.
    #[error("Failed to clean up {}: {source}", .path.display())]
    Cleanup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to execute {0}: {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("Failed to wait for {0}: {1}")]
    CommandWait(String, #[source] io::Error),

    #[error("Required external command '{0}' not found or failed to execute")]
    DependencyNotFound(String),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("No frames were found in {}", .0.display())]
    NoFramesFound(PathBuf),

    #[error("Analysis capability error: {0}")]
    Capability(#[from] CapabilityError),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Result type for framescan operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

fn format_stderr(stderr: &str) -> String {
    if stderr.trim().is_empty() {
        String::new()
    } else {
        format!("\n{}", stderr.trim_end())
    }
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Creates a `CommandStart` error for a command that could not be launched.
pub fn command_start_error(cmd: impl Into<String>, error: io::Error) -> CoreError {
    CoreError::CommandStart(cmd.into(), error)
}

/// Creates a `CommandWait` error for a command whose exit could not be collected.
pub fn command_wait_error(cmd: impl Into<String>, error: io::Error) -> CoreError {
    CoreError::CommandWait(cmd.into(), error)
}
