// ============================================================================
// framescan-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Context for core errors
//
// The CLI reports failures through framescan-core's CoreError. Errors raised
// while handling CLI input (an unreadable instruction file, a failed check)
// get a prefix naming what the CLI was doing.
//
// KEY COMPONENTS:
// - CliResult: Type alias for CLI operations
// - CliErrorContext: lazy context for fallible results
// - cli_error!: formatted OperationFailed errors
//
// AI-ASSISTANT-INFO: CLI error handling utilities

// ---- Internal crate imports ----
use framescan_core::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::fmt;

/// Type alias for CLI results using CoreError.
pub type CliResult<T> = CoreResult<T>;

/// Extension trait that prefixes an error with what the CLI was doing.
pub trait CliErrorContext<T> {
    /// The context is only built when the result is an error.
    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C;
}

impl<T, E> CliErrorContext<T> for Result<T, E>
where
    E: Into<CoreError>,
{
    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| {
            let core_error: CoreError = e.into();
            CoreError::OperationFailed(format!("{}: {}", f(), core_error))
        })
    }
}

/// Creates a CoreError::OperationFailed with a formatted message.
#[macro_export]
macro_rules! cli_error {
    ($($arg:tt)*) => {
        $crate::framescan_core::CoreError::OperationFailed(format!($($arg)*))
    };
}
