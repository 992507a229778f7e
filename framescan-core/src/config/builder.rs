// ============================================================================
// framescan-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for InspectionConfig
//
// This module implements the builder pattern for the InspectionConfig
// structure, providing a fluent API that starts from the defaults and
// validates the result on `build`.

// ---- Standard library imports ----
use std::path::PathBuf;

// ---- Internal crate imports ----
use super::{InspectionConfig, RetryPolicy};
use crate::error::CoreResult;

/// Builder for creating InspectionConfig instances.
///
/// # Examples
///
/// ```rust
/// use framescan_core::config::InspectionConfigBuilder;
///
/// let config = InspectionConfigBuilder::new()
///     .concurrency(4)
///     .sampling_rate(0.5)
///     .instruction("Answer \"Found\" if the screenshot shows an error dialog, otherwise \"OK\".")
///     .retries(2)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.concurrency, 4);
/// assert_eq!(config.retry.max_attempts, 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InspectionConfigBuilder {
    config: InspectionConfig,
}

impl InspectionConfigBuilder {
    /// Creates a new builder holding the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base directory for transient frame storage.
    pub fn work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.config.work_dir = Some(work_dir.into());
        self
    }

    /// Sets the number of frames sampled per second of video.
    pub fn sampling_rate(mut self, frames_per_second: f64) -> Self {
        self.config.sampling_rate = frames_per_second;
        self
    }

    /// Sets the maximum number of analysis calls in flight.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency;
        self
    }

    /// Sets the instruction sent with every frame.
    pub fn instruction(mut self, instruction: impl Into<String>) -> Self {
        self.config.instruction = instruction.into();
        self
    }

    /// Sets the extension of extracted frames ("png", "jpg", ...).
    pub fn frame_extension(mut self, extension: impl Into<String>) -> Self {
        self.config.frame_extension = extension.into();
        self
    }

    /// Allows `retries` extra attempts for transient capability failures.
    pub fn retries(mut self, retries: u32) -> Self {
        self.config.retry = RetryPolicy::with_retries(retries);
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> CoreResult<InspectionConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn test_builder_overrides_defaults() {
        let config = InspectionConfigBuilder::new()
            .work_dir("/var/tmp/framescan")
            .sampling_rate(2.0)
            .concurrency(3)
            .frame_extension("jpg")
            .build()
            .unwrap();

        assert_eq!(config.work_dir, Some(PathBuf::from("/var/tmp/framescan")));
        assert_eq!(config.sampling_rate, 2.0);
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.frame_extension, "jpg");
        assert_eq!(config.retry, RetryPolicy::NONE);
    }

    #[test]
    fn test_builder_validates() {
        let result = InspectionConfigBuilder::new().concurrency(0).build();
        assert!(matches!(result, Err(CoreError::Configuration(_))));
    }
}
