//! Configuration structures and constants for the framescan-core library.
//!
//! A run is described entirely by an [`InspectionConfig`] handed to the
//! pipeline at construction time, and the model client by an
//! [`OllamaConfig`]. Nothing is read from process-wide state, so one process
//! can run any number of inspections with different settings.

mod builder;

use crate::error::{CoreError, CoreResult};

use std::path::PathBuf;
use std::time::Duration;

pub use builder::InspectionConfigBuilder;

// Default constants

/// Default number of frames sampled per second of video.
pub const DEFAULT_SAMPLING_RATE: f64 = 1.0;

/// Default number of analysis calls in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Image format written by the frame producer.
pub const DEFAULT_FRAME_EXTENSION: &str = "png";

/// Prefix of the per-run transient storage directory.
pub const TRANSIENT_DIR_PREFIX: &str = "framescan_";

/// Default Ollama server address.
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";

/// Default vision model.
pub const DEFAULT_MODEL: &str = "llama3.2-vision";

/// Instruction used when none is configured. Asks the model to answer with a
/// first line of "Found" or "OK", which is what result classification keys on.
pub const DEFAULT_INSTRUCTION: &str = "\
[Role]You are a QA.
[Task]Your task is checking the screen shots generated by an automation tool.
If you find something unusual, something could be a bug, tell me what you found.
[Important]structure your output:
First line must be \"Found\" if you found something, then new line, then with detail about what you found;
or first line must be \"OK\", if nothing found, then no need to explain.
";

/// How often a failed capability call is attempted before the frame is
/// reported as failed. Only transient failures are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
}

impl RetryPolicy {
    /// One attempt per frame.
    pub const NONE: RetryPolicy = RetryPolicy { max_attempts: 1 };

    /// Allows `retries` additional attempts after the first.
    #[must_use]
    pub fn with_retries(retries: u32) -> Self {
        Self {
            max_attempts: retries.saturating_add(1),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::NONE
    }
}

/// Settings for one inspection run.
///
/// # Examples
///
/// ```rust
/// use framescan_core::config::InspectionConfig;
///
/// let mut config = InspectionConfig::default();
/// config.concurrency = 8;
/// config.sampling_rate = 2.0;
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct InspectionConfig {
    /// Base directory for transient frame storage (defaults to the system
    /// temporary directory). Each run creates a fresh directory inside it.
    pub work_dir: Option<PathBuf>,

    /// Frames sampled per second of source video
    pub sampling_rate: f64,

    /// Maximum number of analysis calls in flight
    pub concurrency: usize,

    /// Instruction sent to the capability with every frame
    pub instruction: String,

    /// Extension (and therefore image format) of extracted frames
    pub frame_extension: String,

    /// Retry behaviour for failed capability calls
    pub retry: RetryPolicy,
}

impl Default for InspectionConfig {
    fn default() -> Self {
        Self {
            work_dir: None,
            sampling_rate: DEFAULT_SAMPLING_RATE,
            concurrency: DEFAULT_CONCURRENCY,
            instruction: DEFAULT_INSTRUCTION.to_string(),
            frame_extension: DEFAULT_FRAME_EXTENSION.to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

impl InspectionConfig {
    /// Returns a builder starting from the defaults.
    #[must_use]
    pub fn builder() -> InspectionConfigBuilder {
        InspectionConfigBuilder::new()
    }

    /// Base directory in which transient storage is created.
    #[must_use]
    pub fn storage_base(&self) -> PathBuf {
        self.work_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Checks every setting, failing with `CoreError::Configuration` on the
    /// first invalid one.
    pub fn validate(&self) -> CoreResult<()> {
        validate_concurrency(self.concurrency)?;

        if !(self.sampling_rate.is_finite() && self.sampling_rate > 0.0) {
            return Err(CoreError::Configuration(format!(
                "sampling rate must be a positive number of frames per second, got {}",
                self.sampling_rate
            )));
        }

        if self.instruction.trim().is_empty() {
            return Err(CoreError::Configuration(
                "instruction must not be empty".to_string(),
            ));
        }

        if self.frame_extension.is_empty()
            || !self.frame_extension.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(CoreError::Configuration(format!(
                "invalid frame extension '{}'",
                self.frame_extension
            )));
        }

        if self.retry.max_attempts == 0 {
            return Err(CoreError::Configuration(
                "retry policy must allow at least one attempt".to_string(),
            ));
        }

        Ok(())
    }
}

/// Checks a worker pool size.
pub fn validate_concurrency(concurrency: usize) -> CoreResult<()> {
    if concurrency == 0 {
        return Err(CoreError::Configuration(
            "concurrency must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Settings for the Ollama model client.
#[derive(Debug, Clone, PartialEq)]
pub struct OllamaConfig {
    /// Server address, e.g. `http://localhost:11434`
    pub host: String,

    /// Vision model name
    pub model: String,

    /// Per-request timeout. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_OLLAMA_HOST.to_string(),
            model: DEFAULT_MODEL.to_string(),
            request_timeout: None,
        }
    }
}

impl OllamaConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.host.starts_with("http://") || self.host.starts_with("https://")) {
            return Err(CoreError::Configuration(format!(
                "Ollama host must be an http(s) URL, got '{}'",
                self.host
            )));
        }
        if self.model.trim().is_empty() {
            return Err(CoreError::Configuration(
                "model name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(InspectionConfig::default().validate().is_ok());
        assert!(OllamaConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let config = InspectionConfig {
            concurrency: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::Configuration(_))));
    }

    #[test]
    fn test_invalid_sampling_rate_rejected() {
        for rate in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = InspectionConfig {
                sampling_rate: rate,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "rate {rate} should be rejected");
        }
    }

    #[test]
    fn test_invalid_extension_rejected() {
        let config = InspectionConfig {
            frame_extension: "../png".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_retry_policy() {
        assert_eq!(RetryPolicy::default().max_attempts, 1);
        assert_eq!(RetryPolicy::with_retries(2).max_attempts, 3);
        let config = InspectionConfig {
            retry: RetryPolicy { max_attempts: 0 },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ollama_host_must_be_url() {
        let config = OllamaConfig {
            host: "localhost:11434".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_instruction_asks_for_found_or_ok() {
        assert!(DEFAULT_INSTRUCTION.contains("\"Found\""));
        assert!(DEFAULT_INSTRUCTION.contains("\"OK\""));
    }
}
