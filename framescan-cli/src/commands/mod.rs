//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// `inspect`: runs the pipeline over each video and prints its report.
pub mod inspect;

/// `check`: verifies ffmpeg and the model server.
pub mod check;

use crate::cli::ModelArgs;
use framescan_core::config::OllamaConfig;
use std::time::Duration;

/// Prefixes a scheme when the host is given as `host:port`, the way
/// `OLLAMA_HOST` is often set.
#[must_use]
pub fn normalize_host(host: &str) -> String {
    let host = host.trim();
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}

/// Builds the model client settings from the CLI arguments.
#[must_use]
pub fn ollama_config(args: &ModelArgs, timeout_secs: Option<u64>) -> OllamaConfig {
    OllamaConfig {
        host: normalize_host(&args.host),
        model: args.model.trim().to_string(),
        request_timeout: timeout_secs.map(Duration::from_secs),
    }
}
