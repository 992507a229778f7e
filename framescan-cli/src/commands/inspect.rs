// ============================================================================
// framescan-cli/src/commands/inspect.rs
// ============================================================================
//
// INSPECT COMMAND: Runs the inspection pipeline over each video
//
// Arguments are turned into an InspectionConfig and an Ollama client, the
// inputs are checked up front, and each video is inspected in turn. One
// failing video does not stop the others; the tally decides the exit code.
//
// AI-ASSISTANT-INFO: Inspect command implementation

// ---- Internal crate imports ----
use crate::cli::InspectArgs;
use crate::commands::ollama_config;
use crate::error::{CliErrorContext, CliResult};
use crate::output::render_report;
use crate::progress::TerminalProgress;

// ---- External crate imports ----
use framescan_core::capability::OllamaClient;
use framescan_core::config::InspectionConfig;
use framescan_core::events::JsonProgressHandler;
use framescan_core::pipeline::InspectionPipeline;
use framescan_core::reporting::RunReport;
use framescan_core::{CoreError, check_dependency};
use log::{info, warn};

// ---- Standard library imports ----
use std::sync::Arc;

/// Exit status when at least one video could not be inspected.
pub const EXIT_FAILURE: i32 = 1;

/// Exit status for `--fail-on-findings` when something was flagged.
pub const EXIT_FINDINGS: i32 = 2;

/// Tally of the runs made by one `inspect` invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InspectStatus {
    pub runs: usize,
    pub failed: usize,
    pub with_findings: usize,
}

impl InspectStatus {
    pub fn record(&mut self, report: &RunReport) {
        self.runs += 1;
        if !report.is_success() {
            self.failed += 1;
        } else if report.has_findings() {
            self.with_findings += 1;
        }
    }

    /// Failed runs take precedence over findings.
    #[must_use]
    pub fn exit_code(&self, fail_on_findings: bool) -> i32 {
        if self.failed > 0 {
            EXIT_FAILURE
        } else if fail_on_findings && self.with_findings > 0 {
            EXIT_FINDINGS
        } else {
            0
        }
    }
}

/// Reads the instruction from the flag, the file, or falls back to the default.
pub fn resolve_instruction(args: &InspectArgs) -> CliResult<Option<String>> {
    if let Some(text) = &args.instruction {
        return Ok(Some(text.clone()));
    }
    match &args.instruction_file {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .cli_with_context(|| format!("Reading instruction file {}", path.display()))?;
            Ok(Some(text.trim().to_string()))
        }
        None => Ok(None),
    }
}

/// Builds and validates the run configuration.
pub fn build_config(args: &InspectArgs) -> CliResult<InspectionConfig> {
    let mut builder = InspectionConfig::builder()
        .sampling_rate(args.fps)
        .concurrency(args.concurrency)
        .frame_extension(args.frame_format.clone())
        .retries(args.retries);
    if let Some(dir) = &args.work_dir {
        builder = builder.work_dir(dir.clone());
    }
    if let Some(instruction) = resolve_instruction(args)? {
        builder = builder.instruction(instruction);
    }
    builder.build()
}

/// Runs the `inspect` command.
pub fn run_inspect(args: &InspectArgs, interactive: bool) -> CliResult<InspectStatus> {
    let config = build_config(args)?;
    let client = OllamaClient::new(ollama_config(&args.model, args.timeout))?;

    for video in &args.videos {
        if !video.is_file() {
            return Err(CoreError::PathError(format!(
                "Video not found: {}",
                video.display()
            )));
        }
    }
    check_dependency("ffmpeg")?;

    info!(
        "Inspecting {} video(s) with {} at {} fps, {} workers",
        args.videos.len(),
        client.config().model,
        config.sampling_rate,
        config.concurrency
    );

    let mut pipeline = InspectionPipeline::with_ffmpeg(config, Arc::new(client));
    if args.json {
        pipeline.add_event_handler(Arc::new(JsonProgressHandler::new()));
    } else if interactive {
        pipeline.add_event_handler(Arc::new(TerminalProgress::new()));
    }

    let mut status = InspectStatus::default();
    for video in &args.videos {
        let report = pipeline.run(video);
        if args.json {
            println!("{}", report.to_json());
        } else {
            print!("{}", render_report(&report));
        }
        if let Some(e) = &report.cleanup_error {
            warn!("Transient storage was not fully removed: {}", e);
        }
        status.record(&report);
    }

    if status.failed > 0 {
        warn!("{} of {} video(s) could not be inspected", status.failed, status.runs);
    }
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn inspect_args(extra: &[&str]) -> InspectArgs {
        let mut argv = vec!["framescan", "inspect", "a.mp4"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Inspect(args) => args,
            Commands::Check(_) => unreachable!(),
        }
    }

    #[test]
    fn test_exit_codes() {
        let mut status = InspectStatus::default();
        assert_eq!(status.exit_code(true), 0);

        status.with_findings = 1;
        assert_eq!(status.exit_code(false), 0);
        assert_eq!(status.exit_code(true), EXIT_FINDINGS);

        status.failed = 1;
        assert_eq!(status.exit_code(true), EXIT_FAILURE);
        assert_eq!(status.exit_code(false), EXIT_FAILURE);
    }

    #[test]
    fn test_instruction_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let prompt = dir.path().join("prompt.txt");
        std::fs::write(&prompt, "Reply Found or OK.\n").unwrap();

        let args = inspect_args(&["--instruction-file", prompt.to_str().unwrap()]);
        assert_eq!(
            resolve_instruction(&args).unwrap().as_deref(),
            Some("Reply Found or OK.")
        );
    }

    #[test]
    fn test_missing_instruction_file_is_error() {
        let args = inspect_args(&["--instruction-file", "/nonexistent/prompt.txt"]);
        let err = build_config(&args).unwrap_err();
        assert!(err.to_string().contains("Reading instruction file"));
    }

    #[test]
    fn test_build_config_applies_arguments() {
        let args = inspect_args(&["--fps", "2", "-c", "3", "--retries", "1", "--work-dir", "/tmp/fs"]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.sampling_rate, 2.0);
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.work_dir.as_deref(), Some(std::path::Path::new("/tmp/fs")));
    }

    #[test]
    fn test_invalid_fps_rejected() {
        let args = inspect_args(&["--fps", "0"]);
        assert!(matches!(build_config(&args), Err(CoreError::Configuration(_))));
    }
}
