// framescan-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand};
use framescan_core::config::{
    DEFAULT_CONCURRENCY, DEFAULT_FRAME_EXTENSION, DEFAULT_MODEL, DEFAULT_OLLAMA_HOST,
    DEFAULT_SAMPLING_RATE,
};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Framescan: find visual anomalies in screen recordings",
    long_about = "Samples frames from videos with ffmpeg, drops identical frames, and asks a \
                  vision model served by Ollama to flag anything unusual."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspects one or more videos and reports flagged frames
    Inspect(InspectArgs),
    /// Checks that ffmpeg is installed and the model server is reachable
    Check(ModelArgs),
}

/// Where to find the vision model.
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// Ollama server address
    #[arg(long, value_name = "URL", env = "OLLAMA_HOST", default_value = DEFAULT_OLLAMA_HOST)]
    pub host: String,

    /// Vision model used for analysis
    #[arg(short, long, value_name = "MODEL", env = "FRAMESCAN_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Video files to inspect
    #[arg(required = true, value_name = "VIDEO")]
    pub videos: Vec<PathBuf>,

    /// Maximum number of frames analyzed at the same time
    #[arg(short, long, value_name = "N", default_value_t = DEFAULT_CONCURRENCY, value_parser = parse_concurrency)]
    pub concurrency: usize,

    /// Frames sampled per second of video
    #[arg(long = "fps", value_name = "RATE", default_value_t = DEFAULT_SAMPLING_RATE)]
    pub fps: f64,

    /// Base directory for extracted frames (defaults to the system temp dir)
    #[arg(long, value_name = "DIR", env = "FRAMESCAN_WORK_DIR")]
    pub work_dir: Option<PathBuf>,

    /// Image format of extracted frames
    #[arg(long, value_name = "EXT", default_value = DEFAULT_FRAME_EXTENSION)]
    pub frame_format: String,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Instruction sent with every frame (defaults to the built-in QA prompt)
    #[arg(long, value_name = "TEXT", conflicts_with = "instruction_file")]
    pub instruction: Option<String>,

    /// Read the instruction from a file
    #[arg(long, value_name = "FILE")]
    pub instruction_file: Option<PathBuf>,

    /// Extra attempts for frames whose analysis failed transiently
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub retries: u32,

    /// Per-request timeout for the model server, in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Print reports and progress as JSON lines
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Exit with status 2 when any frame was flagged
    #[arg(long, default_value_t = false)]
    pub fail_on_findings: bool,
}

fn parse_concurrency(value: &str) -> Result<usize, String> {
    let parsed: usize = value
        .parse()
        .map_err(|_| format!("'{value}' is not a whole number"))?;
    if parsed == 0 {
        return Err("concurrency must be at least 1".to_string());
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inspect_defaults() {
        let cli = Cli::parse_from(["framescan", "inspect", "session.mp4"]);
        match cli.command {
            Commands::Inspect(args) => {
                assert_eq!(args.videos, vec![PathBuf::from("session.mp4")]);
                assert_eq!(args.concurrency, DEFAULT_CONCURRENCY);
                assert_eq!(args.fps, DEFAULT_SAMPLING_RATE);
                assert_eq!(args.frame_format, "png");
                assert_eq!(args.retries, 0);
                assert!(args.instruction.is_none());
                assert!(!args.json);
                assert!(!args.fail_on_findings);
            }
            Commands::Check(_) => panic!("expected inspect"),
        }
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_inspect_with_options() {
        let cli = Cli::parse_from([
            "framescan",
            "-v",
            "inspect",
            "a.mp4",
            "b.mp4",
            "--concurrency",
            "8",
            "--fps",
            "0.5",
            "--model",
            "llava",
            "--host",
            "http://gpu:11434",
            "--instruction",
            "Answer Found or OK",
            "--retries",
            "2",
            "--json",
            "--fail-on-findings",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Inspect(args) => {
                assert_eq!(args.videos.len(), 2);
                assert_eq!(args.concurrency, 8);
                assert_eq!(args.fps, 0.5);
                assert_eq!(args.model.model, "llava");
                assert_eq!(args.model.host, "http://gpu:11434");
                assert_eq!(args.instruction.as_deref(), Some("Answer Found or OK"));
                assert_eq!(args.retries, 2);
                assert!(args.json);
                assert!(args.fail_on_findings);
            }
            Commands::Check(_) => panic!("expected inspect"),
        }
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let result = Cli::try_parse_from(["framescan", "inspect", "a.mp4", "--concurrency", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_instruction_sources_conflict() {
        let result = Cli::try_parse_from([
            "framescan",
            "inspect",
            "a.mp4",
            "--instruction",
            "x",
            "--instruction-file",
            "prompt.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_check() {
        let cli = Cli::parse_from(["framescan", "check", "--model", "llava:13b"]);
        match cli.command {
            Commands::Check(args) => assert_eq!(args.model, "llava:13b"),
            Commands::Inspect(_) => panic!("expected check"),
        }
    }
}
