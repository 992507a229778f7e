//! Core library for inspecting video frames with a vision model.
//!
//! A run samples frames from a video with ffmpeg, drops byte-identical
//! repeats, sends every remaining frame to an analysis capability with a
//! bounded number of requests in flight, and collects the frames the model
//! flagged. Transient frame storage is always removed before the run ends.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use framescan_core::{InspectionConfig, InspectionPipeline, OllamaClient, OllamaConfig};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let config = InspectionConfig::builder()
//!     .concurrency(5)
//!     .sampling_rate(1.0)
//!     .build()
//!     .unwrap();
//! let client = Arc::new(OllamaClient::new(OllamaConfig::default()).unwrap());
//!
//! let pipeline = InspectionPipeline::with_ffmpeg(config, client);
//! let report = pipeline.run(Path::new("/path/to/recording.mp4"));
//!
//! match report.summary() {
//!     Some(summary) => {
//!         for finding in &summary.findings {
//!             println!("{}: {}", finding.frame.name(), finding.detail);
//!         }
//!     }
//!     None => eprintln!("inspection failed: {}", report.error().unwrap()),
//! }
//! ```

pub mod aggregate;
pub mod capability;
pub mod config;
pub mod dedup;
pub mod error;
pub mod events;
pub mod external;
pub mod frames;
pub mod pipeline;
pub mod pool;
pub mod reporting;
pub mod temp_files;
pub mod utils;

// Re-exports for public API
pub use aggregate::{ErroredFrame, FlaggedFinding, InspectionSummary, Outcome, ResultAggregator, classify};
pub use capability::{AnalysisCapability, CapabilityError, Classification, OllamaClient};
pub use config::{InspectionConfig, InspectionConfigBuilder, OllamaConfig, RetryPolicy};
pub use dedup::{Fingerprint, dedupe, fingerprint_file};
pub use error::{CoreError, CoreResult};
pub use external::{FfmpegFrameProducer, FrameProducer, check_dependency};
pub use frames::{Frame, discover_frames};
pub use pipeline::{InspectionPipeline, PipelineStage};
pub use pool::{AnalysisResult, AnalysisStatus, AnalysisStream, TaskId, analyze};
pub use reporting::RunReport;
pub use temp_files::{FsCleaner, StorageCleaner, create_transient_dir};
pub use utils::format_duration;
