// ============================================================================
// framescan-core/src/pipeline.rs
// ============================================================================
//
// PIPELINE ORCHESTRATOR: End-to-End Inspection of One Video
//
// Drives a run through its stages:
//
//   Idle -> Extracting -> Deduplicating -> Analyzing -> Reporting
//        -> CleaningUp -> Done
//
// Transient storage is created when extraction starts and removed exactly
// once in CleaningUp, whatever happened in between. A cleanup failure is
// recorded next to the run's outcome and never replaces an earlier error.
//
// KEY COMPONENTS:
// - PipelineStage: The run state machine
// - InspectionPipeline: Holds the configuration and collaborators; `run`
//   inspects one source and returns a RunReport
//
// AI-ASSISTANT-INFO: Orchestration of extract, dedup, analyze, aggregate, cleanup

// ---- Internal crate imports ----
use crate::aggregate::{InspectionSummary, ResultAggregator};
use crate::capability::AnalysisCapability;
use crate::config::InspectionConfig;
use crate::dedup::dedupe;
use crate::error::{CoreError, CoreResult};
use crate::events::{Event, EventDispatcher, EventHandler};
use crate::external::{FfmpegFrameProducer, FrameProducer};
use crate::frames::discover_frames;
use crate::pool::{analyze, panic_message};
use crate::reporting::RunReport;
use crate::temp_files::{FsCleaner, StorageCleaner, create_transient_dir};

// ---- External crate imports ----
use chrono::Utc;
use log::{debug, error, info, warn};
use serde::Serialize;

// ---- Standard library imports ----
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

// ============================================================================
// STAGES
// ============================================================================

/// Where a run is, or where it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Idle,
    Extracting,
    Deduplicating,
    Analyzing,
    Reporting,
    CleaningUp,
    Done,
}

impl PipelineStage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineStage::Idle => "idle",
            PipelineStage::Extracting => "extracting",
            PipelineStage::Deduplicating => "deduplicating",
            PipelineStage::Analyzing => "analyzing",
            PipelineStage::Reporting => "reporting",
            PipelineStage::CleaningUp => "cleaning_up",
            PipelineStage::Done => "done",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Inspects videos for anomalies with a vision model.
///
/// All run settings come from the `InspectionConfig` given at construction;
/// each call to [`run`](Self::run) builds its own storage, worker pool and
/// aggregator, so one pipeline can inspect any number of sources in turn.
///
/// # Examples
///
/// ```rust,no_run
/// use framescan_core::capability::OllamaClient;
/// use framescan_core::config::{InspectionConfig, OllamaConfig};
/// use framescan_core::pipeline::InspectionPipeline;
/// use std::path::Path;
/// use std::sync::Arc;
///
/// let capability = Arc::new(OllamaClient::new(OllamaConfig::default()).unwrap());
/// let pipeline = InspectionPipeline::with_ffmpeg(InspectionConfig::default(), capability);
///
/// let report = pipeline.run(Path::new("recording.mp4"));
/// for finding in report.summary().map(|s| s.findings.as_slice()).unwrap_or_default() {
///     println!("{}: {}", finding.frame.name(), finding.detail);
/// }
/// ```
pub struct InspectionPipeline<P: FrameProducer, K: StorageCleaner = FsCleaner> {
    config: InspectionConfig,
    producer: P,
    capability: Arc<dyn AnalysisCapability>,
    cleaner: K,
    events: EventDispatcher,
}

impl InspectionPipeline<FfmpegFrameProducer> {
    /// Pipeline extracting frames with ffmpeg in the configured image format.
    pub fn with_ffmpeg(config: InspectionConfig, capability: Arc<dyn AnalysisCapability>) -> Self {
        let producer = FfmpegFrameProducer::new().extension(config.frame_extension.clone());
        Self::new(config, producer, capability)
    }
}

impl<P: FrameProducer> InspectionPipeline<P> {
    pub fn new(config: InspectionConfig, producer: P, capability: Arc<dyn AnalysisCapability>) -> Self {
        Self {
            config,
            producer,
            capability,
            cleaner: FsCleaner,
            events: EventDispatcher::new(),
        }
    }
}

impl<P: FrameProducer, K: StorageCleaner> InspectionPipeline<P, K> {
    /// Replaces the storage cleaner.
    pub fn with_cleaner<C: StorageCleaner>(self, cleaner: C) -> InspectionPipeline<P, C> {
        InspectionPipeline {
            config: self.config,
            producer: self.producer,
            capability: self.capability,
            cleaner,
            events: self.events,
        }
    }

    /// Registers a handler for run events.
    pub fn add_event_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.events.add_handler(handler);
    }

    #[must_use]
    pub fn config(&self) -> &InspectionConfig {
        &self.config
    }

    /// Inspects `source` and reports the outcome.
    ///
    /// Every failure ends up in `RunReport::outcome`, and once transient
    /// storage exists it is removed before this returns.
    pub fn run(&self, source: &Path) -> RunReport {
        let started_at = Utc::now();
        let mut stage = PipelineStage::Idle;
        info!("Inspecting {}", source.display());
        self.events.emit(Event::RunStarted {
            source: source.display().to_string(),
        });

        if let Err(e) = self.config.validate() {
            return self.finish(source, started_at, None, Err(e), stage, None);
        }

        self.enter(&mut stage, PipelineStage::Extracting);
        let storage = match create_transient_dir(&self.config.storage_base()) {
            Ok(storage) => storage,
            Err(e) => return self.finish(source, started_at, None, Err(e), stage, None),
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.inspect(source, &storage, &mut stage)
        }))
        .unwrap_or_else(|payload| {
            Err(CoreError::OperationFailed(format!(
                "inspection panicked: {}",
                panic_message(payload.as_ref())
            )))
        });
        let failed_stage = stage;

        self.enter(&mut stage, PipelineStage::CleaningUp);
        let cleanup_error = match self.cleaner.remove_all(&storage) {
            Ok(()) => {
                debug!("Removed transient storage {}", storage.display());
                None
            }
            Err(e) => {
                warn!("{}", e);
                self.events.emit(Event::Warning {
                    message: e.to_string(),
                });
                Some(e)
            }
        };
        self.enter(&mut stage, PipelineStage::Done);

        self.finish(
            source,
            started_at,
            Some(storage),
            outcome,
            failed_stage,
            cleanup_error,
        )
    }

    fn inspect(
        &self,
        source: &Path,
        storage: &Path,
        stage: &mut PipelineStage,
    ) -> CoreResult<InspectionSummary> {
        self.producer
            .extract(source, storage, self.config.sampling_rate)?;
        let frames = discover_frames(storage, self.producer.frame_extension())?;
        let extracted = frames.len();
        info!("Extracted {} frames", extracted);
        self.events.emit(Event::FramesExtracted { count: extracted });

        self.enter(stage, PipelineStage::Deduplicating);
        let unique = dedupe(frames)?;
        let removed = extracted - unique.len();
        self.events.emit(Event::DeduplicationComplete {
            kept: unique.len(),
            removed,
        });

        self.enter(stage, PipelineStage::Analyzing);
        let total = unique.len();
        self.events.emit(Event::AnalysisStarted {
            total,
            concurrency: self.config.concurrency,
        });
        let results = analyze(
            unique,
            &self.config.instruction,
            self.config.concurrency,
            Arc::clone(&self.capability),
            self.config.retry,
        )?;

        let mut aggregator = ResultAggregator::new();
        for result in results {
            let frame = result.frame.name();
            let ordinal = result.frame.ordinal;
            let outcome = aggregator.record(result);
            self.events.emit(Event::FrameAnalyzed {
                completed: aggregator.analyzed(),
                total,
                frame,
                ordinal,
                outcome,
            });
        }

        self.enter(stage, PipelineStage::Reporting);
        Ok(aggregator.finish(extracted, removed))
    }

    fn enter(&self, stage: &mut PipelineStage, next: PipelineStage) {
        debug!("Stage {} -> {}", stage, next);
        *stage = next;
        self.events.emit(Event::StageChanged { stage: next });
    }

    fn finish(
        &self,
        source: &Path,
        started_at: chrono::DateTime<Utc>,
        storage: Option<std::path::PathBuf>,
        outcome: CoreResult<InspectionSummary>,
        stage: PipelineStage,
        cleanup_error: Option<CoreError>,
    ) -> RunReport {
        let report = RunReport {
            source: source.to_path_buf(),
            storage,
            sampling_rate: self.config.sampling_rate,
            started_at,
            finished_at: Utc::now(),
            failed_stage: outcome.is_err().then_some(stage),
            outcome,
            cleanup_error,
        };

        match &report.outcome {
            Ok(summary) => {
                info!(
                    "Inspection of {} finished: {} findings, {} errored frames",
                    source.display(),
                    summary.findings.len(),
                    summary.errored.len()
                );
                self.events.emit(Event::RunComplete {
                    source: source.display().to_string(),
                    findings: summary.findings.len(),
                    errored: summary.errored.len(),
                    duration: report.duration(),
                });
            }
            Err(e) => {
                error!("Inspection of {} failed during {}: {}", source.display(), stage, e);
                self.events.emit(Event::Error {
                    title: "Inspection failed".to_string(),
                    message: e.to_string(),
                    stage,
                });
            }
        }
        report
    }
}
