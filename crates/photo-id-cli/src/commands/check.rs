//! Check command - evaluate images against a photo standard.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::{Args, ValueEnum};
use photo_id_adapters::{load_sidecar, FsImageSource, JsonFaceDetector};
use photo_id_core::detection::{DetectorKind, DetectorOutput};
use photo_id_core::{
    standard_by_id, CropAdjustment, GenerationCounter, ImageInfo, ImageSource, Outcome,
    PhotoStandard, Pipeline, PipelineConfig, PipelineReport, ProgressEvent, ProgressSink,
    ResultOutput, RunRequest,
};
use tracing::{debug, info, warn};

use super::{iso_timestamp, ExitCode};
use crate::config::AppConfig;
use crate::output::{JsonOutput, ProgressBar};

/// Standard used when neither the CLI nor the config names one.
pub const DEFAULT_STANDARD: &str = "us-passport";

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// JSON Lines (one JSON object per line)
    #[default]
    Jsonl,
    /// Single JSON array
    Json,
}

/// Parse a standard identifier, rejecting unknown ones.
pub fn parse_standard(s: &str) -> Result<String, String> {
    standard_by_id(s)
        .map(|standard| standard.id.to_string())
        .ok_or_else(|| format!("unknown standard '{s}' (see `photo-id standards`)"))
}

/// Shared arguments for image checks.
#[derive(Args, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct CheckArgs {
    /// Files or directories to check
    pub paths: Vec<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Photo standard identifier (default: us-passport)
    #[arg(short, long, value_parser = parse_standard)]
    pub standard: Option<String>,

    /// Detector payload applied to every image (otherwise `<stem>.faces.json` sidecars are used)
    #[arg(long, value_name = "FILE")]
    pub faces: Option<PathBuf>,

    /// Detector backend that produced the payloads
    #[arg(long, default_value_t = DetectorKind::Landmark)]
    pub detector: DetectorKind,

    /// Images already had their background replaced
    #[arg(long)]
    pub bg_removed: bool,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output (only affects --format json)
    #[arg(long)]
    pub pretty: bool,

    /// Merged config (populated by `with_config`, not from CLI).
    #[arg(skip)]
    config: Option<AppConfig>,
}

impl CheckArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        if !args.recursive {
            args.recursive = config.general.recursive.unwrap_or(false);
        }

        if args.standard.is_none() {
            args.standard.clone_from(&config.general.standard);
        }

        if args.format.is_none() {
            args.format = config
                .output
                .format
                .as_ref()
                .and_then(|s| match s.as_str() {
                    "json" => Some(OutputFormat::Json),
                    "jsonl" => Some(OutputFormat::Jsonl),
                    _ => None,
                });
        }

        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }

        args.config = Some(config.clone());

        args
    }

    /// Resolve the standard with fallback to the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier is unknown.
    pub fn standard(&self) -> Result<&'static PhotoStandard> {
        resolve_standard(self.standard.as_deref())
    }

    /// Get output format with fallback to JSONL.
    fn format(&self) -> OutputFormat {
        self.format.unwrap_or(OutputFormat::Jsonl)
    }
}

/// Looks up `id`, falling back to [`DEFAULT_STANDARD`].
///
/// # Errors
///
/// Returns an error if the identifier is unknown.
pub fn resolve_standard(id: Option<&str>) -> Result<&'static PhotoStandard> {
    let id = id.unwrap_or(DEFAULT_STANDARD);
    standard_by_id(id).ok_or_else(|| anyhow!("unknown standard '{id}'"))
}

/// Build the pipeline configuration from merged file settings.
#[must_use]
pub fn pipeline_config(config: Option<&AppConfig>) -> PipelineConfig {
    let mut pipeline = PipelineConfig::default();
    let Some(config) = config else {
        return pipeline;
    };

    if let Some(t) = config.background.accept_threshold {
        pipeline.background.accept_threshold = t;
    }
    if let Some(t) = config.compliance.range_tolerance {
        pipeline.compliance.range_tolerance = t;
    }
    if let Some(t) = config.compliance.centering_warn {
        pipeline.compliance.centering_warn = t;
    }
    if let Some(t) = config.compliance.centering_fail {
        pipeline.compliance.centering_fail = t;
    }
    if let Some(enabled) = config.moderation.enabled {
        pipeline.moderation.enabled = enabled;
    }
    if let Some(t) = config.moderation.block_threshold {
        pipeline.moderation.block_threshold = t;
    }
    if let Some(t) = config.moderation.warn_threshold {
        pipeline.moderation.warn_threshold = t;
    }

    pipeline
}

/// Face detection input for a run: an explicit payload file or per-image sidecars.
pub struct FaceSource {
    kind: DetectorKind,
    explicit: bool,
}

impl FaceSource {
    /// Attaches the explicit payload to `pipeline` when one was given.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload file cannot be read.
    pub fn attach(
        faces: Option<&Path>,
        kind: DetectorKind,
        pipeline: Pipeline,
    ) -> Result<(Self, Pipeline)> {
        match faces {
            Some(path) => {
                debug!("Using detector payload {}", path.display());
                let detector = JsonFaceDetector::from_file(kind, path)?;
                Ok((
                    Self {
                        kind,
                        explicit: true,
                    },
                    pipeline.with_detector(Box::new(detector)),
                ))
            }
            None => Ok((
                Self {
                    kind,
                    explicit: false,
                },
                pipeline,
            )),
        }
    }

    /// Sidecar hint for `image`, if sidecars are in use and one exists.
    #[must_use]
    pub fn hint_for(&self, image: &ImageInfo) -> Option<DetectorOutput> {
        if self.explicit {
            return None;
        }
        match load_sidecar(Path::new(&image.path), self.kind, image.width(), image.height()) {
            Ok(hint) => hint,
            Err(e) => {
                warn!("{e:#}");
                None
            }
        }
    }
}

/// Result of running the check command.
#[allow(dead_code)] // Fields exposed for programmatic use
pub struct CheckResult {
    /// Number of images processed.
    pub processed: usize,
    /// Number of images skipped.
    pub skipped: usize,
    /// Number of images not ready to print.
    pub with_issues: usize,
    /// Number of images blocked by moderation.
    pub blocked: usize,
    /// Exit code.
    pub exit_code: ExitCode,
}

/// Run the check command.
///
/// Expects `args` to have been processed through `with_config()` first
/// to apply configuration file settings.
pub fn run(args: &CheckArgs) -> Result<CheckResult> {
    info!("Running check command on {} paths", args.paths.len());

    if args.paths.is_empty() {
        anyhow::bail!("No paths specified");
    }

    let standard = args.standard()?;
    let pipeline = Pipeline::new(pipeline_config(args.config.as_ref()));
    let (faces, pipeline) = FaceSource::attach(args.faces.as_deref(), args.detector, pipeline)?;

    let source = FsImageSource::new(args.paths.clone(), args.recursive);
    let total = source.count_hint();

    let show_progress = !args.quiet && (args.progress || std::io::stderr().is_terminal());
    let progress_bar = ProgressBar::new(total.map(|t| t as u64), args.quiet, show_progress);

    let output = JsonOutput::stdout();

    process_images(
        &source,
        &pipeline,
        &faces,
        standard,
        &output,
        &progress_bar,
        args,
    )
}

/// Run every image through the pipeline and emit its report.
fn process_images(
    source: &FsImageSource,
    pipeline: &Pipeline,
    faces: &FaceSource,
    standard: &PhotoStandard,
    output: &JsonOutput,
    progress: &ProgressBar,
    args: &CheckArgs,
) -> Result<CheckResult> {
    let total = source.count_hint();
    let counter = GenerationCounter::new();
    let mut processed = 0usize;
    let mut skipped = 0usize;
    let mut with_issues = 0usize;
    let mut blocked = 0usize;
    let mut all_reports: Vec<PipelineReport> = Vec::new();

    for (index, image_result) in source.images().enumerate() {
        let image = match image_result {
            Ok(img) => img,
            Err(e) => {
                progress.on_event(ProgressEvent::Skipped {
                    path: format!("image {index}"),
                    reason: format!("{e:#}"),
                });
                skipped += 1;
                continue;
            }
        };

        progress.on_event(ProgressEvent::Started {
            path: image.path.clone(),
            index,
            total,
        });

        let hint = faces.hint_for(&image);
        let request = RunRequest {
            standard,
            adjustment: CropAdjustment::default(),
            bg_removed: args.bg_removed,
            detection: hint.as_ref(),
            generation: counter.next(),
            timestamp: iso_timestamp(),
        };
        let report = pipeline.run(&image, &request);

        match report.outcome {
            Outcome::Ready => {}
            Outcome::NeedsAttention => with_issues += 1,
            Outcome::Blocked => {
                with_issues += 1;
                blocked += 1;
            }
        }

        progress.on_event(ProgressEvent::Completed {
            report: Box::new(report.clone()),
        });

        match args.format() {
            OutputFormat::Jsonl => {
                output.write(&report)?;
            }
            OutputFormat::Json => {
                all_reports.push(report);
            }
        }

        processed += 1;
    }

    if matches!(args.format(), OutputFormat::Json) {
        output.write_array(&all_reports, args.pretty)?;
    }

    output.flush()?;

    progress.on_event(ProgressEvent::Finished { processed, skipped });

    let exit_code = if blocked > 0 {
        ExitCode::Blocked
    } else if with_issues > 0 {
        ExitCode::IssuesFound
    } else {
        ExitCode::Success
    };

    Ok(CheckResult {
        processed,
        skipped,
        with_issues,
        blocked,
        exit_code,
    })
}
