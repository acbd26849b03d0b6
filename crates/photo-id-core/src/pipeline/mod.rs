//! End-to-end processing of one image against one standard.
//!
//! Detection and content classification are the only calls into external
//! services. Every other stage is a pure function of its inputs.

mod generation;
mod session;

use tracing::{debug, info, warn};

pub use generation::{GenerationCounter, GenerationToken};
pub use session::{PhotoSession, SessionState, Submission};

use crate::analysis::{MetricAnalyzer, MetricsConfig};
use crate::background::{BackgroundAnalyzer, BackgroundConfig};
use crate::compliance::{ComplianceConfig, ComplianceEngine};
use crate::detection::DetectorOutput;
use crate::domain::{
    CropAdjustment, FaceRegion, ImageDimensions, ImageInfo, Outcome, PhotoStandard,
    PipelineReport,
};
use crate::layout::{calculate_crop, CropConfig};
use crate::moderation::{ModerationConfig, ModerationGate};
use crate::ports::{ContentClassifier, FaceDetector};
use crate::retake::suggest_retake;

/// Settings for every stage.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Metric analyzer.
    pub metrics: MetricsConfig,
    /// Background scoring.
    pub background: BackgroundConfig,
    /// Compliance thresholds.
    pub compliance: ComplianceConfig,
    /// Moderation thresholds.
    pub moderation: ModerationConfig,
    /// Crop placement.
    pub crop: CropConfig,
}

/// Per-run inputs besides the image.
#[derive(Debug, Clone)]
pub struct RunRequest<'a> {
    /// Standard to evaluate against.
    pub standard: &'a PhotoStandard,
    /// User framing adjustments.
    pub adjustment: CropAdjustment,
    /// Whether the background has already been replaced.
    pub bg_removed: bool,
    /// Precomputed detector result. When set, the detector port is not called.
    pub detection: Option<&'a DetectorOutput>,
    /// Generation the run belongs to.
    pub generation: GenerationToken,
    /// Timestamp recorded in the report.
    pub timestamp: String,
}

/// Runs detection, moderation, analysis, crop and compliance.
pub struct Pipeline {
    metrics: MetricAnalyzer,
    background: BackgroundAnalyzer,
    compliance: ComplianceEngine,
    moderation: ModerationGate,
    crop: CropConfig,
    detector: Option<Box<dyn FaceDetector>>,
    classifier: Option<Box<dyn ContentClassifier>>,
}

impl Pipeline {
    /// Creates a pipeline with no external services attached.
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            metrics: MetricAnalyzer::new(config.metrics),
            background: BackgroundAnalyzer::new(config.background),
            compliance: ComplianceEngine::new(config.compliance),
            moderation: ModerationGate::new(config.moderation),
            crop: config.crop,
            detector: None,
            classifier: None,
        }
    }

    /// Attaches a face detector.
    #[must_use]
    pub fn with_detector(mut self, detector: Box<dyn FaceDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Attaches a content classifier.
    #[must_use]
    pub fn with_classifier(mut self, classifier: Box<dyn ContentClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Processes `image` unconditionally.
    #[must_use]
    pub fn run(&self, image: &ImageInfo, request: &RunRequest<'_>) -> PipelineReport {
        let face = self.detect(image, request.detection);
        self.evaluate(image, request, &face)
    }

    /// Processes `image` unless its generation is superseded.
    ///
    /// Currency is checked again after detection, since that is where a
    /// newer image can arrive. Returns `None` for a stale run.
    #[must_use]
    pub fn run_current(
        &self,
        counter: &GenerationCounter,
        image: &ImageInfo,
        request: &RunRequest<'_>,
    ) -> Option<PipelineReport> {
        if !counter.is_current(request.generation) {
            debug!(generation = request.generation.value(), "Skipping superseded image");
            return None;
        }
        let face = self.detect(image, request.detection);
        if !counter.is_current(request.generation) {
            debug!(generation = request.generation.value(), "Discarding stale detection");
            return None;
        }
        Some(self.evaluate(image, request, &face))
    }

    fn detect(&self, image: &ImageInfo, hint: Option<&DetectorOutput>) -> FaceRegion {
        if let Some(output) = hint {
            return output.normalize();
        }
        let Some(detector) = &self.detector else {
            return FaceRegion::none();
        };
        match detector.detect(&image.pixels) {
            Ok(output) => output.normalize(),
            Err(e) => {
                warn!(path = %image.path, error = %e, "Face detection failed, treating as no face");
                FaceRegion::none()
            }
        }
    }

    fn evaluate(
        &self,
        image: &ImageInfo,
        request: &RunRequest<'_>,
        face: &FaceRegion,
    ) -> PipelineReport {
        let standard = request.standard;
        let moderation = self
            .moderation
            .moderate(&image.pixels, self.classifier.as_deref());
        let analysis = self.metrics.analyze(&image.pixels, face);
        let background = self.background.analyze(image, face);

        let mut report = PipelineReport {
            path: image.path.clone(),
            timestamp: request.timestamp.clone(),
            generation: request.generation.value(),
            standard_id: standard.id.to_string(),
            dimensions: ImageDimensions {
                width: image.width(),
                height: image.height(),
            },
            outcome: Outcome::Blocked,
            moderation,
            analysis,
            background,
            crop: None,
            compliance: None,
            retake: None,
        };

        if !report.moderation.allowed {
            info!(path = %image.path, "{}", report.moderation.summary);
            return report;
        }

        let crop = calculate_crop(
            image.width(),
            image.height(),
            face,
            standard,
            &request.adjustment,
            &self.crop,
        );
        let framed = report.analysis.within_crop(&crop);
        let compliance = self.compliance.evaluate(
            standard,
            &framed,
            &report.background,
            request.bg_removed,
            &report.moderation,
        );
        let retake = suggest_retake(&compliance.checks);

        report.outcome = if compliance.ready_to_print {
            Outcome::Ready
        } else {
            Outcome::NeedsAttention
        };
        debug!(
            path = %image.path,
            standard = standard.id,
            outcome = ?report.outcome,
            suggestions = retake.suggestions.len(),
            "Pipeline finished"
        );
        report.crop = Some(crop);
        report.compliance = Some(compliance);
        report.retake = Some(retake);
        report
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("compliance", &self.compliance)
            .field("detector", &self.detector.is_some())
            .field("classifier", &self.classifier.is_some())
            .finish_non_exhaustive()
    }
}
