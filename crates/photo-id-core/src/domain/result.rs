//! Per-image pipeline output.

use serde::{Deserialize, Serialize};

use super::{
    BgAnalysis, ComplianceReport, CropResult, ImageAnalysis, ModerationResult, RetakeAdvice,
};

/// Image dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Overall outcome for one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Every check passed, the photo can be printed.
    Ready,
    /// Some checks need attention.
    NeedsAttention,
    /// Content moderation blocked the image.
    Blocked,
}

/// Everything the pipeline derived for one image and standard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Origin of the image.
    pub path: String,
    /// Time of analysis (RFC 3339).
    pub timestamp: String,
    /// Generation the report was computed for.
    pub generation: u64,
    /// Standard identifier.
    pub standard_id: String,
    /// Source dimensions.
    pub dimensions: ImageDimensions,
    /// Overall outcome.
    pub outcome: Outcome,
    /// Moderation verdict.
    pub moderation: ModerationResult,
    /// Measurements on the full frame.
    pub analysis: ImageAnalysis,
    /// Background verdict.
    pub background: BgAnalysis,
    /// Crop window for the standard, absent when moderation blocked the image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropResult>,
    /// Compliance verdict on the cropped photo.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compliance: Option<ComplianceReport>,
    /// Retake guidance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retake: Option<RetakeAdvice>,
}
