//! Core domain types for identity photo processing.

mod analysis;
mod background;
mod compliance;
mod crop;
mod face;
mod moderation;
mod pixels;
mod result;
mod standard;

pub use analysis::{
    ComplianceGeometry, FaceLighting, HeadSpan, ImageAnalysis, QualityMetrics, EYE_LINE_FALLBACK,
    HAIR_ALLOWANCE,
};
pub use background::{AverageRgb, BgAnalysis, UNREADABLE_REASON};
pub use compliance::{
    CheckId, CheckStatus, ComplianceCheck, ComplianceReport, RetakeAdvice, Suggestion,
};
pub use crop::{CropAdjustment, CropResult};
pub use face::{BoundingBox, FaceRegion, Landmarks, Point, Rotation};
pub use moderation::{ModerationResult, Severity, Violation};
pub use pixels::{ImageInfo, PixelBuffer, PixelBufferError, CHANNELS};
pub use result::{ImageDimensions, Outcome, PipelineReport};
pub use standard::{
    mm_to_pixels, standard_by_id, standards, BackgroundClass, PercentRange, PhotoStandard,
    PhysicalSize, SheetSpec, Unit,
};
