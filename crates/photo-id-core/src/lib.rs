//! Photo ID Core - identity photo analysis and compliance
//!
//! This crate contains the domain types, detector-result normalization, image
//! metrics, background scoring, the per-standard compliance rule engine, crop
//! and print-sheet layout, and the content moderation gate. External services
//! (face detection, content classification, background removal) are reached
//! only through the traits in [`ports`].

pub mod analysis;
pub mod background;
pub mod compliance;
pub mod detection;
pub mod domain;
pub mod layout;
pub mod moderation;
pub mod pipeline;
pub mod ports;
pub mod retake;

pub use domain::{
    standard_by_id, standards, BgAnalysis, CheckId, CheckStatus, ComplianceCheck,
    ComplianceReport, CropAdjustment, CropResult, FaceRegion, ImageAnalysis, ImageInfo,
    ModerationResult, Outcome, PhotoStandard, PipelineReport, PixelBuffer, RetakeAdvice,
};
pub use pipeline::{GenerationCounter, GenerationToken, Pipeline, PipelineConfig, RunRequest};
pub use ports::{ImageSource, ProgressEvent, ProgressSink, ResultOutput};
