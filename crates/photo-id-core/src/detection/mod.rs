//! Detection adapter.
//!
//! Converts the native output of each supported face detector into one
//! canonical [`FaceRegion`]. Each backend keeps its own payload type and
//! conversion; adding a backend means adding a variant to [`DetectorOutput`].
//!
//! Malformed payloads never raise: they degrade to "no detection".

mod landmark;
mod normalized;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::FaceRegion;

pub use landmark::{LandmarkDetection, LandmarkPoints, LandmarkResult, PixelBox};
pub use normalized::{NormalizedDetection, NormalizedResult, RelativeBox};

/// A point as emitted by detector payloads.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPoint {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

/// Conversion from a backend's native result to the canonical face.
pub trait DetectionBackend {
    /// Backend name used in logs.
    fn name(&self) -> &'static str;

    /// Normalizes the result. Must not panic on any input.
    fn to_face_region(&self) -> FaceRegion;
}

/// Supported detector backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    /// Absolute pixel boxes with scores and contour landmarks.
    #[default]
    Landmark,
    /// Fractional boxes and keypoints relative to the image size.
    Normalized,
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Landmark => f.write_str("landmark"),
            Self::Normalized => f.write_str("normalized"),
        }
    }
}

impl FromStr for DetectorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "landmark" => Ok(Self::Landmark),
            "normalized" => Ok(Self::Normalized),
            other => Err(format!("unknown detector backend: {other}")),
        }
    }
}

/// Native output of one of the supported backends.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectorOutput {
    /// Landmark-rich detector result.
    Landmark(LandmarkResult),
    /// Normalized-coordinate detector result, with the image size it refers to.
    Normalized(NormalizedResult),
}

impl DetectorOutput {
    /// An output carrying no detections.
    #[must_use]
    pub fn empty() -> Self {
        Self::Landmark(LandmarkResult::default())
    }

    /// Parses a JSON payload for `kind`.
    ///
    /// `width`/`height` are the source image dimensions, needed by the
    /// normalized backend. Unparseable payloads yield no detections.
    #[must_use]
    pub fn from_json(kind: DetectorKind, json: &str, width: u32, height: u32) -> Self {
        match kind {
            DetectorKind::Landmark => {
                let result = serde_json::from_str(json).unwrap_or_else(|e| {
                    warn!("Malformed landmark detector payload: {e}");
                    LandmarkResult::default()
                });
                Self::Landmark(result)
            }
            DetectorKind::Normalized => {
                let mut result: NormalizedResult =
                    serde_json::from_str(json).unwrap_or_else(|e| {
                        warn!("Malformed normalized detector payload: {e}");
                        NormalizedResult::default()
                    });
                result.image_width = width;
                result.image_height = height;
                Self::Normalized(result)
            }
        }
    }

    fn backend(&self) -> &dyn DetectionBackend {
        match self {
            Self::Landmark(r) => r,
            Self::Normalized(r) => r,
        }
    }

    /// Converts to the canonical face description.
    #[must_use]
    pub fn normalize(&self) -> FaceRegion {
        let backend = self.backend();
        let face = backend.to_face_region().normalized();
        debug!(
            backend = backend.name(),
            faces = face.face_count,
            confidence = face.detection_confidence,
            "Normalized detection"
        );
        face
    }
}

/// Checks that a value parsed from a payload is usable as a coordinate.
pub(crate) fn finite_point(p: RawPoint) -> Option<crate::domain::Point> {
    (p.x.is_finite() && p.y.is_finite()).then(|| crate::domain::Point::new(p.x, p.y))
}
