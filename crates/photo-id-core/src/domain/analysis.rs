//! Photometric and geometric measurements of one image.

use serde::{Deserialize, Serialize};

use super::{CropResult, FaceRegion};

/// Fraction of the face box height added above it to reach the crown.
pub const HAIR_ALLOWANCE: f32 = 0.25;

/// Eye line position within the face box when eye landmarks are missing.
pub const EYE_LINE_FALLBACK: f32 = 0.4;

/// Vertical landmarks of the head, in pixels from the top of the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadSpan {
    /// Estimated crown, may be negative when the head is cut off.
    pub top: f32,
    /// Chin.
    pub chin: f32,
    /// Eye line.
    pub eye_line: f32,
    /// Horizontal centre of the face.
    pub center_x: f32,
}

impl HeadSpan {
    /// Derives the span from the primary face, if one exists.
    #[must_use]
    pub fn from_face(face: &FaceRegion) -> Option<Self> {
        let bbox = face.primary_box()?;
        let landmarks = face.landmarks.unwrap_or_default();
        let chin = landmarks.chin.map_or_else(|| bbox.bottom(), |p| p.y);
        let eye_line = landmarks
            .eye_line_y()
            .unwrap_or(bbox.y + EYE_LINE_FALLBACK * bbox.h);
        Some(Self {
            top: bbox.y - HAIR_ALLOWANCE * bbox.h,
            chin,
            eye_line,
            center_x: bbox.center().x,
        })
    }

    /// Crown-to-chin height.
    #[must_use]
    pub fn height(&self) -> f32 {
        (self.chin - self.top).max(0.0)
    }
}

/// Quality estimates, each in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Higher is sharper.
    pub sharpness: f32,
    /// Higher is noisier.
    pub noise: f32,
    /// Tonal spread, higher is more contrast.
    pub contrast: f32,
    /// Weighted summary, higher is better.
    pub overall: f32,
}

/// Head placement expressed as percentages of frame height.
///
/// All fields are zero when no face is available.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ComplianceGeometry {
    /// Eye line height measured from the bottom edge.
    pub eye_line_percent: f32,
    /// Crown-to-chin height.
    pub head_height_percent: f32,
    /// Space above the crown.
    pub top_margin_percent: f32,
    /// Space below the chin.
    pub bottom_margin_percent: f32,
    /// Distance of the face centre from the vertical midline, as a percentage of frame width.
    pub horizontal_offset_percent: f32,
}

impl ComplianceGeometry {
    /// Computes placement of the primary face in a `width × height` frame.
    ///
    /// Zero-filled when there is no usable face.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_face(face: &FaceRegion, width: u32, height: u32) -> Self {
        let Some(span) = HeadSpan::from_face(face) else {
            return Self::default();
        };
        let h = height as f32;
        let w = width as f32;
        let pct = |v: f32| v / h * 100.0;
        let top = span.top.max(0.0);
        let chin = span.chin.min(h);
        Self {
            eye_line_percent: pct(h - span.eye_line),
            head_height_percent: pct((chin - top).max(0.0)),
            top_margin_percent: pct(top),
            bottom_margin_percent: pct((h - span.chin).max(0.0)),
            horizontal_offset_percent: (span.center_x - w / 2.0).abs() / w * 100.0,
        }
    }
}

/// Lighting on the two halves of the face box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceLighting {
    /// Mean luma over the whole face box.
    pub mean: f32,
    /// Mean luma of the left half.
    pub left_mean: f32,
    /// Mean luma of the right half.
    pub right_mean: f32,
    /// `|left - right| / max(left, right)`, 0 = perfectly even.
    pub imbalance: f32,
}

/// Measurements produced by the metric analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAnalysis {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// `width / height`.
    pub aspect_ratio: f64,
    /// Mean of `(R + G + B) / 3` over all pixels.
    pub brightness: f64,
    /// Mean background colour as `#RRGGBB`.
    pub background_color: String,
    /// 1 for a perfectly flat background, lower with more variation.
    pub background_uniformity: f64,
    /// Quality estimates.
    pub quality: QualityMetrics,
    /// Mean chroma in `0..=100`, near zero for greyscale images.
    pub colorfulness: f32,
    /// Lighting evenness across the face, when a face is present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face_lighting: Option<FaceLighting>,
    /// Head placement.
    pub geometry: ComplianceGeometry,
    /// Face detection the measurements were derived from.
    pub face: FaceRegion,
}

impl ImageAnalysis {
    /// Re-expresses the face and geometry relative to a crop window.
    ///
    /// Photometric measurements are kept as measured on the full frame.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn within_crop(&self, crop: &CropResult) -> Self {
        let width = crop.crop_w.round().max(1.0) as u32;
        let height = crop.crop_h.round().max(1.0) as u32;
        let face = self
            .face
            .relative_to(crop.crop_x as f32, crop.crop_y as f32);
        Self {
            width,
            height,
            aspect_ratio: crop.aspect_ratio(),
            geometry: ComplianceGeometry::from_face(&face, width, height),
            face,
            ..self.clone()
        }
    }
}
