//! Normalized-coordinate detector: fractional boxes and keypoints.
//!
//! Detections carry no ordering guarantee beyond the detector's own, and the
//! first entry is taken as the primary face.

use serde::{Deserialize, Serialize};

use super::{finite_point, DetectionBackend, RawPoint};
use crate::domain::{BoundingBox, FaceRegion, Landmarks};

/// Keypoint indices in detector order.
const RIGHT_EYE: usize = 0;
const LEFT_EYE: usize = 1;
const NOSE_TIP: usize = 2;
const MOUTH: usize = 3;

/// Box relative to the image size, all values in `0..=1`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelativeBox {
    /// Left edge fraction.
    pub x_min: f32,
    /// Top edge fraction.
    pub y_min: f32,
    /// Width fraction.
    pub width: f32,
    /// Height fraction.
    pub height: f32,
}

/// One detected face.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizedDetection {
    /// Fractional box.
    pub bounding_box: RelativeBox,
    /// Fractional keypoints: right eye, left eye, nose tip, mouth, ears.
    pub keypoints: Vec<RawPoint>,
    /// Optional score; treated as certain when absent.
    pub score: Option<f32>,
}

/// Full detector result plus the image size it refers to.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizedResult {
    /// All detections.
    pub detections: Vec<NormalizedDetection>,
    /// Source width in pixels.
    #[serde(skip)]
    pub image_width: u32,
    /// Source height in pixels.
    #[serde(skip)]
    pub image_height: u32,
}

impl NormalizedResult {
    /// Wraps detections for an image of the given size.
    #[must_use]
    pub fn new(detections: Vec<NormalizedDetection>, image_width: u32, image_height: u32) -> Self {
        Self {
            detections,
            image_width,
            image_height,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn scale(&self) -> (f32, f32) {
        (self.image_width as f32, self.image_height as f32)
    }

    fn to_pixels(&self, b: RelativeBox) -> BoundingBox {
        let (w, h) = self.scale();
        BoundingBox::new(b.x_min * w, b.y_min * h, b.width * w, b.height * h)
    }

    fn keypoint(&self, points: &[RawPoint], index: usize) -> Option<crate::domain::Point> {
        let (w, h) = self.scale();
        let p = points.get(index)?;
        finite_point(RawPoint {
            x: p.x * w,
            y: p.y * h,
        })
    }
}

impl DetectionBackend for NormalizedResult {
    fn name(&self) -> &'static str {
        "normalized"
    }

    fn to_face_region(&self) -> FaceRegion {
        if self.image_width == 0 || self.image_height == 0 {
            return FaceRegion::none();
        }
        let valid: Vec<&NormalizedDetection> = self
            .detections
            .iter()
            .filter(|d| self.to_pixels(d.bounding_box).is_valid())
            .collect();
        let Some(primary) = valid.first() else {
            return FaceRegion::none();
        };

        let kp = &primary.keypoints;
        let landmarks = Landmarks {
            left_eye: self.keypoint(kp, LEFT_EYE),
            right_eye: self.keypoint(kp, RIGHT_EYE),
            nose: self.keypoint(kp, NOSE_TIP),
            mouth: self.keypoint(kp, MOUTH),
            chin: None,
        };

        let mut face = FaceRegion::single(
            self.to_pixels(primary.bounding_box),
            primary.score.unwrap_or(1.0),
        );
        face.face_count = valid.len();
        if !kp.is_empty() {
            face = face.with_landmarks(landmarks);
        }
        face
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Point;

    fn detection(x_min: f32, score: Option<f32>) -> NormalizedDetection {
        NormalizedDetection {
            bounding_box: RelativeBox {
                x_min,
                y_min: 0.2,
                width: 0.4,
                height: 0.5,
            },
            keypoints: vec![
                RawPoint { x: 0.6, y: 0.4 },
                RawPoint { x: 0.4, y: 0.4 },
                RawPoint { x: 0.5, y: 0.5 },
                RawPoint { x: 0.5, y: 0.6 },
            ],
            score,
        }
    }

    #[test]
    fn test_converts_fractions_to_pixels() {
        let face = NormalizedResult::new(vec![detection(0.3, Some(0.9))], 200, 400).to_face_region();
        let bbox = face.bbox.unwrap_or_default();
        assert!((bbox.x - 60.0).abs() < 1e-4);
        assert!((bbox.y - 80.0).abs() < 1e-4);
        assert!((bbox.w - 80.0).abs() < 1e-4);
        assert!((bbox.h - 200.0).abs() < 1e-4);

        let lm = face.landmarks.unwrap_or_default();
        let close = |p: Option<Point>, x: f32, y: f32| {
            p.is_some_and(|p| (p.x - x).abs() < 1e-3 && (p.y - y).abs() < 1e-3)
        };
        assert!(close(lm.right_eye, 120.0, 160.0));
        assert!(close(lm.left_eye, 80.0, 160.0));
        assert_eq!(lm.chin, None);
    }

    #[test]
    fn test_first_entry_is_primary_regardless_of_score() {
        let face = NormalizedResult::new(
            vec![detection(0.1, Some(0.5)), detection(0.5, Some(0.99))],
            100,
            100,
        )
        .to_face_region();
        assert_eq!(face.face_count, 2);
        assert!((face.bbox.map_or(0.0, |b| b.x) - 10.0).abs() < 1e-4);
        assert!((face.detection_confidence - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_missing_score_is_certain() {
        let face = NormalizedResult::new(vec![detection(0.1, None)], 100, 100).to_face_region();
        assert!((face.detection_confidence - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_unknown_image_size_is_no_face() {
        let face = NormalizedResult::new(vec![detection(0.1, None)], 0, 0).to_face_region();
        assert_eq!(face, FaceRegion::none());
    }
}
