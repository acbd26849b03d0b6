//! Landmark-rich detector: absolute pixel boxes, scores and contour points.

use serde::{Deserialize, Serialize};

use super::{finite_point, DetectionBackend, RawPoint};
use crate::domain::{BoundingBox, FaceRegion, Landmarks, Point, Rotation};

/// Box in absolute pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PixelBox {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

/// Contour landmarks for one face.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkPoints {
    /// Left eye contour.
    pub left_eye: Vec<RawPoint>,
    /// Right eye contour.
    pub right_eye: Vec<RawPoint>,
    /// Nose tip.
    pub nose: Option<RawPoint>,
    /// Mouth centre.
    pub mouth: Option<RawPoint>,
    /// Jaw outline, ending at the chin.
    pub jaw: Vec<RawPoint>,
}

impl LandmarkPoints {
    fn to_landmarks(&self) -> Landmarks {
        Landmarks {
            left_eye: eye_center(&self.left_eye),
            right_eye: eye_center(&self.right_eye),
            nose: self.nose.and_then(finite_point),
            mouth: self.mouth.and_then(finite_point),
            chin: self.jaw.last().copied().and_then(finite_point),
        }
    }
}

/// Mean of the midpoints of every opposite pair `(i, i + n/2)` on the contour.
///
/// Pairs with a non-finite point are skipped. A single point passes through.
#[allow(clippy::cast_precision_loss)]
fn eye_center(contour: &[RawPoint]) -> Option<Point> {
    let half = contour.len() / 2;
    if half == 0 {
        return finite_point(*contour.first()?);
    }
    let (mut x, mut y, mut pairs) = (0.0_f32, 0.0_f32, 0usize);
    for (&a, &b) in contour[..half].iter().zip(&contour[half..2 * half]) {
        let (Some(a), Some(b)) = (finite_point(a), finite_point(b)) else {
            continue;
        };
        let mid = a.midpoint(b);
        x += mid.x;
        y += mid.y;
        pairs += 1;
    }
    (pairs > 0).then(|| Point::new(x / pairs as f32, y / pairs as f32))
}

/// One detected face.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkDetection {
    /// Face box.
    #[serde(rename = "box")]
    pub bbox: PixelBox,
    /// Detection score.
    pub score: f32,
    /// Contour landmarks.
    pub landmarks: Option<LandmarkPoints>,
    /// Head angles in degrees.
    pub angle: Option<Rotation>,
}

impl LandmarkDetection {
    fn bounding_box(&self) -> BoundingBox {
        BoundingBox::new(self.bbox.x, self.bbox.y, self.bbox.width, self.bbox.height)
    }
}

/// Full detector result.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkResult {
    /// All detections.
    pub detections: Vec<LandmarkDetection>,
}

impl DetectionBackend for LandmarkResult {
    fn name(&self) -> &'static str {
        "landmark"
    }

    fn to_face_region(&self) -> FaceRegion {
        let valid: Vec<&LandmarkDetection> = self
            .detections
            .iter()
            .filter(|d| d.bounding_box().is_valid())
            .collect();

        let Some(primary) = valid
            .iter()
            .copied()
            .max_by(|a, b| a.score.total_cmp(&b.score))
        else {
            return FaceRegion::none();
        };

        let mut face = FaceRegion::single(primary.bounding_box(), primary.score);
        face.face_count = valid.len();
        if let Some(points) = &primary.landmarks {
            face = face.with_landmarks(points.to_landmarks());
        }
        if let Some(angle) = primary.angle {
            face = face.with_rotation(angle);
        }
        face
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(x: f32, score: f32) -> LandmarkDetection {
        LandmarkDetection {
            bbox: PixelBox {
                x,
                y: 10.0,
                width: 50.0,
                height: 60.0,
            },
            score,
            ..LandmarkDetection::default()
        }
    }

    #[test]
    fn test_empty_is_no_face() {
        assert_eq!(LandmarkResult::default().to_face_region(), FaceRegion::none());
    }

    #[test]
    fn test_highest_score_is_primary() {
        let result = LandmarkResult {
            detections: vec![detection(0.0, 0.6), detection(100.0, 0.95), detection(200.0, 0.7)],
        };
        let face = result.to_face_region();
        assert_eq!(face.face_count, 3);
        assert_eq!(face.bbox.map(|b| b.x), Some(100.0));
        assert!((face.detection_confidence - 0.95).abs() < f32::EPSILON);
    }

    #[test]
    fn test_landmark_extraction() {
        let mut d = detection(0.0, 0.9);
        d.landmarks = Some(LandmarkPoints {
            left_eye: vec![
                RawPoint { x: 10.0, y: 20.0 },
                RawPoint { x: 12.0, y: 18.0 },
                RawPoint { x: 14.0, y: 22.0 },
                RawPoint { x: 16.0, y: 20.0 },
            ],
            right_eye: vec![RawPoint { x: 30.0, y: 21.0 }],
            nose: Some(RawPoint { x: 22.0, y: 30.0 }),
            mouth: None,
            jaw: vec![RawPoint { x: 0.0, y: 40.0 }, RawPoint { x: 22.0, y: 55.0 }],
        });
        let lm = LandmarkResult { detections: vec![d] }
            .to_face_region()
            .landmarks
            .unwrap_or_default();
        // pairs (0, 2) and (1, 3)
        assert_eq!(lm.left_eye, Some(Point::new(13.0, 20.0)));
        assert_eq!(lm.right_eye, Some(Point::new(30.0, 21.0)));
        assert_eq!(lm.nose, Some(Point::new(22.0, 30.0)));
        assert_eq!(lm.mouth, None);
        assert_eq!(lm.chin, Some(Point::new(22.0, 55.0)));
    }

    #[test]
    fn test_eye_center_averages_opposite_pairs() {
        let contour = [
            RawPoint { x: 0.0, y: 10.0 },
            RawPoint { x: 5.0, y: 6.0 },
            RawPoint { x: 10.0, y: 8.0 },
            RawPoint { x: 20.0, y: 10.0 },
            RawPoint { x: 15.0, y: 14.0 },
            RawPoint { x: 10.0, y: 12.0 },
        ];
        // midpoints (10, 10), (10, 10), (10, 10)
        assert_eq!(eye_center(&contour), Some(Point::new(10.0, 10.0)));

        let with_gap = [
            RawPoint { x: f32::NAN, y: 0.0 },
            RawPoint { x: 4.0, y: 4.0 },
            RawPoint { x: 8.0, y: 8.0 },
            RawPoint { x: 6.0, y: 2.0 },
        ];
        assert_eq!(eye_center(&with_gap), Some(Point::new(5.0, 3.0)));
        assert_eq!(eye_center(&[]), None);
        assert_eq!(eye_center(&[RawPoint { x: f32::NAN, y: 1.0 }]), None);
    }

    #[test]
    fn test_invalid_boxes_are_not_counted() {
        let mut bad = detection(0.0, 0.99);
        bad.bbox.width = 0.0;
        let face = LandmarkResult {
            detections: vec![bad, detection(50.0, 0.5)],
        }
        .to_face_region();
        assert_eq!(face.face_count, 1);
        assert_eq!(face.bbox.map(|b| b.x), Some(50.0));
    }

    #[test]
    fn test_parses_payload_with_missing_fields() {
        let json = r#"{"detections":[{"box":{"x":5,"y":6,"width":40,"height":50},"score":0.8,
            "angle":{"pitch":1.0,"yaw":-2.0,"roll":3.5}}]}"#;
        let result: LandmarkResult = serde_json::from_str(json).unwrap_or_default();
        let face = result.to_face_region();
        assert_eq!(face.face_count, 1);
        assert!(face.landmarks.is_none());
        assert_eq!(face.rotation.map(|r| r.roll), Some(3.5));
    }
}
