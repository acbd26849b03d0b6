//! Canonical face description produced by the detection adapter.

use serde::{Deserialize, Serialize};

/// A point in source-pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate (origin top).
    pub y: f32,
}

impl Point {
    /// Creates a point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Midpoint between two points.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Axis-aligned box in source-pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub w: f32,
    /// Height.
    pub h: f32,
}

impl BoundingBox {
    /// Creates a bounding box.
    #[must_use]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Centre point.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// True when the box has a positive, finite area.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.w.is_finite() && self.h.is_finite() && self.w > 0.0 && self.h > 0.0
    }

    /// The box shifted by `(dx, dy)`.
    #[must_use]
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    /// Whether `(px, py)` lies inside the box.
    #[must_use]
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }
}

impl Point {
    fn translated(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Named facial landmarks.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmarks {
    /// Left eye centre.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_eye: Option<Point>,
    /// Right eye centre.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_eye: Option<Point>,
    /// Nose tip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nose: Option<Point>,
    /// Mouth centre.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mouth: Option<Point>,
    /// Chin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chin: Option<Point>,
}

impl Landmarks {
    /// Mean vertical position of the eyes, if both are known.
    #[must_use]
    pub fn eye_line_y(&self) -> Option<f32> {
        match (self.left_eye, self.right_eye) {
            (Some(l), Some(r)) => Some((l.y + r.y) / 2.0),
            _ => None,
        }
    }

    /// Every landmark shifted by `(dx, dy)`.
    #[must_use]
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        let shift = |p: Option<Point>| p.map(|p| p.translated(dx, dy));
        Self {
            left_eye: shift(self.left_eye),
            right_eye: shift(self.right_eye),
            nose: shift(self.nose),
            mouth: shift(self.mouth),
            chin: shift(self.chin),
        }
    }

    /// In-plane head tilt estimated from the eye line, in degrees.
    #[must_use]
    pub fn eye_roll_degrees(&self) -> Option<f32> {
        let (l, r) = (self.left_eye?, self.right_eye?);
        let (a, b) = if l.x <= r.x { (l, r) } else { (r, l) };
        let dx = b.x - a.x;
        if dx.abs() < f32::EPSILON {
            return None;
        }
        Some((b.y - a.y).atan2(dx).to_degrees())
    }
}

/// Head rotation in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Rotation {
    /// Nodding up/down.
    pub pitch: f32,
    /// Turning left/right.
    pub yaw: f32,
    /// In-plane tilt.
    pub roll: f32,
}

/// Canonical face detection result.
///
/// When `face_count` is zero, `bbox` and `landmarks` are absent. With more
/// than one face, only the primary face's geometry is carried.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FaceRegion {
    /// Primary face bounding box.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
    /// Primary face landmarks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landmarks: Option<Landmarks>,
    /// Primary face rotation, when the backend reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Rotation>,
    /// Confidence of the primary detection (0.0-1.0).
    pub detection_confidence: f32,
    /// Number of faces found.
    pub face_count: usize,
}

impl FaceRegion {
    /// No face detected.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            bbox: None,
            landmarks: None,
            rotation: None,
            detection_confidence: 0.0,
            face_count: 0,
        }
    }

    /// A single face with just a bounding box.
    #[must_use]
    pub const fn single(bbox: BoundingBox, confidence: f32) -> Self {
        Self {
            bbox: Some(bbox),
            landmarks: None,
            rotation: None,
            detection_confidence: confidence,
            face_count: 1,
        }
    }

    /// Attaches landmarks.
    #[must_use]
    pub fn with_landmarks(mut self, landmarks: Landmarks) -> Self {
        self.landmarks = Some(landmarks);
        self
    }

    /// Attaches rotation.
    #[must_use]
    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = Some(rotation);
        self
    }

    /// Primary face box, if exactly one usable face exists.
    #[must_use]
    pub fn primary_box(&self) -> Option<BoundingBox> {
        self.bbox.filter(BoundingBox::is_valid)
    }

    /// The region expressed in a frame whose origin sits at `(dx, dy)` of this one.
    #[must_use]
    pub fn relative_to(&self, dx: f32, dy: f32) -> Self {
        Self {
            bbox: self.bbox.map(|b| b.translated(-dx, -dy)),
            landmarks: self.landmarks.map(|l| l.translated(-dx, -dy)),
            ..*self
        }
    }

    /// Returns the region with the invariant enforced: no geometry without faces.
    #[must_use]
    pub fn normalized(self) -> Self {
        if self.face_count == 0 {
            return Self::none();
        }
        Self {
            detection_confidence: self.detection_confidence.clamp(0.0, 1.0),
            ..self
        }
    }
}
