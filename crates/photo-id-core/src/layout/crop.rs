//! Crop window calculation.
//!
//! With a face, the window is sized so the head fills the middle of the
//! standard's head-height range and the eyes sit in the middle of its
//! eye-line range. Without one, a top-biased portrait window is used.
//! User zoom and offset are applied last, then the window is shrunk and
//! clamped until it lies inside the image.

use tracing::debug;

use crate::domain::{CropAdjustment, CropResult, FaceRegion, HeadSpan, PhotoStandard};

/// Configuration for crop calculation.
#[derive(Debug, Clone)]
pub struct CropConfig {
    /// Where the fallback window sits in the vertical slack, 0 = top, 0.5 = centre.
    pub top_bias: f64,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self { top_bias: 0.2 }
    }
}

/// Computes the crop window for `standard` in a `width × height` image.
///
/// The result always lies inside the image and has the standard's aspect ratio.
#[must_use]
pub fn calculate_crop(
    width: u32,
    height: u32,
    face: &FaceRegion,
    standard: &PhotoStandard,
    adjustment: &CropAdjustment,
    config: &CropConfig,
) -> CropResult {
    let (w, h) = (f64::from(width), f64::from(height));
    let aspect = standard.aspect_ratio();
    let adj = adjustment.clamped();

    // (centre x, centre y, crop height)
    let (cx, cy, ch) = match HeadSpan::from_face(face).filter(|s| s.height() > 0.0) {
        Some(span) => {
            let head = f64::from(span.height());
            let ch = head / (f64::from(standard.head_height.midpoint()) / 100.0);
            let eye_from_top = 1.0 - f64::from(standard.eye_line.midpoint()) / 100.0;
            let top = f64::from(span.eye_line) - eye_from_top * ch;
            (f64::from(span.center_x), top + ch / 2.0, ch)
        }
        None => {
            let (_, fh) = fit_aspect(w, h, aspect);
            let top = (h - fh) * config.top_bias;
            (w / 2.0, top + fh / 2.0, fh)
        }
    };

    let mut crop_h = ch / adj.zoom;
    let mut crop_w = crop_h * aspect;
    let cx = cx + adj.offset_x * crop_w / 2.0;
    let cy = cy + adj.offset_y * crop_h / 2.0;

    if crop_w > w {
        crop_w = w;
        crop_h = crop_w / aspect;
    }
    if crop_h > h {
        crop_h = h;
        crop_w = crop_h * aspect;
    }

    let crop_x = (cx - crop_w / 2.0).clamp(0.0, (w - crop_w).max(0.0));
    let crop_y = (cy - crop_h / 2.0).clamp(0.0, (h - crop_h).max(0.0));

    debug!(crop_x, crop_y, crop_w, crop_h, standard = standard.id, "Computed crop");

    CropResult {
        crop_x,
        crop_y,
        crop_w,
        crop_h,
        zoom: adj.zoom,
        offset_x: adj.offset_x,
        offset_y: adj.offset_y,
    }
}

/// Largest `aspect` window inside `w × h`.
fn fit_aspect(w: f64, h: f64, aspect: f64) -> (f64, f64) {
    if w / h > aspect {
        (h * aspect, h)
    } else {
        (w, w / aspect)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::domain::{standard_by_id, BoundingBox, Landmarks, Point};

    fn standard(id: &str) -> &'static PhotoStandard {
        standard_by_id(id).expect("known standard")
    }

    fn crop(w: u32, h: u32, face: &FaceRegion, id: &str, adj: CropAdjustment) -> CropResult {
        calculate_crop(w, h, face, standard(id), &adj, &CropConfig::default())
    }

    fn centered_face() -> FaceRegion {
        // crown 400, eyes 600, chin 1000 in a 2000x3000 frame
        FaceRegion::single(BoundingBox::new(800.0, 520.0, 400.0, 480.0), 0.95).with_landmarks(
            Landmarks {
                left_eye: Some(Point::new(920.0, 600.0)),
                right_eye: Some(Point::new(1080.0, 600.0)),
                chin: Some(Point::new(1000.0, 1000.0)),
                ..Landmarks::default()
            },
        )
    }

    #[test]
    fn test_face_guided_crop_hits_range_midpoints() {
        let s = standard("us-passport");
        let c = crop(2000, 3000, &centered_face(), "us-passport", CropAdjustment::default());
        // head is 600 px, range midpoint 59.5%
        let expected_h = 600.0 / 0.595;
        assert!((c.crop_h - expected_h).abs() < 1e-6);
        assert!((c.aspect_ratio() - s.aspect_ratio()).abs() < 1e-9);

        let eye_from_bottom = (c.crop_y + c.crop_h - 600.0) / c.crop_h * 100.0;
        assert!((eye_from_bottom - f64::from(s.eye_line.midpoint())).abs() < 1e-6);
        assert!((c.crop_x + c.crop_w / 2.0 - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_no_face_uses_top_biased_portrait() {
        let c = crop(300, 800, &FaceRegion::none(), "uk-passport", CropAdjustment::default());
        let aspect = 35.0 / 45.0;
        assert!((c.crop_w - 300.0).abs() < 1e-9);
        assert!((c.crop_h - 300.0 / aspect).abs() < 1e-9);
        assert!((c.crop_y - (800.0 - c.crop_h) * 0.2).abs() < 1e-9);
        assert!(c.crop_x.abs() < 1e-9);
    }

    #[test]
    fn test_zoom_shrinks_window() {
        let base = crop(2000, 3000, &centered_face(), "us-passport", CropAdjustment::default());
        let zoomed = crop(
            2000,
            3000,
            &centered_face(),
            "us-passport",
            CropAdjustment {
                zoom: 2.0,
                ..CropAdjustment::default()
            },
        );
        assert!((zoomed.crop_w - base.crop_w / 2.0).abs() < 1e-6);
        assert!((zoomed.zoom - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_offset_moves_window() {
        let base = crop(2000, 3000, &centered_face(), "us-passport", CropAdjustment::default());
        let moved = crop(
            2000,
            3000,
            &centered_face(),
            "us-passport",
            CropAdjustment {
                offset_x: 0.5,
                ..CropAdjustment::default()
            },
        );
        assert!((moved.crop_x - (base.crop_x + base.crop_w / 4.0)).abs() < 1e-6);
    }

    #[test]
    fn test_crop_always_inside_image() {
        let faces = [
            FaceRegion::none(),
            centered_face(),
            FaceRegion::single(BoundingBox::new(-50.0, -80.0, 300.0, 400.0), 0.9),
            FaceRegion::single(BoundingBox::new(1900.0, 2900.0, 400.0, 400.0), 0.9),
        ];
        let adjustments = [
            CropAdjustment::default(),
            CropAdjustment {
                zoom: 0.2,
                offset_x: -1.0,
                offset_y: 1.0,
                brightness: 0,
            },
            CropAdjustment {
                zoom: 5.0,
                offset_x: 1.0,
                offset_y: -1.0,
                brightness: 0,
            },
        ];
        for (w, h) in [(2000, 3000), (640, 480), (1, 1), (37, 900)] {
            for face in &faces {
                for adj in adjustments {
                    for s in crate::domain::standards() {
                        let c = calculate_crop(w, h, face, s, &adj, &CropConfig::default());
                        assert!(c.is_within(w, h), "{c:?} outside {w}x{h}");
                        assert!(
                            (c.aspect_ratio() - s.aspect_ratio()).abs() < 1e-9,
                            "aspect {} vs {}",
                            c.aspect_ratio(),
                            s.aspect_ratio()
                        );
                    }
                }
            }
        }
    }
}
