//! Synthetic image builders for testing.

use image::{Rgba, RgbaImage};
use photo_id_core::detection::{
    DetectorOutput, LandmarkDetection, LandmarkPoints, LandmarkResult, PixelBox, RawPoint,
};
use photo_id_core::domain::{BoundingBox, ImageInfo, PixelBuffer};

/// Skin tone used for synthetic faces.
const SKIN: [u8; 3] = [224, 172, 140];
/// Hair and clothing tone.
const DARK: [u8; 3] = [40, 32, 28];

/// Builder for creating synthetic test images.
///
/// All images are RGBA. Builders panic if a dimension is zero.
pub struct SyntheticImageBuilder;

/// A synthetic head-and-shoulders portrait with its known face box.
#[derive(Debug, Clone)]
pub struct Portrait {
    /// The image.
    pub image: ImageInfo,
    /// Face box in pixels, matching what a detector would report.
    pub face: BoundingBox,
    /// Eye centres `(left, right)`.
    pub eyes: ((f32, f32), (f32, f32)),
    /// Chin position.
    pub chin: (f32, f32),
}

impl Portrait {
    /// Detector result for the portrait's single face.
    #[must_use]
    pub fn detection(&self) -> DetectorOutput {
        let point = |(x, y): (f32, f32)| RawPoint { x, y };
        let eye = |(x, y): (f32, f32)| vec![point((x - 6.0, y)), point((x + 6.0, y))];
        DetectorOutput::Landmark(LandmarkResult {
            detections: vec![LandmarkDetection {
                bbox: PixelBox {
                    x: self.face.x,
                    y: self.face.y,
                    width: self.face.w,
                    height: self.face.h,
                },
                score: 0.98,
                landmarks: Some(LandmarkPoints {
                    left_eye: eye(self.eyes.0),
                    right_eye: eye(self.eyes.1),
                    nose: None,
                    mouth: None,
                    jaw: vec![point(self.chin)],
                }),
                angle: None,
            }],
        })
    }

    /// Landmark-backend JSON payload for the portrait, as a detector sidecar.
    #[must_use]
    pub fn detection_json(&self) -> String {
        match self.detection() {
            DetectorOutput::Landmark(result) => serde_json::to_string(&result).unwrap_or_default(),
            DetectorOutput::Normalized(_) => String::new(),
        }
    }
}

impl SyntheticImageBuilder {
    // === Flat images ===

    /// Creates a uniform RGB image.
    #[must_use]
    pub fn uniform(width: u32, height: u32, rgb: [u8; 3]) -> ImageInfo {
        let [r, g, b] = rgb;
        info("uniform", RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255])))
    }

    /// Creates a uniform white image.
    #[must_use]
    pub fn white(width: u32, height: u32) -> ImageInfo {
        Self::uniform(width, height, [255, 255, 255])
    }

    /// Creates a uniform grey image.
    #[must_use]
    pub fn gray(width: u32, height: u32, value: u8) -> ImageInfo {
        Self::uniform(width, height, [value, value, value])
    }

    /// Creates a fully transparent image.
    #[must_use]
    pub fn transparent(width: u32, height: u32) -> ImageInfo {
        info("transparent", RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0])))
    }

    // === Patterns ===

    /// Creates a grey horizontal gradient from black to near white.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn horizontal_gradient(width: u32, height: u32) -> ImageInfo {
        let img = RgbaImage::from_fn(width, height, |x, _| {
            let v = ((u32::from(u8::MAX) * x) / width.max(1)) as u8;
            Rgba([v, v, v, 255])
        });
        info("horizontal_gradient", img)
    }

    /// Creates a grey vertical gradient from black to near white.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn vertical_gradient(width: u32, height: u32) -> ImageInfo {
        let img = RgbaImage::from_fn(width, height, |_, y| {
            let v = ((u32::from(u8::MAX) * y) / height.max(1)) as u8;
            Rgba([v, v, v, 255])
        });
        info("vertical_gradient", img)
    }

    /// Creates a black and white checkerboard (very sharp edges).
    #[must_use]
    pub fn checkerboard(width: u32, height: u32, cell: u32) -> ImageInfo {
        let cell = cell.max(1);
        let img = RgbaImage::from_fn(width, height, |x, y| {
            if (x / cell + y / cell) % 2 == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        });
        info("checkerboard", img)
    }

    /// Creates a grey image with deterministic pseudo-random noise of `amplitude`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn noisy(width: u32, height: u32, base: u8, amplitude: u8, seed: u64) -> ImageInfo {
        let mut state = seed;
        let span = u64::from(amplitude) * 2 + 1;
        let img = RgbaImage::from_fn(width, height, |_, _| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            let offset = ((state >> 33) % span) as i32 - i32::from(amplitude);
            let v = (i32::from(base) + offset).clamp(0, 255) as u8;
            Rgba([v, v, v, 255])
        });
        info("noisy", img)
    }

    // === Portraits ===

    /// Creates a head-and-shoulders portrait on a flat background.
    ///
    /// The face is an ellipse centred horizontally with its box spanning
    /// 30%..60% of the height. Hair sits above it and a dark torso fills the
    /// bottom, staying within the face box widened by a quarter on each side.
    /// Fine stripes on the hair give the estimators some detail.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub fn portrait(width: u32, height: u32, background: [u8; 3]) -> Portrait {
        let (w, h) = (width as f32, height as f32);
        let face = BoundingBox::new(w * 0.35, h * 0.30, w * 0.30, h * 0.30);
        let (cx, cy) = (face.x + face.w / 2.0, face.y + face.h / 2.0);
        let (rx, ry) = (face.w / 2.0, face.h / 2.0);
        let hair_top = face.y - face.h * 0.25;
        let torso_top = face.bottom() + h * 0.05;
        let eye_y = face.y + face.h * 0.4;

        let img = RgbaImage::from_fn(width, height, |x, y| {
            let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
            let nx = (px - cx) / rx;
            let ny = (py - cy) / ry;
            let rgb = if nx * nx + ny * ny <= 1.0 {
                if (py - eye_y).abs() < 3.0 && ((px - (cx - rx * 0.4)).abs() < 6.0
                    || (px - (cx + rx * 0.4)).abs() < 6.0)
                {
                    DARK
                } else {
                    SKIN
                }
            } else if py >= hair_top && py < cy && (px - cx).abs() <= rx * 1.1 {
                if (x / 2) % 2 == 0 {
                    DARK
                } else {
                    [70, 56, 48]
                }
            } else if py >= torso_top && (px - cx).abs() <= rx * 1.4 {
                DARK
            } else {
                background
            };
            Rgba([rgb[0], rgb[1], rgb[2], 255])
        });

        Portrait {
            image: info("portrait", img),
            face,
            eyes: ((cx - rx * 0.4, eye_y), (cx + rx * 0.4, eye_y)),
            chin: (cx, face.bottom()),
        }
    }
}

fn info(label: &str, image: RgbaImage) -> ImageInfo {
    let (width, height) = image.dimensions();
    let pixels = PixelBuffer::from_rgba(image)
        .unwrap_or_else(|e| panic!("synthetic {label} image {width}x{height}: {e}"));
    ImageInfo::from_pixels(format!("synthetic://{label}"), pixels)
}
