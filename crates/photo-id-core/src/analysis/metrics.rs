//! Image metric analyzer.

use tracing::debug;

use super::quality::{estimate_quality, QualityConfig};
use super::sample_grid;
use crate::domain::{
    AverageRgb, BoundingBox, ComplianceGeometry, FaceLighting, FaceRegion, ImageAnalysis,
    PixelBuffer,
};

/// Configuration for the metric analyzer.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Above this many pixels, background sampling switches to a regular stride.
    pub max_samples: usize,
    /// Quality estimator settings.
    pub quality: QualityConfig,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            max_samples: 250_000,
            quality: QualityConfig::default(),
        }
    }
}

/// Computes [`ImageAnalysis`] from pixels and an optional face.
///
/// Pure: the same inputs always produce the same output.
#[derive(Debug, Clone, Default)]
pub struct MetricAnalyzer {
    config: MetricsConfig,
}

impl MetricAnalyzer {
    /// Creates an analyzer with the given configuration.
    #[must_use]
    pub const fn new(config: MetricsConfig) -> Self {
        Self { config }
    }

    /// Measures `pixels`. Pass [`FaceRegion::none`] when no face is known.
    #[must_use]
    pub fn analyze(&self, pixels: &PixelBuffer, face: &FaceRegion) -> ImageAnalysis {
        let (width, height) = (pixels.width(), pixels.height());
        let face_box = face.primary_box();

        let brightness = mean_brightness(pixels);
        let (average, uniformity) = background_stats(pixels, face_box, self.config.max_samples);
        let luma = pixels.to_luma();
        let quality = estimate_quality(&luma, &self.config.quality);
        let colorfulness = colorfulness(pixels, self.config.max_samples);
        let face_lighting = face_box.and_then(|b| face_lighting(&luma, b));
        let geometry = ComplianceGeometry::from_face(face, width, height);

        debug!(
            width,
            height,
            brightness,
            uniformity,
            sharpness = quality.sharpness,
            "Analyzed image metrics"
        );

        ImageAnalysis {
            width,
            height,
            aspect_ratio: f64::from(width) / f64::from(height),
            brightness,
            background_color: average.to_hex(),
            background_uniformity: uniformity,
            quality,
            colorfulness,
            face_lighting,
            geometry,
            face: *face,
        }
    }
}

/// Exact mean of `(R + G + B) / 3` over every pixel.
#[allow(clippy::cast_precision_loss)]
fn mean_brightness(pixels: &PixelBuffer) -> f64 {
    let sum: u64 = pixels
        .as_bytes()
        .chunks_exact(4)
        .map(|p| u64::from(p[0]) + u64::from(p[1]) + u64::from(p[2]))
        .sum();
    sum as f64 / (3.0 * pixels.pixel_count() as f64)
}

/// Mean colour and uniformity of the region outside the face box.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn background_stats(
    pixels: &PixelBuffer,
    face_box: Option<BoundingBox>,
    max_samples: usize,
) -> (AverageRgb, f64) {
    let outside = |x: u32, y: u32| {
        face_box.map_or(true, |b| !b.contains(x as f32 + 0.5, y as f32 + 0.5))
    };
    let mut coords: Vec<(u32, u32)> = sample_grid(pixels, max_samples)
        .filter(|&(x, y)| outside(x, y))
        .collect();
    if coords.is_empty() {
        coords = sample_grid(pixels, max_samples).collect();
    }
    let average = mean_rgb(pixels, &coords);
    let uniformity = 1.0 - (luma_std_dev(pixels, &coords) / 127.5).clamp(0.0, 1.0);
    (average, uniformity)
}

/// Mean RGB over the given coordinates.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn mean_rgb(pixels: &PixelBuffer, coords: &[(u32, u32)]) -> AverageRgb {
    if coords.is_empty() {
        return AverageRgb::default();
    }
    let mut sums = [0u64; 3];
    for &(x, y) in coords {
        let p = pixels.pixel(x, y);
        for (s, v) in sums.iter_mut().zip(p) {
            *s += u64::from(v);
        }
    }
    let n = coords.len() as f64;
    AverageRgb {
        r: sums[0] as f64 / n,
        g: sums[1] as f64 / n,
        b: sums[2] as f64 / n,
    }
}

/// Population standard deviation of unrounded `(R + G + B) / 3` over `coords`.
///
/// Accumulates channel sums in integers so a flat region yields exactly zero.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn luma_std_dev(pixels: &PixelBuffer, coords: &[(u32, u32)]) -> f64 {
    if coords.is_empty() {
        return 0.0;
    }
    let (mut sum, mut sum_sq) = (0u128, 0u128);
    for &(x, y) in coords {
        let s = u128::from(pixels.channel_sum(x, y));
        sum += s;
        sum_sq += s * s;
    }
    let n = coords.len() as u128;
    // n^2 * variance of the channel sum; never negative
    let scaled = n * sum_sq - sum * sum;
    (scaled as f64).sqrt() / n as f64 / 3.0
}

/// Mean `max(R,G,B) - min(R,G,B)` scaled to `0..=100`.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn colorfulness(pixels: &PixelBuffer, max_samples: usize) -> f32 {
    let mut total = 0u64;
    let mut count = 0u64;
    for (x, y) in sample_grid(pixels, max_samples) {
        let [r, g, b, _] = pixels.pixel(x, y);
        let hi = r.max(g).max(b);
        let lo = r.min(g).min(b);
        total += u64::from(hi - lo);
        count += 1;
    }
    if count == 0 {
        return 0.0;
    }
    (total as f64 / count as f64 / 255.0 * 100.0) as f32
}

/// Left/right luma balance inside the face box, clipped to the frame.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn face_lighting(luma: &image::GrayImage, bbox: BoundingBox) -> Option<FaceLighting> {
    let (w, h) = luma.dimensions();
    let x0 = bbox.x.max(0.0).floor() as u32;
    let y0 = bbox.y.max(0.0).floor() as u32;
    let x1 = (bbox.right().ceil().max(0.0) as u32).min(w);
    let y1 = (bbox.bottom().ceil().max(0.0) as u32).min(h);
    if x1 <= x0 + 1 || y1 <= y0 {
        return None;
    }
    let mid = x0 + (x1 - x0) / 2;

    let mut sums = [0u64; 2];
    let mut counts = [0u64; 2];
    for y in y0..y1 {
        for x in x0..x1 {
            let side = usize::from(x >= mid);
            sums[side] += u64::from(luma.get_pixel(x, y).0[0]);
            counts[side] += 1;
        }
    }
    if counts.contains(&0) {
        return None;
    }
    let left = sums[0] as f64 / counts[0] as f64;
    let right = sums[1] as f64 / counts[1] as f64;
    let mean = (sums[0] + sums[1]) as f64 / (counts[0] + counts[1]) as f64;
    let imbalance = (left - right).abs() / left.max(right).max(1.0);
    Some(FaceLighting {
        mean: mean as f32,
        left_mean: left as f32,
        right_mean: right as f32,
        imbalance: imbalance as f32,
    })
}
