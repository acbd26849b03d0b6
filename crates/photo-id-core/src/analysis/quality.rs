//! Sharpness, noise and contrast estimators.
//!
//! Sharpness is the variance of a 3×3 Laplacian response, mapped onto
//! `0..=100` with a saturating exponential. Noise is Immerkær's fast sigma
//! estimate. Contrast is the 5th-95th percentile luma spread. Large frames
//! are downscaled first so the estimators run in bounded time.

use std::borrow::Cow;

use image::imageops::{self, FilterType};
use image::GrayImage;

use super::Histogram;
use crate::domain::QualityMetrics;

/// Configuration for quality estimation.
#[derive(Debug, Clone)]
pub struct QualityConfig {
    /// Longest side after downscaling.
    pub max_dimension: u32,
    /// Laplacian variance at which sharpness reaches ~63.
    pub sharpness_scale: f64,
    /// Noise sigma mapped to a score of 100.
    pub noise_ceiling: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            max_dimension: 512,
            sharpness_scale: 500.0,
            noise_ceiling: 20.0,
        }
    }
}

/// Estimates quality metrics from a luma plane.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn estimate_quality(luma: &GrayImage, config: &QualityConfig) -> QualityMetrics {
    let luma = downscale(luma, config.max_dimension);

    let variance = laplacian_variance(&luma);
    let sharpness = 100.0 * (1.0 - (-variance / config.sharpness_scale).exp());
    let noise = (noise_sigma(&luma) / config.noise_ceiling * 100.0).clamp(0.0, 100.0);

    let hist = Histogram::from_luma(&luma);
    let spread = f64::from(hist.percentile(0.95)) - f64::from(hist.percentile(0.05));
    let contrast = (spread.max(0.0) / 255.0 * 100.0).clamp(0.0, 100.0);

    let overall = 0.4 * sharpness + 0.3 * contrast + 0.3 * (100.0 - noise);

    QualityMetrics {
        sharpness: sharpness.clamp(0.0, 100.0) as f32,
        noise: noise as f32,
        contrast: contrast as f32,
        overall: overall.clamp(0.0, 100.0) as f32,
    }
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn downscale(luma: &GrayImage, max_dimension: u32) -> Cow<'_, GrayImage> {
    let (w, h) = luma.dimensions();
    let longest = w.max(h);
    if longest <= max_dimension || max_dimension == 0 {
        return Cow::Borrowed(luma);
    }
    let scale = f64::from(max_dimension) / f64::from(longest);
    let nw = (f64::from(w) * scale).round().max(1.0) as u32;
    let nh = (f64::from(h) * scale).round().max(1.0) as u32;
    Cow::Owned(imageops::resize(luma, nw, nh, FilterType::Triangle))
}

/// Variance of the 4-neighbour Laplacian over interior pixels.
///
/// Returns 0 for frames smaller than 3×3.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn laplacian_variance(luma: &GrayImage) -> f64 {
    let (w, h) = luma.dimensions();
    if w < 3 || h < 3 {
        return 0.0;
    }
    let at = |x: u32, y: u32| f64::from(luma.get_pixel(x, y).0[0]);

    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let v = at(x, y - 1) + at(x - 1, y) + at(x + 1, y) + at(x, y + 1) - 4.0 * at(x, y);
            sum += v;
            sum_sq += v * v;
        }
    }
    let n = f64::from(w - 2) * f64::from(h - 2);
    let mean = sum / n;
    (sum_sq / n - mean * mean).max(0.0)
}

/// Immerkær fast noise variance estimate, returned as a standard deviation.
///
/// Returns 0 for frames smaller than 3×3.
#[must_use]
pub fn noise_sigma(luma: &GrayImage) -> f64 {
    const KERNEL: [[f64; 3]; 3] = [[1.0, -2.0, 1.0], [-2.0, 4.0, -2.0], [1.0, -2.0, 1.0]];

    let (w, h) = luma.dimensions();
    if w < 3 || h < 3 {
        return 0.0;
    }
    let mut total = 0.0;
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let mut acc = 0.0;
            for (ky, row) in KERNEL.iter().enumerate() {
                for (kx, k) in row.iter().enumerate() {
                    // kx, ky are 0..3
                    #[allow(clippy::cast_possible_truncation)]
                    let (px, py) = (x + kx as u32 - 1, y + ky as u32 - 1);
                    acc += k * f64::from(luma.get_pixel(px, py).0[0]);
                }
            }
            total += acc.abs();
        }
    }
    let n = 6.0 * f64::from(w - 2) * f64::from(h - 2);
    (std::f64::consts::FRAC_PI_2).sqrt() * total / n
}
