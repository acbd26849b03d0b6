//! Image metric analysis.
//!
//! All estimators share the `(R + G + B) / 3` luma definition and ignore alpha.

mod histogram;
mod metrics;
mod quality;

pub use histogram::Histogram;
pub use metrics::{MetricAnalyzer, MetricsConfig};
pub use quality::{estimate_quality, laplacian_variance, noise_sigma, QualityConfig};

pub(crate) use metrics::{luma_std_dev, mean_rgb};

use crate::domain::PixelBuffer;

/// Pixel coordinates visited when sampling, row-major.
///
/// Every pixel up to `max_samples`, then a regular stride in both axes.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub(crate) fn sample_grid(
    pixels: &PixelBuffer,
    max_samples: usize,
) -> impl Iterator<Item = (u32, u32)> {
    let count = pixels.pixel_count();
    let stride = if max_samples == 0 || count <= max_samples {
        1
    } else {
        (count as f64 / max_samples as f64).sqrt().ceil() as usize
    };
    let (w, h) = (pixels.width(), pixels.height());
    (0..h)
        .step_by(stride)
        .flat_map(move |y| (0..w).step_by(stride).map(move |x| (x, y)))
}
