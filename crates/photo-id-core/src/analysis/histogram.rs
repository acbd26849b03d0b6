//! 256-bin luma histogram used by the contrast estimator.

/// 256-bin histogram of luma values.
#[derive(Debug, Clone)]
pub struct Histogram {
    bins: [u64; 256],
    total: u64,
}

impl Histogram {
    /// Builds a histogram from a grayscale image.
    #[must_use]
    pub fn from_luma(image: &image::GrayImage) -> Self {
        Self::from_samples(image.pixels().map(|p| p.0[0]))
    }

    /// Builds a histogram from arbitrary luma samples.
    #[must_use]
    pub fn from_samples(samples: impl IntoIterator<Item = u8>) -> Self {
        let mut bins = [0u64; 256];
        for v in samples {
            bins[usize::from(v)] += 1;
        }
        let total = bins.iter().sum();
        Self { bins, total }
    }

    /// Number of samples.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Luma value below which a fraction `p` (0.0-1.0) of samples fall.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    #[must_use]
    pub fn percentile(&self, p: f64) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let target = ((self.total as f64 * p.clamp(0.0, 1.0)).round() as u64).max(1);
        let mut cumulative = 0u64;
        for (i, &count) in self.bins.iter().enumerate() {
            cumulative += count;
            if cumulative >= target {
                return i as u8;
            }
        }
        255
    }
}
