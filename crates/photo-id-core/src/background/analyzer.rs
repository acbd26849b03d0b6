//! Background analyzer.
//!
//! Scores how close the region around the subject is to a flat white
//! backdrop. The subject is excluded using the face box, widened and
//! extended down to the bottom edge to cover shoulders.

use tracing::{debug, warn};

use crate::analysis::{luma_std_dev, mean_rgb, sample_grid};
use crate::domain::{AverageRgb, BgAnalysis, BoundingBox, FaceRegion, PixelBuffer};
use crate::ports::PixelSource;

/// Configuration for background scoring.
#[derive(Debug, Clone)]
pub struct BackgroundConfig {
    /// Scores below this need removal.
    pub accept_threshold: f32,
    /// Fraction of the face box added on the left, right and top of the exclusion.
    pub subject_margin: f32,
    /// Luma standard deviation at which texture saturates.
    pub texture_scale: f64,
    /// Weight of whiteness in the score; texture gets the rest.
    pub whiteness_weight: f64,
    /// Above this many pixels, sampling switches to a regular stride.
    pub max_samples: usize,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            accept_threshold: 80.0,
            subject_margin: 0.25,
            texture_scale: 40.0,
            whiteness_weight: 0.6,
            max_samples: 250_000,
        }
    }
}

/// Decides whether a background needs automated removal.
#[derive(Debug, Clone, Default)]
pub struct BackgroundAnalyzer {
    config: BackgroundConfig,
}

impl BackgroundAnalyzer {
    /// Creates an analyzer with the given configuration.
    #[must_use]
    pub const fn new(config: BackgroundConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &BackgroundConfig {
        &self.config
    }

    /// Scores the background of `source`.
    ///
    /// Falls back to [`BgAnalysis::unreadable`] when the source has no readable pixels.
    #[must_use]
    pub fn analyze(&self, source: &dyn PixelSource, face: &FaceRegion) -> BgAnalysis {
        match source.pixels() {
            Some(pixels) => self.analyze_pixels(pixels, face),
            None => {
                warn!("Pixel source unreadable, assuming background needs removal");
                BgAnalysis::unreadable()
            }
        }
    }

    /// Scores the background of a pixel buffer.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn analyze_pixels(&self, pixels: &PixelBuffer, face: &FaceRegion) -> BgAnalysis {
        let subject = face.primary_box().map(|b| self.subject_region(b, pixels.height()));
        let outside = |x: u32, y: u32| {
            subject.map_or(true, |s| !s.contains(x as f32 + 0.5, y as f32 + 0.5))
        };

        let mut coords: Vec<(u32, u32)> = sample_grid(pixels, self.config.max_samples)
            .filter(|&(x, y)| outside(x, y))
            .collect();
        if coords.is_empty() {
            coords = sample_grid(pixels, self.config.max_samples).collect();
        }

        let average = mean_rgb(pixels, &coords);

        let whiteness = whiteness(&average);
        let texture = (luma_std_dev(pixels, &coords) / self.config.texture_scale).min(1.0);
        let w = self.config.whiteness_weight;
        let score = (100.0 * (w * whiteness + (1.0 - w) * (1.0 - texture))).clamp(0.0, 100.0);
        let score = score as f32;

        let needs_removal = score < self.config.accept_threshold;
        let reason = if !needs_removal {
            "Background is white and uniform"
        } else if w * (1.0 - whiteness) >= (1.0 - w) * texture {
            "Background is too dark or colored"
        } else {
            "Background is not uniform"
        };

        debug!(
            score,
            whiteness,
            texture,
            samples = coords.len(),
            "Scored background"
        );

        BgAnalysis {
            score,
            average_rgb: average,
            needs_removal,
            reason: reason.to_string(),
        }
    }

    /// The face box widened by the subject margin and extended to the bottom edge.
    #[allow(clippy::cast_precision_loss)]
    fn subject_region(&self, face: BoundingBox, height: u32) -> BoundingBox {
        let dx = face.w * self.config.subject_margin;
        let dy = face.h * self.config.subject_margin;
        let top = face.y - dy;
        BoundingBox::new(face.x - dx, top, face.w + 2.0 * dx, (height as f32 - top).max(0.0))
    }
}

/// `1 - distance(mean, white) / max distance`, in `0..=1`.
fn whiteness(rgb: &AverageRgb) -> f64 {
    let max = 255.0 * 3.0_f64.sqrt();
    let d = ((255.0 - rgb.r).powi(2) + (255.0 - rgb.g).powi(2) + (255.0 - rgb.b).powi(2)).sqrt();
    (1.0 - d / max).clamp(0.0, 1.0)
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::domain::UNREADABLE_REASON;

    fn uniform(rgb: [u8; 3]) -> PixelBuffer {
        PixelBuffer::filled(60, 80, [rgb[0], rgb[1], rgb[2], 255]).expect("valid dims")
    }

    fn striped(contrast: u8) -> PixelBuffer {
        let img = image::RgbaImage::from_fn(60, 80, |x, _| {
            let v = if x % 2 == 0 { 255 } else { 255 - contrast };
            image::Rgba([v, v, v, 255])
        });
        PixelBuffer::from_rgba(img).expect("valid dims")
    }

    #[test]
    fn test_white_background_accepted() {
        let bg = BackgroundAnalyzer::default().analyze(&uniform([255; 3]), &FaceRegion::none());
        assert!((bg.score - 100.0).abs() < 1e-4);
        assert!(!bg.needs_removal);
        assert_eq!(bg.reason, "Background is white and uniform");
    }

    #[test]
    fn test_colored_background_needs_removal() {
        let bg = BackgroundAnalyzer::default().analyze(&uniform([40, 90, 160]), &FaceRegion::none());
        assert!(bg.needs_removal);
        assert_eq!(bg.reason, "Background is too dark or colored");
    }

    #[test]
    fn test_textured_background_needs_removal() {
        let bg = BackgroundAnalyzer::default().analyze(&striped(200), &FaceRegion::none());
        assert!(bg.needs_removal);
        assert_eq!(bg.reason, "Background is not uniform");
    }

    #[test]
    fn test_score_monotonic_in_distance_from_white() {
        let analyzer = BackgroundAnalyzer::default();
        let scores: Vec<f32> = [255u8, 220, 180, 120, 60, 0]
            .iter()
            .map(|&v| analyzer.analyze(&uniform([v; 3]), &FaceRegion::none()).score)
            .collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]), "{scores:?}");
    }

    #[test]
    fn test_score_monotonic_in_variance() {
        let analyzer = BackgroundAnalyzer::default();
        let scores: Vec<f32> = [0u8, 10, 40, 80, 160]
            .iter()
            .map(|&c| analyzer.analyze(&striped(c), &FaceRegion::none()).score)
            .collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]), "{scores:?}");
        assert!(scores.iter().all(|s| (0.0..=100.0).contains(s)));
    }

    #[test]
    fn test_faint_texture_lowers_score() {
        let analyzer = BackgroundAnalyzer::default();
        let flat = analyzer.analyze(&uniform([200; 3]), &FaceRegion::none());
        let img = image::RgbaImage::from_fn(60, 80, |x, _| {
            let b = if x % 2 == 0 { 200 } else { 201 };
            image::Rgba([200, 200, b, 255])
        });
        let faint = PixelBuffer::from_rgba(img).expect("valid dims");
        let textured = analyzer.analyze(&faint, &FaceRegion::none());
        assert!(textured.score < flat.score, "{} vs {}", textured.score, flat.score);
    }

    #[test]
    fn test_subject_is_excluded() {
        // white backdrop with a dark subject from the face down to the bottom
        let img = image::RgbaImage::from_fn(100, 120, |x, y| {
            if (35..65).contains(&x) && y >= 36 {
                image::Rgba([50, 40, 30, 255])
            } else {
                image::Rgba([255, 255, 255, 255])
            }
        });
        let pixels = PixelBuffer::from_rgba(img).expect("valid dims");
        let face = FaceRegion::single(BoundingBox::new(40.0, 40.0, 20.0, 24.0), 0.9);
        let bg = BackgroundAnalyzer::default().analyze(&pixels, &face);
        assert!(!bg.needs_removal, "score {}", bg.score);
        assert_eq!(bg.average_rgb.to_hex(), "#FFFFFF");
    }

    #[test]
    fn test_unreadable_source_degrades() {
        let source: Option<PixelBuffer> = None;
        let bg = BackgroundAnalyzer::default().analyze(&source, &FaceRegion::none());
        assert!(bg.needs_removal);
        assert!(bg.score.abs() < f32::EPSILON);
        assert_eq!(bg.reason, UNREADABLE_REASON);
    }
}
