//! Content moderation gate.
//!
//! Combines classifier labels with built-in heuristics into a
//! [`ModerationResult`]. A blocking verdict overrides every compliance
//! outcome; warnings are advisory.

use tracing::{debug, warn};

use crate::domain::{ModerationResult, PixelBuffer, Severity, Violation};
use crate::ports::{ContentCategory, ContentClassifier, ContentLabel};

/// Code of the violation raised when the classifier cannot be reached.
pub const CLASSIFIER_UNAVAILABLE: &str = "classifier_unavailable";
/// Code of the violation raised for small images.
pub const LOW_RESOLUTION: &str = "low_resolution";

/// Configuration for the moderation gate.
#[derive(Debug, Clone)]
pub struct ModerationConfig {
    /// When false, only the built-in heuristics run.
    pub enabled: bool,
    /// Confidence at which a blocking category blocks.
    pub block_threshold: f32,
    /// Confidence at which any category warns.
    pub warn_threshold: f32,
    /// Shorter side, in pixels, below which a low-resolution notice is raised.
    pub min_resolution: u32,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            block_threshold: 0.7,
            warn_threshold: 0.4,
            min_resolution: 600,
        }
    }
}

/// Screens images for disallowed content.
#[derive(Debug, Clone, Default)]
pub struct ModerationGate {
    config: ModerationConfig,
}

impl ModerationGate {
    /// Creates a gate with the given configuration.
    #[must_use]
    pub const fn new(config: ModerationConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ModerationConfig {
        &self.config
    }

    /// Moderates `pixels`, consulting `classifier` when one is available.
    ///
    /// A classifier failure does not block; it is reported as a warning.
    #[must_use]
    pub fn moderate(
        &self,
        pixels: &PixelBuffer,
        classifier: Option<&dyn ContentClassifier>,
    ) -> ModerationResult {
        let mut violations = Vec::new();

        let short_side = pixels.width().min(pixels.height());
        if short_side < self.config.min_resolution {
            violations.push(Violation {
                code: LOW_RESOLUTION.to_string(),
                label: "Low resolution".to_string(),
                message: format!(
                    "Image is {}x{}; at least {} px on the shorter side is recommended for printing",
                    pixels.width(),
                    pixels.height(),
                    self.config.min_resolution
                ),
                severity: Severity::Warn,
                details: None,
            });
        }

        if self.config.enabled {
            if let Some(classifier) = classifier {
                match classifier.classify(pixels) {
                    Ok(labels) => {
                        violations.extend(labels.iter().filter_map(|l| self.judge(l)));
                    }
                    Err(e) => {
                        warn!(error = %e, "Content classifier failed, continuing without it");
                        violations.push(Violation {
                            code: CLASSIFIER_UNAVAILABLE.to_string(),
                            label: "Content check unavailable".to_string(),
                            message: "Automatic content screening could not run".to_string(),
                            severity: Severity::Warn,
                            details: Some(e.to_string()),
                        });
                    }
                }
            }
        }

        let result = ModerationResult::from_violations(dedup_by_code(violations));
        debug!(allowed = result.allowed, severity = ?result.severity, "{}", result.summary);
        result
    }

    fn judge(&self, label: &ContentLabel) -> Option<Violation> {
        let severity = self.severity_for(label.category, label.confidence)?;
        let message = match severity {
            Severity::Block => format!("{} detected; this photo cannot be used", label.category.label()),
            _ => format!("Possible {} detected", label.category.label().to_lowercase()),
        };
        Some(Violation {
            code: label.category.code().to_string(),
            label: label.category.label().to_string(),
            message,
            severity,
            details: Some(format!("confidence {:.2}", label.confidence)),
        })
    }

    fn severity_for(&self, category: ContentCategory, confidence: f32) -> Option<Severity> {
        if !confidence.is_finite() {
            return None;
        }
        if category.can_block() && confidence >= self.config.block_threshold {
            Some(Severity::Block)
        } else if confidence >= self.config.warn_threshold {
            Some(Severity::Warn)
        } else {
            None
        }
    }
}

/// Keeps the most severe violation per code.
fn dedup_by_code(mut violations: Vec<Violation>) -> Vec<Violation> {
    violations.sort_by(|a, b| a.code.cmp(&b.code).then_with(|| b.severity.cmp(&a.severity)));
    violations.dedup_by(|later, kept| later.code == kept.code);
    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedClassifier(Vec<ContentLabel>);

    impl ContentClassifier for FixedClassifier {
        fn classify(&self, _pixels: &PixelBuffer) -> anyhow::Result<Vec<ContentLabel>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenClassifier;

    impl ContentClassifier for BrokenClassifier {
        fn classify(&self, _pixels: &PixelBuffer) -> anyhow::Result<Vec<ContentLabel>> {
            anyhow::bail!("service offline")
        }
    }

    fn image(w: u32, h: u32) -> PixelBuffer {
        PixelBuffer::filled(w, h, [255, 255, 255, 255]).unwrap_or_else(|e| panic!("{e}"))
    }

    fn label(category: ContentCategory, confidence: f32) -> ContentLabel {
        ContentLabel {
            category,
            confidence,
        }
    }

    #[test]
    fn test_clean_image_passes() {
        let result = ModerationGate::default().moderate(&image(600, 800), None);
        assert!(result.allowed);
        assert_eq!(result.severity, Severity::Pass);
    }

    #[test]
    fn test_low_resolution_warns() {
        let result = ModerationGate::default().moderate(&image(400, 800), None);
        assert!(result.allowed);
        assert_eq!(result.severity, Severity::Warn);
        assert_eq!(result.violations[0].code, LOW_RESOLUTION);
    }

    #[test]
    fn test_confident_explicit_blocks() {
        let classifier = FixedClassifier(vec![
            label(ContentCategory::Explicit, 0.9),
            label(ContentCategory::Weapon, 0.5),
        ]);
        let result = ModerationGate::default().moderate(&image(600, 600), Some(&classifier));
        assert!(!result.allowed);
        assert_eq!(result.severity, Severity::Block);
        assert_eq!(result.violations[0].code, "explicit");
        assert_eq!(result.violations[0].details.as_deref(), Some("confidence 0.90"));
        assert_eq!(result.violations[1].code, "weapon");
    }

    #[test]
    fn test_advisory_category_never_blocks() {
        let classifier = FixedClassifier(vec![label(ContentCategory::Weapon, 0.99)]);
        let result = ModerationGate::default().moderate(&image(600, 600), Some(&classifier));
        assert!(result.allowed);
        assert_eq!(result.severity, Severity::Warn);
    }

    #[test]
    fn test_mid_confidence_block_category_warns() {
        let classifier = FixedClassifier(vec![label(ContentCategory::Violence, 0.5)]);
        let result = ModerationGate::default().moderate(&image(600, 600), Some(&classifier));
        assert!(result.allowed);
        assert_eq!(result.severity, Severity::Warn);
    }

    #[test]
    fn test_low_confidence_ignored() {
        let classifier = FixedClassifier(vec![
            label(ContentCategory::HateSymbol, 0.1),
            label(ContentCategory::Drugs, f32::NAN),
        ]);
        let result = ModerationGate::default().moderate(&image(600, 600), Some(&classifier));
        assert!(result.violations.is_empty());
    }

    #[test]
    fn test_classifier_failure_fails_open() {
        let result = ModerationGate::default().moderate(&image(600, 600), Some(&BrokenClassifier));
        assert!(result.allowed);
        assert_eq!(result.violations[0].code, CLASSIFIER_UNAVAILABLE);
        assert_eq!(result.violations[0].details.as_deref(), Some("service offline"));
    }

    #[test]
    fn test_disabled_skips_classifier() {
        let gate = ModerationGate::new(ModerationConfig {
            enabled: false,
            ..ModerationConfig::default()
        });
        let classifier = FixedClassifier(vec![label(ContentCategory::Explicit, 1.0)]);
        assert!(gate.moderate(&image(600, 600), Some(&classifier)).allowed);
    }

    #[test]
    fn test_duplicate_labels_keep_most_severe() {
        let classifier = FixedClassifier(vec![
            label(ContentCategory::Explicit, 0.5),
            label(ContentCategory::Explicit, 0.95),
        ]);
        let result = ModerationGate::default().moderate(&image(600, 600), Some(&classifier));
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].severity, Severity::Block);
    }
}
