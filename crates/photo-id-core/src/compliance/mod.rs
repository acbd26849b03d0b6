//! Compliance rule engine.
//!
//! Each rule inspects the measurements for one property and emits exactly one
//! [`ComplianceCheck`]. The engine runs every rule against a standard and
//! returns the checks in [`CheckId`] order, so the layout of a report never
//! depends on the image.

mod rules;

use tracing::debug;

pub use rules::{
    default_rules, BackgroundRule, ContentRule, CropMarginsRule, EyePositionRule, FaceRule,
    GrayscaleRule, HeadCenteringRule, HeadPoseRule, HeadSizeRule, LightingRule, SharpnessRule,
};

use crate::domain::{
    BgAnalysis, CheckId, CheckStatus, ComplianceCheck, ComplianceReport, ImageAnalysis,
    ModerationResult, PercentRange, PhotoStandard,
};

/// Thresholds used by the rules.
///
/// `*_warn` is where a warning starts, `*_fail` where failure starts.
#[derive(Debug, Clone)]
pub struct ComplianceConfig {
    /// Percentage points outside a range that still only warn.
    pub range_tolerance: f32,
    /// Horizontal offset (% of width) that starts a warning.
    pub centering_warn: f32,
    /// Horizontal offset (% of width) that fails.
    pub centering_fail: f32,
    /// Head angle in degrees that starts a warning.
    pub pose_warn: f32,
    /// Head angle in degrees that fails.
    pub pose_fail: f32,
    /// Background score below which a non-removed background fails.
    pub background_fail_score: f32,
    /// Left/right face lighting imbalance that starts a warning.
    pub lighting_warn: f32,
    /// Left/right face lighting imbalance that fails.
    pub lighting_fail: f32,
    /// Acceptable mean face luma.
    pub face_brightness: (f32, f32),
    /// Colorfulness below which a colour photo only warns.
    pub colorfulness_warn: f32,
    /// Colorfulness below which a colour photo fails as greyscale.
    pub colorfulness_fail: f32,
    /// Sharpness below which a warning is raised.
    pub sharpness_warn: f32,
    /// Sharpness below which the photo fails.
    pub sharpness_fail: f32,
    /// Space above the crown (% of height) below which a warning is raised.
    pub top_margin_warn: f32,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            range_tolerance: 3.0,
            centering_warn: 5.0,
            centering_fail: 10.0,
            pose_warn: 8.0,
            pose_fail: 15.0,
            background_fail_score: 60.0,
            lighting_warn: 0.15,
            lighting_fail: 0.30,
            face_brightness: (60.0, 230.0),
            colorfulness_warn: 5.0,
            colorfulness_fail: 2.0,
            sharpness_warn: 40.0,
            sharpness_fail: 20.0,
            top_margin_warn: 2.0,
        }
    }
}

impl ComplianceConfig {
    /// Tiers a value against an accepted range: inside passes, within the
    /// tolerance band warns, beyond fails.
    #[must_use]
    pub fn tier_range(&self, value: f32, range: PercentRange) -> CheckStatus {
        let distance = range.distance(value);
        if distance <= 0.0 {
            CheckStatus::Pass
        } else if distance <= self.range_tolerance {
            CheckStatus::Warn
        } else {
            CheckStatus::Fail
        }
    }

    /// Tiers a value where lower is better.
    #[must_use]
    pub fn tier_upper(value: f32, warn: f32, fail: f32) -> CheckStatus {
        if value > fail {
            CheckStatus::Fail
        } else if value > warn {
            CheckStatus::Warn
        } else {
            CheckStatus::Pass
        }
    }

    /// Tiers a value where higher is better.
    #[must_use]
    pub fn tier_lower(value: f32, warn: f32, fail: f32) -> CheckStatus {
        if value < fail {
            CheckStatus::Fail
        } else if value < warn {
            CheckStatus::Warn
        } else {
            CheckStatus::Pass
        }
    }
}

/// Everything a rule may look at.
#[derive(Debug, Clone, Copy)]
pub struct ComplianceInput<'a> {
    /// Standard being checked.
    pub standard: &'a PhotoStandard,
    /// Measurements, with geometry relative to the final crop.
    pub analysis: &'a ImageAnalysis,
    /// Background verdict.
    pub background: &'a BgAnalysis,
    /// Whether the background has already been replaced.
    pub bg_removed: bool,
    /// Moderation verdict.
    pub moderation: &'a ModerationResult,
    /// Thresholds.
    pub config: &'a ComplianceConfig,
}

impl ComplianceInput<'_> {
    /// Whether exactly one usable face is available for geometry checks.
    #[must_use]
    pub fn has_single_face(&self) -> bool {
        self.analysis.face.face_count == 1 && self.analysis.face.primary_box().is_some()
    }
}

/// A single compliance rule.
pub trait ComplianceRule: Send + Sync {
    /// Identifier of the check this rule produces.
    fn id(&self) -> CheckId;

    /// Evaluates the rule. Must not depend on other rules' results.
    fn evaluate(&self, input: &ComplianceInput<'_>) -> ComplianceCheck;
}

/// Runs every rule against a standard.
pub struct ComplianceEngine {
    config: ComplianceConfig,
    rules: Vec<Box<dyn ComplianceRule>>,
}

impl ComplianceEngine {
    /// Creates an engine with the built-in rule set.
    #[must_use]
    pub fn new(config: ComplianceConfig) -> Self {
        Self::with_rules(config, default_rules())
    }

    /// Creates an engine with a custom rule set.
    #[must_use]
    pub fn with_rules(config: ComplianceConfig, mut rules: Vec<Box<dyn ComplianceRule>>) -> Self {
        rules.sort_by_key(|r| r.id());
        Self { config, rules }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ComplianceConfig {
        &self.config
    }

    /// Evaluates the image against `standard`.
    #[must_use]
    pub fn evaluate(
        &self,
        standard: &PhotoStandard,
        analysis: &ImageAnalysis,
        background: &BgAnalysis,
        bg_removed: bool,
        moderation: &ModerationResult,
    ) -> ComplianceReport {
        let input = ComplianceInput {
            standard,
            analysis,
            background,
            bg_removed,
            moderation,
            config: &self.config,
        };
        let checks: Vec<ComplianceCheck> = self
            .rules
            .iter()
            .map(|rule| {
                let check = rule.evaluate(&input);
                debug!(check = %check.id, status = ?check.status, "{}", check.message);
                check
            })
            .collect();
        ComplianceReport::new(standard.id, checks)
    }
}

impl Default for ComplianceEngine {
    fn default() -> Self {
        Self::new(ComplianceConfig::default())
    }
}

impl std::fmt::Debug for ComplianceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<CheckId> = self.rules.iter().map(|r| r.id()).collect();
        f.debug_struct("ComplianceEngine")
            .field("config", &self.config)
            .field("rules", &ids)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::domain::{
        standard_by_id, AverageRgb, BoundingBox, ComplianceGeometry, FaceLighting, FaceRegion,
        Landmarks, Point, QualityMetrics, Rotation, Severity, Violation,
    };

    fn us() -> &'static PhotoStandard {
        standard_by_id("us-passport").expect("known standard")
    }

    fn good_analysis() -> ImageAnalysis {
        let face = FaceRegion::single(BoundingBox::new(200.0, 150.0, 200.0, 250.0), 0.97)
            .with_landmarks(Landmarks {
                left_eye: Some(Point::new(250.0, 250.0)),
                right_eye: Some(Point::new(350.0, 250.0)),
                ..Landmarks::default()
            });
        ImageAnalysis {
            width: 600,
            height: 600,
            aspect_ratio: 1.0,
            brightness: 180.0,
            background_color: "#FFFFFF".to_string(),
            background_uniformity: 1.0,
            quality: QualityMetrics {
                sharpness: 80.0,
                noise: 5.0,
                contrast: 70.0,
                overall: 80.0,
            },
            colorfulness: 20.0,
            face_lighting: Some(FaceLighting {
                mean: 150.0,
                left_mean: 152.0,
                right_mean: 148.0,
                imbalance: 0.026,
            }),
            geometry: ComplianceGeometry {
                eye_line_percent: 62.0,
                head_height_percent: 60.0,
                top_margin_percent: 8.0,
                bottom_margin_percent: 32.0,
                horizontal_offset_percent: 0.0,
            },
            face,
        }
    }

    fn white_bg() -> BgAnalysis {
        BgAnalysis {
            score: 98.0,
            average_rgb: AverageRgb {
                r: 250.0,
                g: 250.0,
                b: 250.0,
            },
            needs_removal: false,
            reason: "Background is white and uniform".to_string(),
        }
    }

    fn dark_bg(score: f32) -> BgAnalysis {
        BgAnalysis {
            score,
            average_rgb: AverageRgb::default(),
            needs_removal: true,
            reason: "Background is too dark or colored".to_string(),
        }
    }

    fn evaluate(analysis: &ImageAnalysis, bg: &BgAnalysis, removed: bool) -> ComplianceReport {
        ComplianceEngine::default().evaluate(us(), analysis, bg, removed, &ModerationResult::passed())
    }

    #[test]
    fn test_compliant_photo_is_ready() {
        let report = evaluate(&good_analysis(), &white_bg(), false);
        let failing: Vec<_> = report
            .checks
            .iter()
            .filter(|c| c.status != CheckStatus::Pass)
            .collect();
        assert!(failing.is_empty(), "{failing:?}");
        assert!(report.ready_to_print);
        assert_eq!(report.standard_id, "us-passport");
    }

    #[test]
    fn test_check_order_is_stable() {
        let expected = vec![
            CheckId::Face,
            CheckId::HeadSize,
            CheckId::EyePosition,
            CheckId::HeadCentering,
            CheckId::HeadPose,
            CheckId::Background,
            CheckId::Lighting,
            CheckId::Grayscale,
            CheckId::Sharpness,
            CheckId::CropMargins,
            CheckId::Content,
        ];
        let mut no_face = good_analysis();
        no_face.face = FaceRegion::none();
        for analysis in [good_analysis(), no_face] {
            let ids: Vec<CheckId> = evaluate(&analysis, &white_bg(), false)
                .checks
                .iter()
                .map(|c| c.id)
                .collect();
            assert_eq!(ids, expected);
        }
    }

    #[test]
    fn test_no_face_fails_and_geometry_pending() {
        let mut analysis = good_analysis();
        analysis.face = FaceRegion::none();
        analysis.geometry = ComplianceGeometry::default();
        let report = evaluate(&analysis, &white_bg(), false);
        assert_eq!(report.status(CheckId::Face), Some(CheckStatus::Fail));
        assert_eq!(report.status(CheckId::HeadSize), Some(CheckStatus::Pending));
        assert_eq!(report.status(CheckId::EyePosition), Some(CheckStatus::Pending));
        assert_eq!(report.status(CheckId::CropMargins), Some(CheckStatus::Pending));
        assert!(!report.ready_to_print);
    }

    #[test]
    fn test_multiple_faces_fail() {
        let mut analysis = good_analysis();
        analysis.face.face_count = 2;
        let report = evaluate(&analysis, &white_bg(), false);
        let face = report.check(CheckId::Face).expect("face check");
        assert_eq!(face.status, CheckStatus::Fail);
        assert!(face.message.contains('2'));
        assert_eq!(report.status(CheckId::HeadSize), Some(CheckStatus::Pending));
    }

    #[test]
    fn test_background_passes_after_removal() {
        let analysis = good_analysis();
        let bg = dark_bg(30.0);
        let before = evaluate(&analysis, &bg, false);
        assert_eq!(before.status(CheckId::Background), Some(CheckStatus::Fail));

        let after = evaluate(&analysis, &bg, true);
        assert_eq!(after.status(CheckId::Background), Some(CheckStatus::Pass));
    }

    #[test]
    fn test_background_warns_on_middling_score() {
        let report = evaluate(&good_analysis(), &dark_bg(65.0), false);
        assert_eq!(report.status(CheckId::Background), Some(CheckStatus::Warn));
    }

    #[test]
    fn test_light_grey_standard_still_needs_removal() {
        let uk = standard_by_id("uk-passport").expect("known standard");
        let report = ComplianceEngine::default().evaluate(
            uk,
            &good_analysis(),
            &dark_bg(75.0),
            false,
            &ModerationResult::passed(),
        );
        let check = report.check(CheckId::Background).expect("background check");
        assert_eq!(check.status, CheckStatus::Warn);
        assert!(check.message.contains(uk.background.label()));
        assert!(!report.ready_to_print);
    }

    #[test]
    fn test_head_size_tiers() {
        let mut analysis = good_analysis();
        analysis.geometry.head_height_percent = 70.5;
        assert_eq!(
            evaluate(&analysis, &white_bg(), false).status(CheckId::HeadSize),
            Some(CheckStatus::Warn)
        );
        analysis.geometry.head_height_percent = 80.0;
        let report = evaluate(&analysis, &white_bg(), false);
        let check = report.check(CheckId::HeadSize).expect("head size check");
        assert_eq!(check.status, CheckStatus::Fail);
        assert!(check.message.contains("too large"));
    }

    #[test]
    fn test_eye_position_too_low() {
        let mut analysis = good_analysis();
        analysis.geometry.eye_line_percent = 40.0;
        let report = evaluate(&analysis, &white_bg(), false);
        let check = report.check(CheckId::EyePosition).expect("eye check");
        assert_eq!(check.status, CheckStatus::Fail);
        assert!(check.message.contains("too low"));
    }

    #[test]
    fn test_head_pose_uses_rotation() {
        let mut analysis = good_analysis();
        analysis.face = analysis.face.with_rotation(Rotation {
            pitch: 2.0,
            yaw: -12.0,
            roll: 1.0,
        });
        let report = evaluate(&analysis, &white_bg(), false);
        let check = report.check(CheckId::HeadPose).expect("pose check");
        assert_eq!(check.status, CheckStatus::Warn);
        assert!(check.message.contains("turned"));
    }

    #[test]
    fn test_head_pose_pending_without_angles() {
        let mut analysis = good_analysis();
        analysis.face.landmarks = None;
        let report = evaluate(&analysis, &white_bg(), false);
        assert_eq!(report.status(CheckId::HeadPose), Some(CheckStatus::Pending));
    }

    #[test]
    fn test_uneven_lighting_fails() {
        let mut analysis = good_analysis();
        analysis.face_lighting = Some(FaceLighting {
            mean: 120.0,
            left_mean: 180.0,
            right_mean: 60.0,
            imbalance: 0.67,
        });
        let report = evaluate(&analysis, &white_bg(), false);
        let check = report.check(CheckId::Lighting).expect("lighting check");
        assert_eq!(check.status, CheckStatus::Fail);
        assert!(check.message.contains("left"));
    }

    #[test]
    fn test_grayscale_fails_for_color_standard() {
        let mut analysis = good_analysis();
        analysis.colorfulness = 0.5;
        let report = evaluate(&analysis, &white_bg(), false);
        assert_eq!(report.status(CheckId::Grayscale), Some(CheckStatus::Fail));
    }

    #[test]
    fn test_head_cut_off_fails_margins() {
        let mut analysis = good_analysis();
        analysis.geometry.top_margin_percent = 0.0;
        let report = evaluate(&analysis, &white_bg(), false);
        assert_eq!(report.status(CheckId::CropMargins), Some(CheckStatus::Fail));
    }

    #[test]
    fn test_moderation_block_fails_content() {
        let moderation = ModerationResult::from_violations(vec![Violation {
            code: "violence".to_string(),
            label: "Violent content".to_string(),
            message: String::new(),
            severity: Severity::Block,
            details: None,
        }]);
        let report = ComplianceEngine::default().evaluate(
            us(),
            &good_analysis(),
            &white_bg(),
            false,
            &moderation,
        );
        assert_eq!(report.status(CheckId::Content), Some(CheckStatus::Fail));
        assert!(!report.ready_to_print);
    }

    #[test]
    fn test_evaluation_is_pure() {
        let engine = ComplianceEngine::default();
        let analysis = good_analysis();
        let moderation = ModerationResult::passed();
        let uk = standard_by_id("uk-passport").expect("known standard");
        let first = engine.evaluate(us(), &analysis, &white_bg(), false, &moderation);
        let _ = engine.evaluate(uk, &analysis, &dark_bg(10.0), false, &moderation);
        let again = engine.evaluate(us(), &analysis, &white_bg(), false, &moderation);
        assert_eq!(first, again);
    }

    #[test]
    fn test_custom_rules_are_sorted() {
        let engine = ComplianceEngine::with_rules(
            ComplianceConfig::default(),
            vec![Box::new(SharpnessRule), Box::new(FaceRule)],
        );
        let report = engine.evaluate(
            us(),
            &good_analysis(),
            &white_bg(),
            false,
            &ModerationResult::passed(),
        );
        let ids: Vec<CheckId> = report.checks.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![CheckId::Face, CheckId::Sharpness]);
    }

    #[test]
    fn test_range_tiering() {
        let cfg = ComplianceConfig::default();
        let range = PercentRange::new(50.0, 60.0);
        assert_eq!(cfg.tier_range(55.0, range), CheckStatus::Pass);
        assert_eq!(cfg.tier_range(47.5, range), CheckStatus::Warn);
        assert_eq!(cfg.tier_range(63.0, range), CheckStatus::Warn);
        assert_eq!(cfg.tier_range(63.5, range), CheckStatus::Fail);
    }
}
