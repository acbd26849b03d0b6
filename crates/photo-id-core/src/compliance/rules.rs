//! Built-in compliance rules.

use super::{ComplianceConfig, ComplianceInput, ComplianceRule};
use crate::domain::{CheckId, CheckStatus, ComplianceCheck, PercentRange, Severity};

/// All built-in rules, in report order.
#[must_use]
pub fn default_rules() -> Vec<Box<dyn ComplianceRule>> {
    vec![
        Box::new(FaceRule),
        Box::new(HeadSizeRule),
        Box::new(EyePositionRule),
        Box::new(HeadCenteringRule),
        Box::new(HeadPoseRule),
        Box::new(BackgroundRule),
        Box::new(LightingRule),
        Box::new(GrayscaleRule),
        Box::new(SharpnessRule),
        Box::new(CropMarginsRule),
        Box::new(ContentRule),
    ]
}

fn no_face(id: CheckId) -> ComplianceCheck {
    ComplianceCheck::pending(id, "Waiting for a single detected face")
}

fn range_text(range: PercentRange) -> String {
    format!("{:.0}-{:.0}%", range.min, range.max)
}

/// Exactly one face must be present.
#[derive(Debug, Clone, Copy, Default)]
pub struct FaceRule;

impl ComplianceRule for FaceRule {
    fn id(&self) -> CheckId {
        CheckId::Face
    }

    fn evaluate(&self, input: &ComplianceInput<'_>) -> ComplianceCheck {
        match input.analysis.face.face_count {
            0 => ComplianceCheck::fail(self.id(), "No face detected"),
            1 => ComplianceCheck::pass(self.id(), "One face detected"),
            n => ComplianceCheck::fail(
                self.id(),
                format!("{n} faces detected, only one person may appear"),
            ),
        }
    }
}

/// Crown-to-chin height within the standard's range.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadSizeRule;

impl ComplianceRule for HeadSizeRule {
    fn id(&self) -> CheckId {
        CheckId::HeadSize
    }

    fn evaluate(&self, input: &ComplianceInput<'_>) -> ComplianceCheck {
        if !input.has_single_face() {
            return no_face(self.id());
        }
        let value = input.analysis.geometry.head_height_percent;
        let range = input.standard.head_height;
        let status = input.config.tier_range(value, range);
        let message = match status {
            CheckStatus::Pass => format!("Head height {value:.0}% (required {})", range_text(range)),
            _ if value < range.min => format!(
                "Head too small: {value:.0}% (required {}), move closer",
                range_text(range)
            ),
            _ => format!(
                "Head too large: {value:.0}% (required {}), move back",
                range_text(range)
            ),
        };
        ComplianceCheck::new(self.id(), status, message)
    }
}

/// Eye line within the standard's range, measured from the bottom.
#[derive(Debug, Clone, Copy, Default)]
pub struct EyePositionRule;

impl ComplianceRule for EyePositionRule {
    fn id(&self) -> CheckId {
        CheckId::EyePosition
    }

    fn evaluate(&self, input: &ComplianceInput<'_>) -> ComplianceCheck {
        if !input.has_single_face() {
            return no_face(self.id());
        }
        let value = input.analysis.geometry.eye_line_percent;
        let range = input.standard.eye_line;
        let status = input.config.tier_range(value, range);
        let message = match status {
            CheckStatus::Pass => format!(
                "Eyes at {value:.0}% from the bottom (required {})",
                range_text(range)
            ),
            _ if value < range.min => format!(
                "Eyes too low: {value:.0}% from the bottom (required {})",
                range_text(range)
            ),
            _ => format!(
                "Eyes too high: {value:.0}% from the bottom (required {})",
                range_text(range)
            ),
        };
        ComplianceCheck::new(self.id(), status, message)
    }
}

/// Face horizontally centred.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadCenteringRule;

impl ComplianceRule for HeadCenteringRule {
    fn id(&self) -> CheckId {
        CheckId::HeadCentering
    }

    fn evaluate(&self, input: &ComplianceInput<'_>) -> ComplianceCheck {
        if !input.has_single_face() {
            return no_face(self.id());
        }
        let offset = input.analysis.geometry.horizontal_offset_percent;
        let status =
            ComplianceConfig::tier_upper(offset, input.config.centering_warn, input.config.centering_fail);
        let message = if status == CheckStatus::Pass {
            "Head is centered".to_string()
        } else {
            format!("Head is {offset:.0}% off center")
        };
        ComplianceCheck::new(self.id(), status, message)
    }
}

/// Head facing the camera without tilt.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadPoseRule;

impl ComplianceRule for HeadPoseRule {
    fn id(&self) -> CheckId {
        CheckId::HeadPose
    }

    fn evaluate(&self, input: &ComplianceInput<'_>) -> ComplianceCheck {
        if !input.has_single_face() {
            return no_face(self.id());
        }
        let face = &input.analysis.face;
        let (angle, what) = if let Some(r) = face.rotation {
            [(r.roll, "tilted"), (r.yaw, "turned"), (r.pitch, "tipped")]
                .into_iter()
                .map(|(a, w)| (a.abs(), w))
                .fold((0.0_f32, "tilted"), |best, cur| if cur.0 > best.0 { cur } else { best })
        } else if let Some(roll) = face.landmarks.and_then(|l| l.eye_roll_degrees()) {
            (roll.abs(), "tilted")
        } else {
            return ComplianceCheck::pending(self.id(), "Head angle unavailable");
        };
        let status = ComplianceConfig::tier_upper(angle, input.config.pose_warn, input.config.pose_fail);
        let message = if status == CheckStatus::Pass {
            "Head is straight".to_string()
        } else {
            format!("Head is {what} by {angle:.0}°")
        };
        ComplianceCheck::new(self.id(), status, message)
    }
}

/// Background acceptable or already replaced.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackgroundRule;

impl ComplianceRule for BackgroundRule {
    fn id(&self) -> CheckId {
        CheckId::Background
    }

    fn evaluate(&self, input: &ComplianceInput<'_>) -> ComplianceCheck {
        let bg = input.background;
        let class = input.standard.background;
        if input.bg_removed {
            return ComplianceCheck::pass(self.id(), "Background replaced with white");
        }
        if !bg.needs_removal {
            return ComplianceCheck::pass(
                self.id(),
                format!("Background is acceptable ({})", class.label()),
            );
        }
        let message = format!(
            "{} (score {:.0}), {} background required",
            bg.reason,
            bg.score,
            class.label()
        );
        if bg.score >= input.config.background_fail_score {
            ComplianceCheck::warn(self.id(), message)
        } else {
            ComplianceCheck::fail(self.id(), message)
        }
    }
}

/// Even, adequate lighting on the face.
#[derive(Debug, Clone, Copy, Default)]
pub struct LightingRule;

impl ComplianceRule for LightingRule {
    fn id(&self) -> CheckId {
        CheckId::Lighting
    }

    fn evaluate(&self, input: &ComplianceInput<'_>) -> ComplianceCheck {
        if !input.has_single_face() {
            return no_face(self.id());
        }
        let Some(lighting) = input.analysis.face_lighting else {
            return ComplianceCheck::pending(self.id(), "Face lighting unavailable");
        };
        let cfg = input.config;
        let balance =
            ComplianceConfig::tier_upper(lighting.imbalance, cfg.lighting_warn, cfg.lighting_fail);
        let (lo, hi) = cfg.face_brightness;
        let exposure = if (lo..=hi).contains(&lighting.mean) {
            CheckStatus::Pass
        } else {
            CheckStatus::Warn
        };

        if balance != CheckStatus::Pass {
            let brighter = if lighting.left_mean > lighting.right_mean {
                "left"
            } else {
                "right"
            };
            return ComplianceCheck::new(
                self.id(),
                balance,
                format!(
                    "Uneven lighting, the {brighter} side of the face is {:.0}% brighter",
                    lighting.imbalance * 100.0
                ),
            );
        }
        if exposure != CheckStatus::Pass {
            let message = if lighting.mean < lo {
                "Face is too dark"
            } else {
                "Face is overexposed"
            };
            return ComplianceCheck::warn(self.id(), message);
        }
        ComplianceCheck::pass(self.id(), "Face is evenly lit")
    }
}

/// Colour photo where colour is required.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrayscaleRule;

impl ComplianceRule for GrayscaleRule {
    fn id(&self) -> CheckId {
        CheckId::Grayscale
    }

    fn evaluate(&self, input: &ComplianceInput<'_>) -> ComplianceCheck {
        if !input.standard.requires_color {
            return ComplianceCheck::pass(self.id(), "Color not required");
        }
        let c = input.analysis.colorfulness;
        match ComplianceConfig::tier_lower(c, input.config.colorfulness_warn, input.config.colorfulness_fail)
        {
            CheckStatus::Fail => {
                ComplianceCheck::fail(self.id(), "Photo appears to be black and white")
            }
            CheckStatus::Warn => {
                ComplianceCheck::warn(self.id(), "Colors are very muted, check the photo is in color")
            }
            _ => ComplianceCheck::pass(self.id(), "Photo is in color"),
        }
    }
}

/// Image in focus.
#[derive(Debug, Clone, Copy, Default)]
pub struct SharpnessRule;

impl ComplianceRule for SharpnessRule {
    fn id(&self) -> CheckId {
        CheckId::Sharpness
    }

    fn evaluate(&self, input: &ComplianceInput<'_>) -> ComplianceCheck {
        let s = input.analysis.quality.sharpness;
        let status = ComplianceConfig::tier_lower(s, input.config.sharpness_warn, input.config.sharpness_fail);
        let message = match status {
            CheckStatus::Pass => format!("Photo is sharp ({s:.0})"),
            CheckStatus::Warn => format!("Photo is slightly soft ({s:.0})"),
            _ => format!("Photo is blurry ({s:.0})"),
        };
        ComplianceCheck::new(self.id(), status, message)
    }
}

/// Head fully inside the frame with room above.
#[derive(Debug, Clone, Copy, Default)]
pub struct CropMarginsRule;

impl ComplianceRule for CropMarginsRule {
    fn id(&self) -> CheckId {
        CheckId::CropMargins
    }

    fn evaluate(&self, input: &ComplianceInput<'_>) -> ComplianceCheck {
        if !input.has_single_face() {
            return no_face(self.id());
        }
        let g = &input.analysis.geometry;
        if g.top_margin_percent <= 0.0 {
            ComplianceCheck::fail(self.id(), "Top of the head is cut off")
        } else if g.bottom_margin_percent <= 0.0 {
            ComplianceCheck::fail(self.id(), "Chin is outside the frame")
        } else if g.top_margin_percent < input.config.top_margin_warn {
            ComplianceCheck::warn(self.id(), "Very little space above the head")
        } else {
            ComplianceCheck::pass(self.id(), "Head fits within the frame")
        }
    }
}

/// Mirrors the moderation verdict.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentRule;

impl ComplianceRule for ContentRule {
    fn id(&self) -> CheckId {
        CheckId::Content
    }

    fn evaluate(&self, input: &ComplianceInput<'_>) -> ComplianceCheck {
        let m = input.moderation;
        match m.severity {
            Severity::Pass => ComplianceCheck::pass(self.id(), "No content issues"),
            Severity::Warn => ComplianceCheck::warn(self.id(), m.summary.clone()),
            Severity::Block => ComplianceCheck::fail(self.id(), m.summary.clone()),
        }
    }
}
