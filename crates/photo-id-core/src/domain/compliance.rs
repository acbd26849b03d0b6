//! Compliance verdict types.

use serde::{Deserialize, Serialize};

/// Outcome of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    /// Requirement met.
    Pass,
    /// Could not be measured yet.
    Pending,
    /// Borderline, advisory.
    Warn,
    /// Requirement not met.
    Fail,
}

/// Stable identifier of a compliance check.
///
/// The declaration order is the order in which checks are reported.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckId {
    /// Exactly one face present.
    Face,
    /// Crown-to-chin height within the standard's range.
    HeadSize,
    /// Eye line within the standard's range.
    EyePosition,
    /// Face horizontally centred.
    HeadCentering,
    /// Head not tilted or turned.
    HeadPose,
    /// Background acceptable or already replaced.
    Background,
    /// Even lighting on the face.
    Lighting,
    /// Colour photo where colour is required.
    Grayscale,
    /// Image in focus.
    Sharpness,
    /// Head fully inside the frame with room above.
    CropMargins,
    /// Content moderation outcome.
    Content,
}

impl CheckId {
    /// Identifier as it appears in serialized output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Face => "face",
            Self::HeadSize => "head_size",
            Self::EyePosition => "eye_position",
            Self::HeadCentering => "head_centering",
            Self::HeadPose => "head_pose",
            Self::Background => "background",
            Self::Lighting => "lighting",
            Self::Grayscale => "grayscale",
            Self::Sharpness => "sharpness",
            Self::CropMargins => "crop_margins",
            Self::Content => "content",
        }
    }

    /// Short human label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Face => "Face detected",
            Self::HeadSize => "Head size",
            Self::EyePosition => "Eye position",
            Self::HeadCentering => "Head centered",
            Self::HeadPose => "Head straight",
            Self::Background => "Background",
            Self::Lighting => "Even lighting",
            Self::Grayscale => "Color photo",
            Self::Sharpness => "Sharpness",
            Self::CropMargins => "Head within frame",
            Self::Content => "Content",
        }
    }
}

impl std::fmt::Display for CheckId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One pass/warn/fail/pending verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceCheck {
    /// Stable identifier.
    pub id: CheckId,
    /// Display label.
    pub label: String,
    /// Verdict.
    pub status: CheckStatus,
    /// Explanation shown to the user.
    pub message: String,
}

impl ComplianceCheck {
    /// Builds a check with the id's default label.
    #[must_use]
    pub fn new(id: CheckId, status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            id,
            label: id.label().to_string(),
            status,
            message: message.into(),
        }
    }

    /// Passing check.
    #[must_use]
    pub fn pass(id: CheckId, message: impl Into<String>) -> Self {
        Self::new(id, CheckStatus::Pass, message)
    }

    /// Warning check.
    #[must_use]
    pub fn warn(id: CheckId, message: impl Into<String>) -> Self {
        Self::new(id, CheckStatus::Warn, message)
    }

    /// Failing check.
    #[must_use]
    pub fn fail(id: CheckId, message: impl Into<String>) -> Self {
        Self::new(id, CheckStatus::Fail, message)
    }

    /// Pending check.
    #[must_use]
    pub fn pending(id: CheckId, message: impl Into<String>) -> Self {
        Self::new(id, CheckStatus::Pending, message)
    }
}

/// All checks for one (image, standard) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    /// Standard the image was evaluated against.
    pub standard_id: String,
    /// Checks in stable order.
    pub checks: Vec<ComplianceCheck>,
    /// True only when every check passed.
    pub ready_to_print: bool,
}

impl ComplianceReport {
    /// Builds a report, deriving `ready_to_print`.
    #[must_use]
    pub fn new(standard_id: impl Into<String>, checks: Vec<ComplianceCheck>) -> Self {
        let ready_to_print = !checks.is_empty()
            && checks.iter().all(|c| c.status == CheckStatus::Pass);
        Self {
            standard_id: standard_id.into(),
            checks,
            ready_to_print,
        }
    }

    /// Looks up a check by id.
    #[must_use]
    pub fn check(&self, id: CheckId) -> Option<&ComplianceCheck> {
        self.checks.iter().find(|c| c.id == id)
    }

    /// Status of a check, if present.
    #[must_use]
    pub fn status(&self, id: CheckId) -> Option<CheckStatus> {
        self.check(id).map(|c| c.status)
    }
}

/// One corrective instruction derived from a non-passing check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Check the suggestion addresses.
    pub check: CheckId,
    /// Status of that check.
    pub status: CheckStatus,
    /// Instruction for the user.
    pub text: String,
}

/// Guidance shown before the user retakes or adjusts the photo.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RetakeAdvice {
    /// True when at least one check failed outright.
    pub needs_retake: bool,
    /// Ordered suggestions, most severe first.
    pub suggestions: Vec<Suggestion>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_id_serializes_snake_case() {
        let json = serde_json::to_string(&CheckId::HeadSize).unwrap_or_default();
        assert_eq!(json, "\"head_size\"");
        assert_eq!(CheckId::CropMargins.to_string(), "crop_margins");
    }

    #[test]
    fn test_ready_requires_all_pass() {
        let all_pass = ComplianceReport::new(
            "us-passport",
            vec![
                ComplianceCheck::pass(CheckId::Face, "ok"),
                ComplianceCheck::pass(CheckId::HeadSize, "ok"),
            ],
        );
        assert!(all_pass.ready_to_print);

        let with_warn = ComplianceReport::new(
            "us-passport",
            vec![
                ComplianceCheck::pass(CheckId::Face, "ok"),
                ComplianceCheck::warn(CheckId::HeadSize, "close"),
            ],
        );
        assert!(!with_warn.ready_to_print);
        assert_eq!(with_warn.status(CheckId::HeadSize), Some(CheckStatus::Warn));
    }

    #[test]
    fn test_empty_report_is_not_ready() {
        assert!(!ComplianceReport::new("us-passport", vec![]).ready_to_print);
    }
}
