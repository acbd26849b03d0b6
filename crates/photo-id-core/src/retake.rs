//! Retake suggestion generator.

use crate::domain::{CheckId, CheckStatus, ComplianceCheck, RetakeAdvice, Suggestion};

/// Default number of suggestions returned.
pub const DEFAULT_MAX_SUGGESTIONS: usize = 5;

/// Corrective instruction for a check.
#[must_use]
pub const fn suggestion_text(id: CheckId) -> &'static str {
    match id {
        CheckId::Face => "Make sure exactly one face is clearly visible",
        CheckId::HeadSize => "Adjust your distance so your head fills the frame as required",
        CheckId::EyePosition => "Hold the camera at eye level and keep your eyes in the upper half",
        CheckId::HeadCentering => "Center your face in the frame",
        CheckId::HeadPose => "Look straight at the camera and keep your head level",
        CheckId::Background => {
            "Stand in front of a plain white wall, or use automatic background removal"
        }
        CheckId::Lighting => "Face a window or light source so both sides of your face are evenly lit",
        CheckId::Grayscale => "Take the photo in color",
        CheckId::Sharpness => "Hold the camera steady and make sure your face is in focus",
        CheckId::CropMargins => "Step back so your whole head, including hair, is in the frame",
        CheckId::Content => "Use a different photo that meets content guidelines",
    }
}

/// Derives retake guidance from compliance checks.
///
/// Failures come first, then warnings, each group in check order; pending and
/// passing checks are ignored.
#[must_use]
pub fn suggest_retake(checks: &[ComplianceCheck]) -> RetakeAdvice {
    suggest_retake_with_limit(checks, DEFAULT_MAX_SUGGESTIONS)
}

/// Like [`suggest_retake`] with an explicit suggestion limit.
#[must_use]
pub fn suggest_retake_with_limit(checks: &[ComplianceCheck], limit: usize) -> RetakeAdvice {
    let mut actionable: Vec<&ComplianceCheck> = checks
        .iter()
        .filter(|c| matches!(c.status, CheckStatus::Fail | CheckStatus::Warn))
        .collect();
    actionable.sort_by(|a, b| b.status.cmp(&a.status).then(a.id.cmp(&b.id)));
    actionable.dedup_by_key(|c| c.id);

    RetakeAdvice {
        needs_retake: checks.iter().any(|c| c.status == CheckStatus::Fail),
        suggestions: actionable
            .into_iter()
            .take(limit)
            .map(|c| Suggestion {
                check: c.id,
                status: c.status,
                text: suggestion_text(c.id).to_string(),
            })
            .collect(),
    }
}
