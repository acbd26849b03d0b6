//! Content moderation outcome.

use serde::{Deserialize, Serialize};

/// How strongly a finding restricts the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Nothing found.
    #[default]
    Pass,
    /// Advisory, does not stop processing.
    Warn,
    /// Stops document generation.
    Block,
}

/// One moderation finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Stable machine code, e.g. `explicit`.
    pub code: String,
    /// Display label.
    pub label: String,
    /// Explanation.
    pub message: String,
    /// Severity of this finding.
    pub severity: Severity,
    /// Extra context such as the classifier confidence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Verdict of the moderation gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationResult {
    /// False when any violation blocks.
    pub allowed: bool,
    /// Highest violation severity.
    pub severity: Severity,
    /// Findings, blocking first, then by code.
    pub violations: Vec<Violation>,
    /// One-line summary.
    pub summary: String,
}

impl ModerationResult {
    /// Builds a result from findings, ordering them and deriving the verdict.
    #[must_use]
    pub fn from_violations(mut violations: Vec<Violation>) -> Self {
        violations.sort_by(|a, b| b.severity.cmp(&a.severity).then_with(|| a.code.cmp(&b.code)));
        let severity = violations
            .iter()
            .map(|v| v.severity)
            .max()
            .unwrap_or_default();
        let allowed = severity != Severity::Block;
        let summary = match severity {
            Severity::Pass => "No content issues found".to_string(),
            Severity::Warn => format!("{} advisory notice(s)", violations.len()),
            Severity::Block => {
                let codes: Vec<&str> = violations
                    .iter()
                    .filter(|v| v.severity == Severity::Block)
                    .map(|v| v.code.as_str())
                    .collect();
                format!("Photo cannot be used: {}", codes.join(", "))
            }
        };
        Self {
            allowed,
            severity,
            violations,
            summary,
        }
    }

    /// A clean result.
    #[must_use]
    pub fn passed() -> Self {
        Self::from_violations(Vec::new())
    }
}
