//! Per-image session state machine.
//!
//! ```text
//! Received -> Analyzing -> ModeratedBlocked
//!                       -> ComplianceEvaluated -> ReadyForOutput
//!                                              <-> AwaitingUserFix
//! ```
//!
//! Replacing the image starts a new generation; reports computed for an
//! older generation are discarded on arrival.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::{GenerationCounter, GenerationToken};
use crate::domain::{Outcome, PipelineReport};

/// Where the current image is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// An image was supplied, analysis has not started.
    Received,
    /// Analysis is in flight.
    Analyzing,
    /// Moderation blocked the image. Terminal until the image is replaced.
    ModeratedBlocked,
    /// A compliance report is available and has not been acted on.
    ComplianceEvaluated,
    /// Some checks need the user to adjust or retake.
    AwaitingUserFix,
    /// Every check passed.
    ReadyForOutput,
}

/// Result of handing a report or transition to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Applied; carries the new state.
    Accepted(SessionState),
    /// Computed for a superseded image and ignored.
    Stale,
    /// Not valid in the carried current state.
    Rejected(SessionState),
}

/// Tracks one user's current image and its latest report.
#[derive(Debug)]
pub struct PhotoSession {
    counter: Arc<GenerationCounter>,
    token: Option<GenerationToken>,
    state: SessionState,
    report: Option<PipelineReport>,
}

impl Default for PhotoSession {
    fn default() -> Self {
        Self::new()
    }
}

impl PhotoSession {
    /// Creates a session with its own generation counter.
    #[must_use]
    pub fn new() -> Self {
        Self::with_counter(Arc::new(GenerationCounter::new()))
    }

    /// Creates a session sharing `counter` with workers.
    #[must_use]
    pub const fn with_counter(counter: Arc<GenerationCounter>) -> Self {
        Self {
            counter,
            token: None,
            state: SessionState::Received,
            report: None,
        }
    }

    /// The shared generation counter.
    #[must_use]
    pub fn counter(&self) -> Arc<GenerationCounter> {
        Arc::clone(&self.counter)
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Token of the current image, if one was supplied.
    #[must_use]
    pub const fn token(&self) -> Option<GenerationToken> {
        self.token
    }

    /// Latest accepted report.
    #[must_use]
    pub const fn report(&self) -> Option<&PipelineReport> {
        self.report.as_ref()
    }

    /// Replaces the image, discarding the previous report.
    pub fn replace_image(&mut self) -> GenerationToken {
        let token = self.counter.next();
        debug!(generation = token.value(), "New image received");
        self.token = Some(token);
        self.state = SessionState::Received;
        self.report = None;
        token
    }

    /// Marks analysis as started for `token`.
    pub fn begin_analysis(&mut self, token: GenerationToken) -> Submission {
        if !self.is_current(token) {
            return Submission::Stale;
        }
        match self.state {
            SessionState::Received => self.transition(SessionState::Analyzing),
            other => Submission::Rejected(other),
        }
    }

    /// Applies a finished report.
    ///
    /// Accepted while analysing and, for re-evaluations after user
    /// adjustments, once a report exists. A blocked image accepts nothing.
    pub fn submit(&mut self, report: PipelineReport) -> Submission {
        if !self.is_current(GenerationToken::from_raw(report.generation)) {
            debug!(generation = report.generation, "Discarding stale report");
            return Submission::Stale;
        }
        match self.state {
            SessionState::Analyzing
            | SessionState::ComplianceEvaluated
            | SessionState::AwaitingUserFix
            | SessionState::ReadyForOutput => {
                let next = if report.outcome == Outcome::Blocked {
                    SessionState::ModeratedBlocked
                } else {
                    SessionState::ComplianceEvaluated
                };
                self.report = Some(report);
                self.transition(next)
            }
            other => Submission::Rejected(other),
        }
    }

    /// Moves an evaluated report to [`SessionState::ReadyForOutput`] or
    /// [`SessionState::AwaitingUserFix`].
    pub fn resolve(&mut self) -> Submission {
        match (self.state, &self.report) {
            (SessionState::ComplianceEvaluated, Some(report)) => {
                let next = if report.outcome == Outcome::Ready {
                    SessionState::ReadyForOutput
                } else {
                    SessionState::AwaitingUserFix
                };
                self.transition(next)
            }
            (other, _) => Submission::Rejected(other),
        }
    }

    fn is_current(&self, token: GenerationToken) -> bool {
        self.token == Some(token) && self.counter.is_current(token)
    }

    fn transition(&mut self, next: SessionState) -> Submission {
        debug!(from = ?self.state, to = ?next, "Session transition");
        self.state = next;
        Submission::Accepted(next)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::analysis::MetricAnalyzer;
    use crate::domain::{
        BgAnalysis, FaceRegion, ImageDimensions, ModerationResult, PixelBuffer, Severity,
        Violation,
    };

    fn report(generation: u64, outcome: Outcome) -> PipelineReport {
        let pixels = PixelBuffer::filled(10, 10, [255, 255, 255, 255]).expect("valid dims");
        let moderation = if outcome == Outcome::Blocked {
            ModerationResult::from_violations(vec![Violation {
                code: "violence".into(),
                label: "Violent content".into(),
                message: String::new(),
                severity: Severity::Block,
                details: None,
            }])
        } else {
            ModerationResult::passed()
        };
        PipelineReport {
            path: "a.png".into(),
            timestamp: "2024-01-01T00:00:00Z".into(),
            generation,
            standard_id: "us-passport".into(),
            dimensions: ImageDimensions {
                width: 10,
                height: 10,
            },
            outcome,
            moderation,
            analysis: MetricAnalyzer::default().analyze(&pixels, &FaceRegion::none()),
            background: BgAnalysis::unreadable(),
            crop: None,
            compliance: None,
            retake: None,
        }
    }

    #[test]
    fn test_happy_path_reaches_ready() {
        let mut session = PhotoSession::new();
        let token = session.replace_image();
        assert_eq!(
            session.begin_analysis(token),
            Submission::Accepted(SessionState::Analyzing)
        );
        assert_eq!(
            session.submit(report(token.value(), Outcome::Ready)),
            Submission::Accepted(SessionState::ComplianceEvaluated)
        );
        assert_eq!(
            session.resolve(),
            Submission::Accepted(SessionState::ReadyForOutput)
        );
    }

    #[test]
    fn test_fix_loop() {
        let mut session = PhotoSession::new();
        let token = session.replace_image();
        session.begin_analysis(token);
        session.submit(report(token.value(), Outcome::NeedsAttention));
        assert_eq!(
            session.resolve(),
            Submission::Accepted(SessionState::AwaitingUserFix)
        );
        assert_eq!(
            session.submit(report(token.value(), Outcome::Ready)),
            Submission::Accepted(SessionState::ComplianceEvaluated)
        );
        assert_eq!(
            session.resolve(),
            Submission::Accepted(SessionState::ReadyForOutput)
        );
    }

    #[test]
    fn test_stale_report_discarded() {
        let mut session = PhotoSession::new();
        let old = session.replace_image();
        session.begin_analysis(old);
        let new = session.replace_image();
        session.begin_analysis(new);

        assert_eq!(
            session.submit(report(old.value(), Outcome::Ready)),
            Submission::Stale
        );
        assert_eq!(session.state(), SessionState::Analyzing);
        assert!(session.report().is_none());
        assert_eq!(session.begin_analysis(old), Submission::Stale);
    }

    #[test]
    fn test_blocked_is_terminal_until_replaced() {
        let mut session = PhotoSession::new();
        let token = session.replace_image();
        session.begin_analysis(token);
        assert_eq!(
            session.submit(report(token.value(), Outcome::Blocked)),
            Submission::Accepted(SessionState::ModeratedBlocked)
        );
        assert_eq!(
            session.submit(report(token.value(), Outcome::Ready)),
            Submission::Rejected(SessionState::ModeratedBlocked)
        );
        assert_eq!(
            session.resolve(),
            Submission::Rejected(SessionState::ModeratedBlocked)
        );

        let fresh = session.replace_image();
        assert_eq!(session.state(), SessionState::Received);
        assert_eq!(
            session.begin_analysis(fresh),
            Submission::Accepted(SessionState::Analyzing)
        );
    }

    #[test]
    fn test_submit_before_analysis_rejected() {
        let mut session = PhotoSession::new();
        let token = session.replace_image();
        assert_eq!(
            session.submit(report(token.value(), Outcome::Ready)),
            Submission::Rejected(SessionState::Received)
        );
    }

    #[test]
    fn test_shared_counter_supersedes() {
        let counter = Arc::new(GenerationCounter::new());
        let mut session = PhotoSession::with_counter(Arc::clone(&counter));
        let token = session.replace_image();
        session.begin_analysis(token);
        counter.next();
        assert_eq!(
            session.submit(report(token.value(), Outcome::Ready)),
            Submission::Stale
        );
    }
}
