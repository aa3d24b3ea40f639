//! Verdicts and classification outcomes

use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Final classification of a prompt
///
/// Severity is decided by which cascade stage fired, not by ordering these
/// variants, so no `Ord` is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Safe,
    Warning,
    Blocked,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Safe => "safe",
            Verdict::Warning => "warning",
            Verdict::Blocked => "blocked",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// States of the classification cascade
///
/// `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeState {
    Pending,
    BlockedByPattern,
    WarnByPattern,
    WarnByAnalyzer,
    BlockedByModel,
    Safe,
}

impl CascadeState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CascadeState::Pending)
    }

    /// Verdict for a terminal state, `None` while pending
    pub fn verdict(&self) -> Option<Verdict> {
        match self {
            CascadeState::Pending => None,
            CascadeState::BlockedByPattern | CascadeState::BlockedByModel => Some(Verdict::Blocked),
            CascadeState::WarnByPattern | CascadeState::WarnByAnalyzer => Some(Verdict::Warning),
            CascadeState::Safe => Some(Verdict::Safe),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CascadeState::Pending => "pending",
            CascadeState::BlockedByPattern => "blocked_by_pattern",
            CascadeState::WarnByPattern => "warn_by_pattern",
            CascadeState::WarnByAnalyzer => "warn_by_analyzer",
            CascadeState::BlockedByModel => "blocked_by_model",
            CascadeState::Safe => "safe",
        }
    }
}

impl fmt::Display for CascadeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal states a cascade stage can fire into
///
/// Every firing state carries a verdict, so an outcome built from one never
/// needs a fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FiringState {
    BlockedByPattern,
    WarnByPattern,
    WarnByAnalyzer,
    BlockedByModel,
}

impl FiringState {
    pub fn verdict(&self) -> Verdict {
        match self {
            FiringState::BlockedByPattern | FiringState::BlockedByModel => Verdict::Blocked,
            FiringState::WarnByPattern | FiringState::WarnByAnalyzer => Verdict::Warning,
        }
    }

    pub fn as_str(&self) -> &'static str {
        CascadeState::from(*self).as_str()
    }
}

impl From<FiringState> for CascadeState {
    fn from(state: FiringState) -> Self {
        match state {
            FiringState::BlockedByPattern => CascadeState::BlockedByPattern,
            FiringState::WarnByPattern => CascadeState::WarnByPattern,
            FiringState::WarnByAnalyzer => CascadeState::WarnByAnalyzer,
            FiringState::BlockedByModel => CascadeState::BlockedByModel,
        }
    }
}

impl fmt::Display for FiringState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying one prompt
///
/// Built once by the classifier and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationOutcome {
    verdict: Verdict,
    redacted_text: String,
    state: CascadeState,
    stage: Option<String>,
    spans: Vec<Span>,
}

impl ClassificationOutcome {
    /// Outcome for a prompt no stage fired on
    pub fn safe(text: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Safe,
            redacted_text: text.into(),
            state: CascadeState::Safe,
            stage: None,
            spans: Vec::new(),
        }
    }

    /// Outcome for a prompt the named stage fired on
    pub fn fired(
        state: FiringState,
        stage: impl Into<String>,
        redacted_text: String,
        spans: Vec<Span>,
    ) -> Self {
        Self {
            verdict: state.verdict(),
            redacted_text,
            state: state.into(),
            stage: Some(stage.into()),
            spans,
        }
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    pub fn redacted_text(&self) -> &str {
        &self.redacted_text
    }

    pub fn state(&self) -> CascadeState {
        self.state
    }

    /// Name of the stage that decided the verdict
    pub fn stage(&self) -> Option<&str> {
        self.stage.as_deref()
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn into_parts(self) -> (Verdict, String) {
        (self.verdict, self.redacted_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_serialization() {
        for (verdict, expected) in [
            (Verdict::Safe, "\"safe\""),
            (Verdict::Warning, "\"warning\""),
            (Verdict::Blocked, "\"blocked\""),
        ] {
            assert_eq!(serde_json::to_string(&verdict).unwrap(), expected);
            assert_eq!(verdict.to_string(), expected.trim_matches('"'));
        }
    }

    #[test]
    fn test_state_verdicts() {
        assert_eq!(CascadeState::Pending.verdict(), None);
        assert_eq!(
            CascadeState::BlockedByPattern.verdict(),
            Some(Verdict::Blocked)
        );
        assert_eq!(CascadeState::WarnByPattern.verdict(), Some(Verdict::Warning));
        assert_eq!(
            CascadeState::WarnByAnalyzer.verdict(),
            Some(Verdict::Warning)
        );
        assert_eq!(CascadeState::BlockedByModel.verdict(), Some(Verdict::Blocked));
        assert_eq!(CascadeState::Safe.verdict(), Some(Verdict::Safe));
    }

    #[test]
    fn test_only_pending_is_not_terminal() {
        assert!(!CascadeState::Pending.is_terminal());
        assert!(CascadeState::Safe.is_terminal());
        assert!(CascadeState::BlockedByModel.is_terminal());
    }

    #[test]
    fn test_safe_outcome_keeps_text() {
        let outcome = ClassificationOutcome::safe("hello");
        assert_eq!(outcome.verdict(), Verdict::Safe);
        assert_eq!(outcome.redacted_text(), "hello");
        assert_eq!(outcome.stage(), None);
        assert!(outcome.spans().is_empty());
    }

    #[test]
    fn test_fired_outcome() {
        let outcome = ClassificationOutcome::fired(
            FiringState::WarnByAnalyzer,
            "analyzer",
            "My name is **********".to_string(),
            vec![Span::with_label(11, 21, "PERSON")],
        );

        assert_eq!(outcome.verdict(), Verdict::Warning);
        assert_eq!(outcome.state(), CascadeState::WarnByAnalyzer);
        assert_eq!(outcome.stage(), Some("analyzer"));
        assert_eq!(outcome.spans().len(), 1);

        let (verdict, redacted) = outcome.into_parts();
        assert_eq!(verdict, Verdict::Warning);
        assert_eq!(redacted, "My name is **********");
    }

    #[test]
    fn test_firing_states_map_to_terminal_states() {
        for (firing, state, verdict) in [
            (FiringState::BlockedByPattern, CascadeState::BlockedByPattern, Verdict::Blocked),
            (FiringState::WarnByPattern, CascadeState::WarnByPattern, Verdict::Warning),
            (FiringState::WarnByAnalyzer, CascadeState::WarnByAnalyzer, Verdict::Warning),
            (FiringState::BlockedByModel, CascadeState::BlockedByModel, Verdict::Blocked),
        ] {
            let mapped = CascadeState::from(firing);
            assert_eq!(mapped, state);
            assert!(mapped.is_terminal());
            assert_eq!(mapped.verdict(), Some(verdict));
            assert_eq!(firing.verdict(), verdict);
            assert_eq!(firing.to_string(), state.as_str());
        }
    }
}
