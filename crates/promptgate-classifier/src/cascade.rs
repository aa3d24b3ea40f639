//! Short-circuiting classification cascade
//!
//! Stages run in a fixed order and the first one that reports spans decides
//! the terminal state:
//!
//! 1. block patterns -> `BlockedByPattern`
//! 2. code patterns -> `WarnByPattern`
//! 3. PII analyzer -> `WarnByAnalyzer`
//! 4. token model -> `BlockedByModel`
//! 5. nothing -> `Safe`
//!
//! Later stages never run once an earlier one fires, which keeps model
//! inference off the path whenever a regex already decided. The analyzer
//! only warns while the token model blocks; that severity split is kept as is.

use crate::stage::{ANALYZER, BLOCK_PATTERNS, CODE_PATTERNS, Stage, StageDetector, TOKEN_MODEL};
use promptgate_core::{CascadeState, FiringState, Result, Span, TextEntityDetector};
use promptgate_pii::PatternSet;
use std::sync::Arc;
use tracing::{debug, debug_span, info, warn};

/// Stage that fired and the state it led to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredStage {
    pub name: String,
    pub state: FiringState,
}

/// Terminal decision of one cascade run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeDecision {
    /// `None` when no stage fired
    pub fired: Option<FiredStage>,

    /// Spans from the firing stage only
    pub spans: Vec<Span>,
}

impl CascadeDecision {
    fn safe() -> Self {
        Self {
            fired: None,
            spans: Vec::new(),
        }
    }

    pub fn state(&self) -> CascadeState {
        self.fired
            .as_ref()
            .map_or(CascadeState::Safe, |fired| fired.state.into())
    }

    pub fn stage(&self) -> Option<&str> {
        self.fired.as_ref().map(|fired| fired.name.as_str())
    }
}

/// Ordered list of stages
///
/// Holds no mutable state; one instance can serve concurrent callers.
#[derive(Debug)]
pub struct Cascade {
    stages: Vec<Stage>,
}

impl Cascade {
    pub fn builder() -> CascadeBuilder {
        CascadeBuilder::default()
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(Stage::name).collect()
    }

    /// Run the stages in order until one fires
    ///
    /// A stage that fails aborts the run; the cascade never falls through
    /// to `Safe` past a stage it could not evaluate.
    pub fn evaluate(&self, text: &str) -> Result<CascadeDecision> {
        for stage in &self.stages {
            let _guard = debug_span!("cascade_stage", stage = stage.name()).entered();

            let spans = match stage.run(text) {
                Ok(spans) => spans,
                Err(e) => {
                    warn!(stage = stage.name(), error = %e, "Stage failed, aborting classification");
                    return Err(e);
                }
            };

            if spans.is_empty() {
                debug!(stage = stage.name(), "Stage did not fire");
                continue;
            }

            let state = stage.fires_into();
            info!(
                stage = stage.name(),
                state = %state,
                spans = spans.len(),
                "Stage fired"
            );
            return Ok(CascadeDecision {
                fired: Some(FiredStage {
                    name: stage.name().to_string(),
                    state,
                }),
                spans,
            });
        }

        debug!("No stage fired");
        Ok(CascadeDecision::safe())
    }
}

/// Builds a cascade in canonical stage order
///
/// Stages left unset are skipped entirely. The order of builder calls does
/// not affect the order stages run in.
#[derive(Default)]
pub struct CascadeBuilder {
    block: Option<PatternSet>,
    code: Option<PatternSet>,
    analyzer: Option<(Arc<dyn TextEntityDetector>, f32)>,
    token_model: Option<(Arc<dyn TextEntityDetector>, f32)>,
}

impl CascadeBuilder {
    pub fn block_patterns(mut self, patterns: PatternSet) -> Self {
        self.block = Some(patterns);
        self
    }

    pub fn code_patterns(mut self, patterns: PatternSet) -> Self {
        self.code = Some(patterns);
        self
    }

    pub fn analyzer(mut self, detector: Arc<dyn TextEntityDetector>, min_score: f32) -> Self {
        self.analyzer = Some((detector, min_score));
        self
    }

    pub fn token_model(mut self, detector: Arc<dyn TextEntityDetector>, min_score: f32) -> Self {
        self.token_model = Some((detector, min_score));
        self
    }

    pub fn build(self) -> Cascade {
        let mut stages = Vec::with_capacity(4);

        if let Some(set) = self.block {
            stages.push(Stage::new(
                BLOCK_PATTERNS,
                StageDetector::Patterns(set),
                FiringState::BlockedByPattern,
            ));
        }
        if let Some(set) = self.code {
            stages.push(Stage::new(
                CODE_PATTERNS,
                StageDetector::Patterns(set),
                FiringState::WarnByPattern,
            ));
        }
        if let Some((detector, min_score)) = self.analyzer {
            stages.push(Stage::new(
                ANALYZER,
                StageDetector::Entities {
                    detector,
                    min_score,
                },
                FiringState::WarnByAnalyzer,
            ));
        }
        if let Some((detector, min_score)) = self.token_model {
            stages.push(Stage::new(
                TOKEN_MODEL,
                StageDetector::Entities {
                    detector,
                    min_score,
                },
                FiringState::BlockedByModel,
            ));
        }

        Cascade { stages }
    }
}
