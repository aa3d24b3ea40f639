//! Cascade stage descriptors

use promptgate_core::{FiringState, Result, Span, TextEntityDetector};
use promptgate_pii::{PatternSet, detect_spans};
use std::fmt;
use std::sync::Arc;

pub const BLOCK_PATTERNS: &str = "block_patterns";
pub const CODE_PATTERNS: &str = "code_patterns";
pub const ANALYZER: &str = "analyzer";
pub const TOKEN_MODEL: &str = "token_model";

/// Where a stage gets its spans from
pub enum StageDetector {
    /// Local regex scan
    Patterns(PatternSet),

    /// External entity detector, with a minimum finding score
    Entities {
        detector: Arc<dyn TextEntityDetector>,
        min_score: f32,
    },
}

impl StageDetector {
    fn spans(&self, text: &str) -> Result<Vec<Span>> {
        match self {
            StageDetector::Patterns(set) => Ok(set.spans(text)),
            StageDetector::Entities {
                detector,
                min_score,
            } => detect_spans(detector.as_ref(), text, *min_score),
        }
    }
}

impl fmt::Debug for StageDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageDetector::Patterns(set) => f
                .debug_struct("Patterns")
                .field("name", &set.name())
                .field("patterns", &set.len())
                .finish(),
            StageDetector::Entities {
                detector,
                min_score,
            } => f
                .debug_struct("Entities")
                .field("detector", &detector.name())
                .field("min_score", min_score)
                .finish(),
        }
    }
}

/// One step of the cascade: a detector and the state it leads to when it fires
#[derive(Debug)]
pub struct Stage {
    name: String,
    detector: StageDetector,
    fires_into: FiringState,
}

impl Stage {
    pub fn new(name: impl Into<String>, detector: StageDetector, fires_into: FiringState) -> Self {
        Self {
            name: name.into(),
            detector,
            fires_into,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Terminal state reached when this stage fires
    pub fn fires_into(&self) -> FiringState {
        self.fires_into
    }

    pub fn detector(&self) -> &StageDetector {
        &self.detector
    }

    /// Spans found by this stage; the stage fires when the list is non-empty
    pub fn run(&self, text: &str) -> Result<Vec<Span>> {
        self.detector.spans(text)
    }
}
