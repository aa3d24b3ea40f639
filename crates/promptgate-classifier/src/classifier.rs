//! Classification facade

use crate::cascade::{Cascade, CascadeDecision, FiredStage};
use crate::config::ClassifierConfig;
use crate::stage::{BLOCK_PATTERNS, CODE_PATTERNS};
use promptgate_core::{ClassificationOutcome, Result, TextEntityDetector};
use promptgate_pii::{PatternSet, Redactor};
use std::sync::Arc;
use tracing::debug;

/// Single entry point for classifying prompts
///
/// Immutable after construction and safe to share behind an `Arc`.
#[derive(Debug)]
pub struct Classifier {
    cascade: Cascade,
    redactor: Redactor,
}

impl Classifier {
    pub fn new(cascade: Cascade, redactor: Redactor) -> Self {
        Self { cascade, redactor }
    }

    /// Build the standard four-stage classifier
    ///
    /// Entity stages are only added for the detectors supplied.
    pub fn from_config(
        config: &ClassifierConfig,
        analyzer: Option<Arc<dyn TextEntityDetector>>,
        token_model: Option<Arc<dyn TextEntityDetector>>,
    ) -> Result<Self> {
        let mut builder = Cascade::builder()
            .block_patterns(PatternSet::new(BLOCK_PATTERNS, &config.patterns.block)?)
            .code_patterns(PatternSet::new(CODE_PATTERNS, &config.patterns.code)?);

        if let Some(detector) = analyzer {
            builder = builder.analyzer(detector, config.analyzer_min_score);
        }
        if let Some(detector) = token_model {
            builder = builder.token_model(detector, config.token_model_min_score);
        }

        Ok(Self::new(
            builder.build(),
            Redactor::new(config.redaction.clone()),
        ))
    }

    pub fn cascade(&self) -> &Cascade {
        &self.cascade
    }

    /// Classify `text` and redact the firing stage's spans
    ///
    /// Errors are `DetectorUnavailable` when a stage could not run and
    /// `InvalidSpan` when a detector reported offsets outside the text.
    pub fn classify(&self, text: &str) -> Result<ClassificationOutcome> {
        if text.is_empty() {
            return Ok(ClassificationOutcome::safe(text));
        }

        let CascadeDecision { fired, spans } = self.cascade.evaluate(text)?;

        let Some(FiredStage { name, state }) = fired else {
            debug!(chars = text.chars().count(), "Prompt classified as safe");
            return Ok(ClassificationOutcome::safe(text));
        };

        let redacted = self.redactor.redact(text, &spans)?;
        Ok(ClassificationOutcome::fired(state, name, redacted, spans))
    }
}
