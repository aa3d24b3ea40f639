//! Text entity detector capability

use crate::Result;
use serde::{Deserialize, Serialize};

/// One finding reported by an entity detector
///
/// Offsets are character offsets into the exact text passed to
/// [`TextEntityDetector::find`]. Some detectors cannot map a finding back to
/// the input, so either offset may be missing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EntityFinding {
    #[serde(default)]
    pub start: Option<usize>,

    #[serde(default)]
    pub end: Option<usize>,

    /// Entity category (e.g. `PERSON`, `EMAIL_ADDRESS`)
    #[serde(default)]
    pub category: Option<String>,

    /// Detector confidence (0.0 to 1.0)
    #[serde(default)]
    pub score: Option<f32>,
}

impl EntityFinding {
    pub fn new(start: usize, end: usize, category: impl Into<String>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            category: Some(category.into()),
            score: None,
        }
    }

    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }
}

/// Capability implemented by external NLP/ML entity detectors
///
/// Detectors are loaded once and then shared read-only across requests, so
/// implementations must tolerate concurrent calls to `find`. `find` blocks
/// until the detector answers.
pub trait TextEntityDetector: Send + Sync {
    /// Name used in logs and errors
    fn name(&self) -> &str;

    /// Detect entities in `text`
    ///
    /// Must not retain `text` after returning. Failures are reported as
    /// [`crate::Error::DetectorUnavailable`].
    fn find(&self, text: &str) -> Result<Vec<EntityFinding>>;

    /// Check that the detector can serve requests
    fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
