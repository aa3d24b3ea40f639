//! Detector with fixed answers

use promptgate_core::{EntityFinding, Error, Result, TextEntityDetector};

/// Returns the same findings (or the same failure) for every text
///
/// Used for offline runs and tests where no model service is reachable.
#[derive(Debug, Clone)]
pub struct StaticDetector {
    name: String,
    outcome: std::result::Result<Vec<EntityFinding>, String>,
}

impl StaticDetector {
    pub fn new(name: impl Into<String>, findings: Vec<EntityFinding>) -> Self {
        Self {
            name: name.into(),
            outcome: Ok(findings),
        }
    }

    /// A detector that never finds anything
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    /// A detector whose every call fails with `DetectorUnavailable`
    pub fn failing(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: Err(reason.into()),
        }
    }
}

impl TextEntityDetector for StaticDetector {
    fn name(&self) -> &str {
        &self.name
    }

    fn find(&self, _text: &str) -> Result<Vec<EntityFinding>> {
        self.outcome
            .clone()
            .map_err(|reason| Error::detector_unavailable(&self.name, reason))
    }

    fn health_check(&self) -> Result<()> {
        match &self.outcome {
            Ok(_) => Ok(()),
            Err(reason) => Err(Error::detector_unavailable(&self.name, reason)),
        }
    }
}
