//! Error types for PromptGate Core

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// An adapter produced a span outside the text it describes
    #[error("Invalid span {start}..{end} for text of {len} characters")]
    InvalidSpan { start: usize, end: usize, len: usize },

    /// A detector could not be initialized or failed during inference
    #[error("Detector '{detector}' unavailable: {reason}")]
    DetectorUnavailable { detector: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Build a `DetectorUnavailable` error for the named detector
    pub fn detector_unavailable(detector: impl Into<String>, reason: impl ToString) -> Self {
        Error::DetectorUnavailable {
            detector: detector.into(),
            reason: reason.to_string(),
        }
    }

    /// Short machine-readable kind, used for metric labels and API error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidSpan { .. } => "invalid_span",
            Error::DetectorUnavailable { .. } => "detector_unavailable",
            Error::Config(_) => "config",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
