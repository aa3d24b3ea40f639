//! Sensitive spans

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// A sensitive region of a text
///
/// Offsets are half-open and counted in characters (Unicode scalar values),
/// not bytes, so they line up with what model-backed detectors report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// First character covered by the span
    pub start: usize,

    /// One past the last character covered by the span
    pub end: usize,

    /// Entity category or pattern name, when the detector reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            label: None,
        }
    }

    pub fn with_label(start: usize, end: usize, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: Some(label.into()),
        }
    }

    /// Number of characters covered, zero for inverted ranges
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the two spans share at least one character
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Check `start < end <= len`
    pub fn validate(&self, len: usize) -> Result<()> {
        if self.start >= self.end || self.end > len {
            return Err(Error::InvalidSpan {
                start: self.start,
                end: self.end,
                len,
            });
        }
        Ok(())
    }
}
