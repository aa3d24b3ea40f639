//! Span redaction
//!
//! Redaction is computed as a character mask over the original text. Every
//! span is checked against the text before anything is emitted, then each
//! covered character is marked once. Output is built from the original text
//! in a single pass, so span order and overlap never shift offsets.

use promptgate_core::{Result, Span};
use serde::{Deserialize, Serialize};

/// Redaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RedactionMode {
    /// Replace every covered character with the mask character
    #[default]
    Mask,

    /// Replace every run of covered characters with the placeholder text
    Placeholder,
}

/// Configuration for redaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactorConfig {
    /// Redaction mode to use
    #[serde(default)]
    pub mode: RedactionMode,

    /// Character written in place of each redacted character (mask mode)
    #[serde(default = "default_mask_char")]
    pub mask_char: char,

    /// Text written in place of each redacted run (placeholder mode)
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

impl Default for RedactorConfig {
    fn default() -> Self {
        Self {
            mode: RedactionMode::Mask,
            mask_char: default_mask_char(),
            placeholder: default_placeholder(),
        }
    }
}

fn default_mask_char() -> char {
    '*'
}

fn default_placeholder() -> String {
    "[REDACTED]".to_string()
}

/// Redacts character spans from text
#[derive(Debug, Clone, Default)]
pub struct Redactor {
    config: RedactorConfig,
}

impl Redactor {
    pub fn new(config: RedactorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RedactorConfig {
        &self.config
    }

    /// Redact `spans` from `text`
    ///
    /// Fails with `InvalidSpan` if any span is empty or reaches past the end
    /// of the text. Nothing is clamped.
    pub fn redact(&self, text: &str, spans: &[Span]) -> Result<String> {
        if spans.is_empty() {
            return Ok(text.to_string());
        }

        let len = text.chars().count();
        for span in spans {
            span.validate(len)?;
        }

        let mut mask = vec![false; len];
        for span in spans {
            mask[span.start..span.end].fill(true);
        }

        let mut result = String::with_capacity(text.len());
        match self.config.mode {
            RedactionMode::Mask => {
                for (ch, masked) in text.chars().zip(&mask) {
                    result.push(if *masked { self.config.mask_char } else { ch });
                }
            }
            RedactionMode::Placeholder => {
                let mut in_run = false;
                for (ch, masked) in text.chars().zip(&mask) {
                    if *masked {
                        if !in_run {
                            result.push_str(&self.config.placeholder);
                            in_run = true;
                        }
                    } else {
                        in_run = false;
                        result.push(ch);
                    }
                }
            }
        }

        Ok(result)
    }
}

/// Redact with the default configuration (`*` per character)
pub fn redact(text: &str, spans: &[Span]) -> Result<String> {
    Redactor::default().redact(text, spans)
}

/// Number of distinct characters covered by the union of `spans`
pub fn covered_characters(spans: &[Span]) -> usize {
    let mut ranges: Vec<(usize, usize)> = spans
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| (s.start, s.end))
        .collect();
    ranges.sort_unstable();

    let mut total = 0;
    let mut current: Option<(usize, usize)> = None;
    for (start, end) in ranges {
        current = match current {
            Some((cur_start, cur_end)) if start <= cur_end => Some((cur_start, cur_end.max(end))),
            Some((cur_start, cur_end)) => {
                total += cur_end - cur_start;
                Some((start, end))
            }
            None => Some((start, end)),
        };
    }
    if let Some((start, end)) = current {
        total += end - start;
    }

    total
}
