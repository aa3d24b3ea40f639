//! PromptGate sensitive-span detection and redaction
//!
//! This crate turns detector output into redacted text:
//! - Offset-stable redaction of character spans
//! - Case-insensitive regex pattern scanning
//! - Adapters from entity detector findings to spans
//! - HTTP-backed entity detectors (PII analyzer, token classifier)

pub mod adapter;
pub mod detector;
pub mod pattern;
pub mod redactor;

pub use adapter::{detect_spans, findings_to_spans};
pub use detector::{
    AnalyzerConfig, HttpAnalyzerDetector, HttpClientSettings, StaticDetector,
    TokenClassificationDetector, TokenClassifierConfig,
};
pub use pattern::{PatternMatch, PatternSet};
pub use redactor::{RedactionMode, Redactor, RedactorConfig, covered_characters, redact};
