//! PromptGate classification cascade
//!
//! This crate decides whether a prompt may be forwarded:
//! - Ordered stage descriptors (block patterns, code patterns, PII analyzer, token model)
//! - A short-circuiting cascade that stops at the first stage with findings
//! - The `Classifier` facade producing a verdict and redacted text

pub mod cascade;
pub mod classifier;
pub mod config;
pub mod stage;

pub use cascade::{Cascade, CascadeBuilder, CascadeDecision, FiredStage};
pub use classifier::Classifier;
pub use config::{ClassifierConfig, DEFAULT_BLOCK_PATTERNS, DEFAULT_CODE_PATTERNS, PatternConfig};
pub use stage::{Stage, StageDetector};
