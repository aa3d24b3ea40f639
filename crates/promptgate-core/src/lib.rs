//! PromptGate Core Types and Traits
//!
//! This crate provides the fundamental types shared by every PromptGate crate:
//! - Sensitive spans and their invariants
//! - Verdicts, cascade states and classification outcomes
//! - The text entity detector capability
//! - Core error types

pub mod detector;
pub mod error;
pub mod span;
pub mod verdict;

pub use detector::{EntityFinding, TextEntityDetector};
pub use error::{Error, Result};
pub use span::Span;
pub use verdict::{CascadeState, ClassificationOutcome, FiringState, Verdict};
