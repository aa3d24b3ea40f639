//! Classifier configuration

use promptgate_pii::RedactorConfig;
use serde::{Deserialize, Serialize};

/// Patterns that block a prompt outright
pub const DEFAULT_BLOCK_PATTERNS: &[&str] = &[
    r"api[_-]?key\s*[:=]",
    r"private[_-]?key",
    r"ssn",
    r"confidential",
    r"BEGIN (RSA|PRIVATE) KEY",
    r"\d{13,16}",
];

/// Patterns that flag a prompt as looking like source code
pub const DEFAULT_CODE_PATTERNS: &[&str] = &[
    r"\bdef\s+\w+\(",
    r"\bclass\s+\w+",
    r"\bfunction\s*\(",
    r"import\s+\w+",
    r"console\.log",
];

/// Regex lists for the pattern stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternConfig {
    #[serde(default = "default_block_patterns")]
    pub block: Vec<String>,

    #[serde(default = "default_code_patterns")]
    pub code: Vec<String>,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            block: default_block_patterns(),
            code: default_code_patterns(),
        }
    }
}

fn default_block_patterns() -> Vec<String> {
    DEFAULT_BLOCK_PATTERNS.iter().map(|p| p.to_string()).collect()
}

fn default_code_patterns() -> Vec<String> {
    DEFAULT_CODE_PATTERNS.iter().map(|p| p.to_string()).collect()
}

/// Configuration for the classifier
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub patterns: PatternConfig,

    #[serde(default)]
    pub redaction: RedactorConfig,

    /// Analyzer findings scored below this are ignored
    #[serde(default)]
    pub analyzer_min_score: f32,

    /// Token model findings scored below this are ignored
    #[serde(default)]
    pub token_model_min_score: f32,
}
