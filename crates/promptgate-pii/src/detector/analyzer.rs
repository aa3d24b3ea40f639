//! Context-aware PII analyzer reached over HTTP
//!
//! Speaks the Presidio analyzer REST protocol: `POST /analyze` with the text
//! and language, answered by a list of recognizer results carrying character
//! offsets, an entity type and a score.

use super::http_client::{HttpClientSettings, check_status, create_client, join_url};
use promptgate_core::{EntityFinding, Error, Result, TextEntityDetector};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for the analyzer detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Base URL of the analyzer service
    pub base_url: String,

    /// Language code sent with every request
    #[serde(default = "default_language")]
    pub language: String,

    /// Server-side score threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_threshold: Option<f32>,

    /// Restrict analysis to these entity types (empty means all)
    #[serde(default)]
    pub entities: Vec<String>,

    #[serde(default)]
    pub client: HttpClientSettings,
}

impl AnalyzerConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            language: default_language(),
            score_threshold: None,
            entities: Vec::new(),
            client: HttpClientSettings::default(),
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    text: &'a str,
    language: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    score_threshold: Option<f32>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    entities: &'a [String],
}

/// One recognizer result as returned by the analyzer
#[derive(Debug, Deserialize)]
struct RecognizerResult {
    #[serde(default)]
    entity_type: Option<String>,
    #[serde(default)]
    start: Option<usize>,
    #[serde(default)]
    end: Option<usize>,
    #[serde(default)]
    score: Option<f32>,
}

impl From<RecognizerResult> for EntityFinding {
    fn from(result: RecognizerResult) -> Self {
        EntityFinding {
            start: result.start,
            end: result.end,
            category: result.entity_type,
            score: result.score,
        }
    }
}

/// Semantic PII analyzer detector
pub struct HttpAnalyzerDetector {
    name: String,
    config: AnalyzerConfig,
    client: Client,
    analyze_url: String,
    health_url: String,
}

impl HttpAnalyzerDetector {
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        Self::with_name("analyzer", config)
    }

    pub fn with_name(name: impl Into<String>, config: AnalyzerConfig) -> Result<Self> {
        let name = name.into();
        if config.base_url.trim().is_empty() {
            return Err(Error::Config(format!("{}: base_url must not be empty", name)));
        }

        let client = create_client(&name, &config.client)?;
        let analyze_url = join_url(&config.base_url, "analyze");
        let health_url = join_url(&config.base_url, "health");

        Ok(Self {
            name,
            config,
            client,
            analyze_url,
            health_url,
        })
    }
}

impl TextEntityDetector for HttpAnalyzerDetector {
    fn name(&self) -> &str {
        &self.name
    }

    fn find(&self, text: &str) -> Result<Vec<EntityFinding>> {
        let request = AnalyzeRequest {
            text,
            language: &self.config.language,
            score_threshold: self.config.score_threshold,
            entities: &self.config.entities,
        };

        debug!(detector = %self.name, chars = text.chars().count(), "Sending analyze request");

        let response = self
            .client
            .post(&self.analyze_url)
            .json(&request)
            .send()
            .map_err(|e| Error::detector_unavailable(&self.name, e))?;
        let response = check_status(&self.name, response)?;

        let results: Vec<RecognizerResult> = response
            .json()
            .map_err(|e| Error::detector_unavailable(&self.name, format!("invalid response: {}", e)))?;

        Ok(results.into_iter().map(EntityFinding::from).collect())
    }

    fn health_check(&self) -> Result<()> {
        let response = self
            .client
            .get(&self.health_url)
            .send()
            .map_err(|e| Error::detector_unavailable(&self.name, e))?;
        check_status(&self.name, response).map(|_| ())
    }
}
