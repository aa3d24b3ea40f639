//! Token-classification PII model reached over HTTP
//!
//! Speaks the Hugging Face inference protocol for token classification with
//! grouped entities: the text goes out as `inputs`, entity groups come back
//! with character offsets.

use super::http_client::{HttpClientSettings, check_status, create_client};
use promptgate_core::{EntityFinding, Error, Result, TextEntityDetector};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for the token classification detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClassifierConfig {
    /// Inference endpoint URL
    pub url: String,

    /// Bearer token for the inference endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// How the model groups sub-word tokens into entities
    #[serde(default = "default_aggregation_strategy")]
    pub aggregation_strategy: String,

    /// Readiness URL; without one, readiness sends a one-word inference request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_url: Option<String>,

    #[serde(default)]
    pub client: HttpClientSettings,
}

impl TokenClassifierConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            aggregation_strategy: default_aggregation_strategy(),
            health_url: None,
            client: HttpClientSettings::default(),
        }
    }
}

const HEALTH_CHECK_INPUT: &str = "ping";

fn default_aggregation_strategy() -> String {
    "simple".to_string()
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters<'a>,
}

#[derive(Debug, Serialize)]
struct InferenceParameters<'a> {
    aggregation_strategy: &'a str,
}

/// One entity group produced by the model
#[derive(Debug, Deserialize)]
struct TokenEntity {
    /// Present when entities are grouped
    #[serde(default)]
    entity_group: Option<String>,
    /// Present for ungrouped token output
    #[serde(default)]
    entity: Option<String>,
    #[serde(default)]
    start: Option<usize>,
    #[serde(default)]
    end: Option<usize>,
    #[serde(default)]
    score: Option<f32>,
}

impl From<TokenEntity> for EntityFinding {
    fn from(entity: TokenEntity) -> Self {
        EntityFinding {
            start: entity.start,
            end: entity.end,
            category: entity.entity_group.or(entity.entity),
            score: entity.score,
        }
    }
}

/// Endpoints answer either a flat list or a one-element batch
///
/// `Batched` is tried first: `TokenEntity` also deserializes from a sequence,
/// so `[[]]` would otherwise parse as one flat entity without offsets.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Batched(Vec<Vec<TokenEntity>>),
    Flat(Vec<TokenEntity>),
}

impl InferenceResponse {
    fn into_entities(self) -> Vec<TokenEntity> {
        match self {
            InferenceResponse::Flat(entities) => entities,
            InferenceResponse::Batched(batches) => batches.into_iter().flatten().collect(),
        }
    }
}

/// Token classification PII detector
pub struct TokenClassificationDetector {
    name: String,
    config: TokenClassifierConfig,
    client: Client,
}

impl TokenClassificationDetector {
    pub fn new(config: TokenClassifierConfig) -> Result<Self> {
        Self::with_name("token_model", config)
    }

    pub fn with_name(name: impl Into<String>, config: TokenClassifierConfig) -> Result<Self> {
        let name = name.into();
        if config.url.trim().is_empty() {
            return Err(Error::Config(format!("{}: url must not be empty", name)));
        }

        let client = create_client(&name, &config.client)?;

        Ok(Self {
            name,
            config,
            client,
        })
    }
}

impl TextEntityDetector for TokenClassificationDetector {
    fn name(&self) -> &str {
        &self.name
    }

    fn find(&self, text: &str) -> Result<Vec<EntityFinding>> {
        debug!(detector = %self.name, chars = text.chars().count(), "Sending inference request");

        let parsed = self.infer(text)?;

        Ok(parsed
            .into_entities()
            .into_iter()
            .map(EntityFinding::from)
            .collect())
    }

    fn health_check(&self) -> Result<()> {
        match &self.config.health_url {
            Some(health_url) => {
                let mut builder = self.client.get(health_url);
                if let Some(api_key) = &self.config.api_key {
                    builder = builder.bearer_auth(api_key);
                }
                let response = builder
                    .send()
                    .map_err(|e| Error::detector_unavailable(&self.name, e))?;
                check_status(&self.name, response).map(|_| ())
            }
            None => self.infer(HEALTH_CHECK_INPUT).map(|_| ()),
        }
    }
}

impl TokenClassificationDetector {
    fn infer(&self, text: &str) -> Result<InferenceResponse> {
        let request = InferenceRequest {
            inputs: text,
            parameters: InferenceParameters {
                aggregation_strategy: &self.config.aggregation_strategy,
            },
        };

        let mut builder = self.client.post(&self.config.url).json(&request);
        if let Some(api_key) = &self.config.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder
            .send()
            .map_err(|e| Error::detector_unavailable(&self.name, e))?;
        let response = check_status(&self.name, response)?;

        response
            .json()
            .map_err(|e| Error::detector_unavailable(&self.name, format!("invalid response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config: TokenClassifierConfig =
            serde_json::from_str(r#"{"url": "http://localhost:8080/predict"}"#).unwrap();

        assert_eq!(config.aggregation_strategy, "simple");
        assert!(config.api_key.is_none());
        assert!(config.health_url.is_none());
    }

    #[test]
    fn test_request_serialization() {
        let request = InferenceRequest {
            inputs: "Call Jane",
            parameters: InferenceParameters {
                aggregation_strategy: "simple",
            },
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"inputs": "Call Jane", "parameters": {"aggregation_strategy": "simple"}})
        );
    }

    #[test]
    fn test_flat_response() {
        let parsed: InferenceResponse = serde_json::from_str(
            r#"[{"entity_group": "GIVENNAME", "score": 0.99, "word": " Jane", "start": 5, "end": 9}]"#,
        )
        .unwrap();

        let findings: Vec<EntityFinding> = parsed
            .into_entities()
            .into_iter()
            .map(EntityFinding::from)
            .collect();
        assert_eq!(findings, vec![EntityFinding::new(5, 9, "GIVENNAME").with_score(0.99)]);
    }

    #[test]
    fn test_batched_response() {
        let parsed: InferenceResponse = serde_json::from_str(
            r#"[[{"entity_group": "CITY", "start": 0, "end": 5}, {"entity_group": "ZIPCODE", "start": 6, "end": 11}]]"#,
        )
        .unwrap();

        assert_eq!(parsed.into_entities().len(), 2);
    }

    #[test]
    fn test_empty_batched_response_has_no_entities() {
        let parsed: InferenceResponse = serde_json::from_str("[[]]").unwrap();
        assert!(parsed.into_entities().is_empty());
    }

    #[test]
    fn test_empty_response() {
        let parsed: InferenceResponse = serde_json::from_str("[]").unwrap();
        assert!(parsed.into_entities().is_empty());
    }

    #[test]
    fn test_ungrouped_entity_and_missing_offsets() {
        let parsed: InferenceResponse =
            serde_json::from_str(r#"[{"entity": "I-SURNAME", "word": "Smith", "score": 0.7}]"#).unwrap();

        let finding = EntityFinding::from(parsed.into_entities().remove(0));
        assert_eq!(finding.category.as_deref(), Some("I-SURNAME"));
        assert!(finding.start.is_none());
        assert!(finding.end.is_none());
    }
}
