//! Entity detector lifecycle
//!
//! Detectors are built once at startup from configuration and shared by every
//! request. Construction creates blocking HTTP clients, so `Detectors::init`
//! must run off the async worker threads.

use crate::config::DetectorsConfig;
use promptgate_core::{Result, TextEntityDetector};
use promptgate_pii::{HttpAnalyzerDetector, TokenClassificationDetector};
use std::sync::Arc;
use tracing::info;

#[derive(Clone, Default)]
pub struct Detectors {
    pub analyzer: Option<Arc<dyn TextEntityDetector>>,
    pub token_model: Option<Arc<dyn TextEntityDetector>>,
}

impl Detectors {
    pub fn init(config: &DetectorsConfig) -> Result<Self> {
        let analyzer = match &config.analyzer {
            Some(analyzer_config) => {
                let detector = HttpAnalyzerDetector::new(analyzer_config.clone())?;
                info!("PII analyzer stage enabled: {}", analyzer_config.base_url);
                Some(Arc::new(detector) as Arc<dyn TextEntityDetector>)
            }
            None => {
                info!("PII analyzer stage disabled (no analyzer configured)");
                None
            }
        };

        let token_model = match &config.token_model {
            Some(model_config) => {
                let detector = TokenClassificationDetector::new(model_config.clone())?;
                info!("Token model stage enabled: {}", model_config.url);
                Some(Arc::new(detector) as Arc<dyn TextEntityDetector>)
            }
            None => {
                info!("Token model stage disabled (no token model configured)");
                None
            }
        };

        Ok(Self {
            analyzer,
            token_model,
        })
    }

    /// Every configured detector, in cascade order
    pub fn all(&self) -> Vec<Arc<dyn TextEntityDetector>> {
        self.analyzer
            .iter()
            .chain(self.token_model.iter())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptgate_core::Error;
    use promptgate_pii::{AnalyzerConfig, TokenClassifierConfig};

    #[test]
    fn test_no_detectors_configured() {
        let detectors = Detectors::init(&DetectorsConfig::default()).unwrap();
        assert!(detectors.analyzer.is_none());
        assert!(detectors.token_model.is_none());
        assert!(detectors.all().is_empty());
    }

    #[test]
    fn test_both_detectors_in_cascade_order() {
        let config = DetectorsConfig {
            analyzer: Some(AnalyzerConfig::new("http://127.0.0.1:5002")),
            token_model: Some(TokenClassifierConfig::new("http://127.0.0.1:8080/predict")),
        };

        let detectors = Detectors::init(&config).unwrap();
        let names: Vec<String> = detectors
            .all()
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        assert_eq!(names, vec!["analyzer", "token_model"]);
    }

    #[test]
    fn test_invalid_detector_config() {
        let config = DetectorsConfig {
            analyzer: Some(AnalyzerConfig::new("")),
            token_model: None,
        };

        let err = Detectors::init(&config).err().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }
}
