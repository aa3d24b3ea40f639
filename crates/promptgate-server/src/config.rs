use promptgate_classifier::ClassifierConfig;
use promptgate_pii::{AnalyzerConfig, TokenClassifierConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub detectors: DetectorsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_false")]
    pub log_requests: bool,
}

/// Entity detector services; an absent entry disables that cascade stage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectorsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzer: Option<AnalyzerConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_model: Option<TokenClassifierConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logging: LoggingConfig::default(),
            classifier: ClassifierConfig::default(),
            detectors: DetectorsConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_requests: false,
        }
    }
}

impl ServerConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&contents)?
        } else {
            // Default to YAML
            serde_yaml::from_str(&contents)?
        };

        Ok(config)
    }

    /// Merge environment variables into config (env vars take precedence)
    pub fn merge_env(&mut self) {
        // Detector endpoints
        if let Ok(url) = std::env::var("PROMPTGATE_ANALYZER_URL") {
            match self.detectors.analyzer.as_mut() {
                Some(analyzer) => analyzer.base_url = url,
                None => self.detectors.analyzer = Some(AnalyzerConfig::new(url)),
            }
        }

        if let Ok(url) = std::env::var("PROMPTGATE_TOKEN_MODEL_URL") {
            match self.detectors.token_model.as_mut() {
                Some(model) => model.url = url,
                None => self.detectors.token_model = Some(TokenClassifierConfig::new(url)),
            }
        }

        if let Ok(api_key) = std::env::var("PROMPTGATE_TOKEN_MODEL_API_KEY") {
            if let Some(model) = self.detectors.token_model.as_mut() {
                model.api_key = Some(api_key);
            } else {
                eprintln!(
                    "Warning: PROMPTGATE_TOKEN_MODEL_API_KEY set but no token model configured"
                );
            }
        }

        // Logging settings
        if let Ok(val) = std::env::var("PROMPTGATE_LOG_REQUESTS") {
            if let Ok(enabled) = val.parse::<bool>() {
                self.logging.log_requests = enabled;
            }
        }

        if let Ok(val) = std::env::var("PROMPTGATE_LOG_LEVEL") {
            self.logging.level = val;
        }

        // Server settings
        if let Ok(val) = std::env::var("PROMPTGATE_PORT") {
            if let Ok(port) = val.parse::<u16>() {
                self.port = port;
            }
        }

        if let Ok(val) = std::env::var("PROMPTGATE_HOST") {
            self.host = val;
        }
    }
}

/// Load variables from a `.env` file into the process environment
///
/// Without a path the file is searched for from the current directory
/// upwards. Variables already set in the environment are left untouched.
/// Returns the file that was loaded, if any.
pub fn load_env_file(path: Option<&Path>) -> Option<PathBuf> {
    match path {
        Some(path) => dotenvy::from_path(path).ok().map(|_| path.to_path_buf()),
        None => dotenvy::dotenv().ok(),
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_false() -> bool {
    false
}
