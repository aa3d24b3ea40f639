//! Shared HTTP client settings for remote detectors

use promptgate_core::{Error, Result};
use reqwest::blocking::{Client, ClientBuilder, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTP client configuration for a detector service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpClientSettings {
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Maximum number of idle connections kept to the service
    #[serde(default = "default_pool_max_idle")]
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpClientSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            pool_max_idle_per_host: default_pool_max_idle(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    // Model inference on CPU can take a few seconds for long prompts
    30
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_pool_max_idle() -> usize {
    8
}

/// Create a blocking client for the named detector
///
/// Must not be called from inside an async task; detectors are built on a
/// blocking thread.
pub(crate) fn create_client(detector: &str, settings: &HttpClientSettings) -> Result<Client> {
    ClientBuilder::new()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
        .pool_max_idle_per_host(settings.pool_max_idle_per_host)
        .pool_idle_timeout(Duration::from_secs(90))
        .user_agent(format!("PromptGate/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::detector_unavailable(detector, format!("failed to create HTTP client: {}", e)))
}

/// Turn a non-success response into `DetectorUnavailable`
pub(crate) fn check_status(detector: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    let body: String = body.chars().take(200).collect();
    Err(Error::detector_unavailable(
        detector,
        format!("HTTP {}: {}", status, body),
    ))
}

/// Join a base URL and a path without doubling slashes
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
