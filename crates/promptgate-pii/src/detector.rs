//! Entity detector implementations

mod analyzer;
mod http_client;
mod static_detector;
mod token_classifier;

pub use analyzer::{AnalyzerConfig, HttpAnalyzerDetector};
pub use http_client::HttpClientSettings;
pub use static_detector::StaticDetector;
pub use token_classifier::{TokenClassificationDetector, TokenClassifierConfig};
