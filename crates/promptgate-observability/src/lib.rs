//! PromptGate Observability
//!
//! This crate provides observability features:
//! - Metrics collection (Prometheus)
//! - Health, readiness and metrics endpoints

pub mod health;
pub mod metrics;

pub use health::{DetectorReadiness, DetectorStatus, HealthState, ReadinessChecker, health_router};
pub use metrics::Metrics;
