//! Health endpoints
//!
//! This module provides HTTP health check endpoints:
//! - `/healthz` - Liveness probe (always returns 200 OK if server is running)
//! - `/readyz` - Readiness probe (checks entity detector availability)
//! - `/metrics` - Prometheus metrics endpoint

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use prometheus::TextEncoder;
use promptgate_core::TextEntityDetector;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::metrics::Metrics;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Optional message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Readiness check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Service status
    pub status: String,
    /// Detector statuses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detectors: Option<Vec<DetectorStatus>>,
    /// Optional message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Detector status in readiness check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorStatus {
    /// Detector name
    pub name: String,
    /// `healthy` or `unavailable`
    pub status: String,
    /// Failure reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DetectorStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Readiness checker trait
///
/// Checks may block on network calls; the handler runs them off the async
/// worker threads.
pub trait ReadinessChecker: Send + Sync {
    /// Get detector statuses
    fn detector_statuses(&self) -> Vec<DetectorStatus>;
}

/// Readiness from the health checks of entity detectors
pub struct DetectorReadiness {
    detectors: Vec<Arc<dyn TextEntityDetector>>,
}

impl DetectorReadiness {
    pub fn new(detectors: Vec<Arc<dyn TextEntityDetector>>) -> Self {
        Self { detectors }
    }
}

impl ReadinessChecker for DetectorReadiness {
    fn detector_statuses(&self) -> Vec<DetectorStatus> {
        self.detectors
            .iter()
            .map(|detector| match detector.health_check() {
                Ok(()) => DetectorStatus {
                    name: detector.name().to_string(),
                    status: "healthy".to_string(),
                    message: None,
                },
                Err(e) => {
                    warn!(detector = detector.name(), error = %e, "Detector health check failed");
                    DetectorStatus {
                        name: detector.name().to_string(),
                        status: "unavailable".to_string(),
                        message: Some(e.to_string()),
                    }
                }
            })
            .collect()
    }
}

/// Health check state
#[derive(Clone)]
pub struct HealthState {
    /// Metrics collector
    pub metrics: Arc<Metrics>,
    /// Optional readiness checker
    pub readiness_checker: Option<Arc<dyn ReadinessChecker>>,
}

impl HealthState {
    /// Create a new health state
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self {
            metrics,
            readiness_checker: None,
        }
    }

    /// Create a new health state with readiness checker
    pub fn with_readiness_checker(
        metrics: Arc<Metrics>,
        readiness_checker: Arc<dyn ReadinessChecker>,
    ) -> Self {
        Self {
            metrics,
            readiness_checker: Some(readiness_checker),
        }
    }
}

/// Create health check router
pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Liveness probe handler
///
/// Returns 200 OK if the server is running
async fn healthz() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: None,
    })
}

/// Readiness probe handler
///
/// Returns 200 OK if every detector is healthy
/// Returns 503 Service Unavailable otherwise
async fn readyz(State(state): State<HealthState>) -> Response {
    let Some(checker) = state.readiness_checker.clone() else {
        // No readiness checker, assume ready
        return (
            StatusCode::OK,
            Json(ReadinessResponse {
                status: "ready".to_string(),
                detectors: None,
                message: None,
            }),
        )
            .into_response();
    };

    let statuses = match tokio::task::spawn_blocking(move || checker.detector_statuses()).await {
        Ok(statuses) => statuses,
        Err(e) => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadinessResponse {
                    status: "not_ready".to_string(),
                    detectors: None,
                    message: Some(format!("Readiness check failed: {}", e)),
                }),
            )
                .into_response();
        }
    };

    if statuses.iter().all(DetectorStatus::is_healthy) {
        (
            StatusCode::OK,
            Json(ReadinessResponse {
                status: "ready".to_string(),
                detectors: Some(statuses),
                message: None,
            }),
        )
            .into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "not_ready".to_string(),
                detectors: Some(statuses),
                message: Some("One or more detectors are unavailable".to_string()),
            }),
        )
            .into_response()
    }
}

/// Prometheus metrics handler
///
/// Returns metrics in Prometheus text format
async fn metrics_handler(State(state): State<HealthState>) -> Response {
    let encoder = TextEncoder::new();
    let metric_families = state.metrics.registry().gather();

    match encoder.encode_to_string(&metric_families) {
        Ok(body) => (
            StatusCode::OK,
            [("Content-Type", "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to encode metrics: {}", err),
        )
            .into_response(),
    }
}
