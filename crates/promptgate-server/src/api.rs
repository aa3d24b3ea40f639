//! Classification HTTP API
//!
//! Two surfaces share one handler path:
//! - `POST /v1/classify` with a JSON body `{"prompt": "..."}`
//! - `POST /classify` with a form-encoded `prompt` field
//!
//! Both answer with the verdict, the redacted prompt, the firing stage and the
//! number of spans that were masked.

use axum::{
    Form, Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use promptgate_classifier::Classifier;
use promptgate_core::{CascadeState, ClassificationOutcome, Verdict};
use promptgate_observability::Metrics;
use promptgate_pii::covered_characters;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Shared state for the classification routes
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<Classifier>,
    pub metrics: Arc<Metrics>,
    pub log_requests: bool,
}

impl AppState {
    pub fn new(classifier: Arc<Classifier>, metrics: Arc<Metrics>) -> Self {
        Self {
            classifier,
            metrics,
            log_requests: false,
        }
    }

    pub fn with_request_logging(mut self, enabled: bool) -> Self {
        self.log_requests = enabled;
        self
    }
}

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ClassifyResponse {
    pub result: Verdict,
    pub redacted: String,
    pub stage: Option<String>,
    pub state: CascadeState,
    pub spans: usize,
}

impl From<ClassificationOutcome> for ClassifyResponse {
    fn from(outcome: ClassificationOutcome) -> Self {
        let stage = outcome.stage().map(str::to_string);
        let state = outcome.state();
        let spans = outcome.spans().len();
        let (result, redacted) = outcome.into_parts();

        Self {
            result,
            redacted,
            stage,
            state,
            spans,
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("prompt must not be empty")]
    EmptyPrompt,

    #[error(transparent)]
    Classification(#[from] promptgate_core::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::EmptyPrompt => StatusCode::BAD_REQUEST,
            ApiError::Classification(promptgate_core::Error::DetectorUnavailable { .. }) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::Classification(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::EmptyPrompt => "invalid_request_error",
            ApiError::Classification(err) => err.kind(),
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({
            "error": {
                "type": self.error_type(),
                "message": self.to_string(),
            }
        });

        (status, Json(body)).into_response()
    }
}

/// Request id used to correlate log lines for one classification
fn request_id() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let count = COUNTER.fetch_add(1, Ordering::Relaxed);
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_micros())
        .unwrap_or_default();

    format!("cls_{:x}_{:x}", timestamp, count)
}

async fn classify_json(
    State(state): State<AppState>,
    Json(request): Json<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    run_classification(&state, request.prompt).await
}

async fn classify_form(
    State(state): State<AppState>,
    Form(request): Form<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    run_classification(&state, request.prompt).await
}

async fn run_classification(
    state: &AppState,
    prompt: String,
) -> Result<Json<ClassifyResponse>, ApiError> {
    if prompt.is_empty() {
        return Err(ApiError::EmptyPrompt);
    }

    let request_id = request_id();
    if state.log_requests {
        info!(
            request_id = %request_id,
            prompt_chars = prompt.chars().count(),
            "Classification request"
        );
    }

    // Detector stages perform blocking HTTP calls
    let classifier = state.classifier.clone();
    let started = Instant::now();
    let result = tokio::task::spawn_blocking(move || classifier.classify(&prompt))
        .await
        .map_err(|e| ApiError::Internal(format!("classification task failed: {}", e)))?;
    let elapsed = started.elapsed().as_secs_f64();

    match result {
        Ok(outcome) => {
            let redacted_chars = covered_characters(outcome.spans());
            state
                .metrics
                .record_outcome(&outcome, redacted_chars, elapsed);

            if state.log_requests {
                info!(
                    request_id = %request_id,
                    verdict = %outcome.verdict(),
                    state = %outcome.state(),
                    stage = outcome.stage().unwrap_or("-"),
                    spans = outcome.spans().len(),
                    duration_ms = elapsed * 1000.0,
                    "Classification complete"
                );
            } else {
                debug!(
                    request_id = %request_id,
                    verdict = %outcome.verdict(),
                    "Classification complete"
                );
            }

            Ok(Json(outcome.into()))
        }
        Err(err) => {
            state.metrics.record_error(&err, elapsed);
            match &err {
                promptgate_core::Error::DetectorUnavailable { .. } => {
                    warn!(request_id = %request_id, "Classification failed: {}", err)
                }
                _ => error!(request_id = %request_id, "Classification failed: {}", err),
            }
            Err(err.into())
        }
    }
}

/// Create the classification router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/classify", post(classify_json))
        .route("/classify", post(classify_form))
        .with_state(state)
}
