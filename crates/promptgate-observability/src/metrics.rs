//! Metrics collection with Prometheus
//!
//! This module provides Prometheus metrics for PromptGate:
//! - Classification counts by verdict and terminal state
//! - Classification failures by error kind
//! - Classification latency
//! - Redacted character totals

use prometheus::{CounterVec, Histogram, HistogramOpts, IntCounter, Opts, Registry};
use promptgate_core::{ClassificationOutcome, Error};
use std::sync::Arc;

/// Metrics collector for PromptGate
#[derive(Clone)]
pub struct Metrics {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Completed classifications
    pub classifications_total: CounterVec,
    /// Classifications that ended in an error
    pub classification_errors_total: CounterVec,
    /// End-to-end classification duration
    pub classification_duration_seconds: Histogram,
    /// Characters replaced by redaction
    pub redacted_characters_total: IntCounter,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let classifications_total = CounterVec::new(
            Opts::new(
                "promptgate_classifications_total",
                "Total number of completed classifications",
            ),
            &["verdict", "state"],
        )?;

        let classification_errors_total = CounterVec::new(
            Opts::new(
                "promptgate_classification_errors_total",
                "Total number of classifications that failed",
            ),
            &["kind"],
        )?;

        // Pattern-only decisions finish in microseconds, model stages in seconds
        let classification_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "promptgate_classification_duration_seconds",
                "Classification duration in seconds",
            )
            .buckets(vec![
                0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
        )?;

        let redacted_characters_total = IntCounter::with_opts(Opts::new(
            "promptgate_redacted_characters_total",
            "Total number of characters replaced by redaction",
        ))?;

        registry.register(Box::new(classifications_total.clone()))?;
        registry.register(Box::new(classification_errors_total.clone()))?;
        registry.register(Box::new(classification_duration_seconds.clone()))?;
        registry.register(Box::new(redacted_characters_total.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            classifications_total,
            classification_errors_total,
            classification_duration_seconds,
            redacted_characters_total,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record a completed classification
    pub fn record_outcome(
        &self,
        outcome: &ClassificationOutcome,
        redacted_chars: usize,
        duration_secs: f64,
    ) {
        self.classifications_total
            .with_label_values(&[outcome.verdict().as_str(), outcome.state().as_str()])
            .inc();
        self.redacted_characters_total.inc_by(redacted_chars as u64);
        self.classification_duration_seconds.observe(duration_secs);
    }

    /// Record a failed classification
    pub fn record_error(&self, error: &Error, duration_secs: f64) {
        self.classification_errors_total
            .with_label_values(&[error.kind()])
            .inc();
        self.classification_duration_seconds.observe(duration_secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptgate_core::{FiringState, Span};

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        // Unlabelled metrics are gathered even before any sample
        assert!(!metrics.registry().gather().is_empty());
    }

    #[test]
    fn test_record_outcome() {
        let metrics = Metrics::new().unwrap();
        let outcome = ClassificationOutcome::fired(
            FiringState::BlockedByPattern,
            "block_patterns",
            "my ******** 12345".to_string(),
            vec![Span::new(3, 11)],
        );
        metrics.record_outcome(&outcome, 8, 0.002);

        let gathered = metrics.registry().gather();
        let total_metric = gathered
            .iter()
            .find(|m| m.name() == "promptgate_classifications_total")
            .expect("classifications_total metric not found");

        assert_eq!(
            total_metric.metric[0]
                .counter
                .as_ref()
                .unwrap()
                .value
                .unwrap(),
            1.0
        );
        assert_eq!(metrics.redacted_characters_total.get(), 8);
        assert_eq!(
            metrics
                .classifications_total
                .with_label_values(&["blocked", "blocked_by_pattern"])
                .get(),
            1.0
        );
    }

    #[test]
    fn test_record_error() {
        let metrics = Metrics::new().unwrap();
        let error = Error::detector_unavailable("analyzer", "timeout");
        metrics.record_error(&error, 30.0);

        assert_eq!(
            metrics
                .classification_errors_total
                .with_label_values(&["detector_unavailable"])
                .get(),
            1.0
        );
        assert_eq!(metrics.classification_duration_seconds.get_sample_count(), 1);
    }
}
