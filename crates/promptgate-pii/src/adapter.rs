//! Adapters from entity detector findings to spans

use promptgate_core::{EntityFinding, Result, Span, TextEntityDetector};
use tracing::{debug, warn};

/// Convert detector findings to spans
///
/// Findings without both offsets are skipped with a warning. Findings scored
/// below `min_score` are dropped. Range checking is left to the redactor, so
/// out-of-range offsets surface there as `InvalidSpan`.
pub fn findings_to_spans(detector: &str, findings: Vec<EntityFinding>, min_score: f32) -> Vec<Span> {
    let mut spans = Vec::with_capacity(findings.len());

    for finding in findings {
        let (Some(start), Some(end)) = (finding.start, finding.end) else {
            warn!(
                detector,
                category = finding.category.as_deref().unwrap_or("unknown"),
                "Skipping finding without offsets"
            );
            continue;
        };

        if finding.score.is_some_and(|score| score < min_score) {
            debug!(
                detector,
                start,
                end,
                score = finding.score,
                min_score,
                "Dropping finding below score threshold"
            );
            continue;
        }

        spans.push(Span {
            start,
            end,
            label: finding.category,
        });
    }

    spans
}

/// Run `detector` on `text` and adapt its findings
pub fn detect_spans(
    detector: &dyn TextEntityDetector,
    text: &str,
    min_score: f32,
) -> Result<Vec<Span>> {
    let findings = detector.find(text)?;
    debug!(
        detector = detector.name(),
        findings = findings.len(),
        "Detector returned findings"
    );
    Ok(findings_to_spans(detector.name(), findings, min_score))
}
