//! End-to-end classification tests over the standard cascade

use promptgate_classifier::{Classifier, ClassifierConfig, DEFAULT_BLOCK_PATTERNS, PatternConfig};
use promptgate_core::{
    CascadeState, EntityFinding, Error, Result, TextEntityDetector, Verdict,
};
use promptgate_pii::{RedactionMode, RedactorConfig, StaticDetector};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts calls and answers with fixed findings
struct CountingDetector {
    name: &'static str,
    findings: Vec<EntityFinding>,
    calls: AtomicUsize,
}

impl CountingDetector {
    fn new(name: &'static str, findings: Vec<EntityFinding>) -> Arc<Self> {
        Arc::new(Self {
            name,
            findings,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextEntityDetector for CountingDetector {
    fn name(&self) -> &str {
        self.name
    }

    fn find(&self, _text: &str) -> Result<Vec<EntityFinding>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.findings.clone())
    }
}

fn classifier_with(
    analyzer: Vec<EntityFinding>,
    model: Vec<EntityFinding>,
) -> (Classifier, Arc<CountingDetector>, Arc<CountingDetector>) {
    let analyzer = CountingDetector::new("analyzer", analyzer);
    let model = CountingDetector::new("token_model", model);
    let classifier = Classifier::from_config(
        &ClassifierConfig::default(),
        Some(analyzer.clone()),
        Some(model.clone()),
    )
    .unwrap();
    (classifier, analyzer, model)
}

#[test]
fn test_api_key_is_blocked_and_redacted() {
    let (classifier, analyzer, model) = classifier_with(vec![], vec![]);

    let outcome = classifier.classify("my api_key: 12345").unwrap();

    assert_eq!(outcome.verdict(), Verdict::Blocked);
    assert_eq!(outcome.state(), CascadeState::BlockedByPattern);
    assert_eq!(outcome.redacted_text(), "my ******** 12345");
    assert!(!outcome.redacted_text().contains("api_key:"));
    assert_eq!(analyzer.calls(), 0);
    assert_eq!(model.calls(), 0);
}

#[test]
fn test_every_block_literal_is_removed() {
    let (classifier, _, _) = classifier_with(vec![], vec![]);
    let text = "CONFIDENTIAL: my ssn and card 4111111111111111, also confidential";

    let outcome = classifier.classify(text).unwrap();

    assert_eq!(outcome.verdict(), Verdict::Blocked);
    let redacted = outcome.redacted_text().to_lowercase();
    assert!(!redacted.contains("confidential"));
    assert!(!redacted.contains("ssn"));
    assert!(!redacted.contains("4111111111111111"));
    assert_eq!(outcome.spans().len(), 4);
}

#[test]
fn test_repeated_literal_is_redacted_everywhere() {
    let (classifier, _, _) = classifier_with(vec![], vec![]);

    let outcome = classifier
        .classify("private_key one, private_key two")
        .unwrap();

    assert_eq!(
        outcome.redacted_text(),
        "*********** one, *********** two"
    );
}

#[test]
fn test_code_is_warning() {
    let (classifier, analyzer, model) = classifier_with(vec![], vec![]);

    let outcome = classifier.classify("def foo(): pass").unwrap();

    assert_eq!(outcome.verdict(), Verdict::Warning);
    assert_eq!(outcome.state(), CascadeState::WarnByPattern);
    assert_eq!(outcome.redacted_text(), "********): pass");
    assert_eq!(analyzer.calls(), 0);
    assert_eq!(model.calls(), 0);
}

#[test]
fn test_block_wins_over_code() {
    let (classifier, _, _) = classifier_with(vec![], vec![]);

    let outcome = classifier
        .classify("import os\nprivate_key = load()")
        .unwrap();

    assert_eq!(outcome.verdict(), Verdict::Blocked);
    // Only the block stage's spans are redacted
    assert!(outcome.redacted_text().starts_with("import os\n"));
}

#[test]
fn test_name_found_by_analyzer_is_warning() {
    let (classifier, analyzer, model) =
        classifier_with(vec![EntityFinding::new(11, 21, "PERSON").with_score(0.85)], vec![]);

    let outcome = classifier.classify("My name is John Smith").unwrap();

    assert_eq!(outcome.verdict(), Verdict::Warning);
    assert_eq!(outcome.state(), CascadeState::WarnByAnalyzer);
    assert_eq!(outcome.redacted_text(), "My name is **********");
    assert_eq!(analyzer.calls(), 1);
    assert_eq!(model.calls(), 0);
}

#[test]
fn test_model_finding_blocks() {
    let (classifier, analyzer, model) =
        classifier_with(vec![], vec![EntityFinding::new(5, 9, "GIVENNAME")]);

    let outcome = classifier.classify("Call Jane tomorrow").unwrap();

    assert_eq!(outcome.verdict(), Verdict::Blocked);
    assert_eq!(outcome.state(), CascadeState::BlockedByModel);
    assert_eq!(outcome.redacted_text(), "Call **** tomorrow");
    assert_eq!(analyzer.calls(), 1);
    assert_eq!(model.calls(), 1);
}

#[test]
fn test_nothing_found_is_safe_and_unchanged() {
    let (classifier, analyzer, model) = classifier_with(vec![], vec![]);
    let text = "What is the tallest mountain in Europe?";

    let outcome = classifier.classify(text).unwrap();

    assert_eq!(outcome.verdict(), Verdict::Safe);
    assert_eq!(outcome.redacted_text(), text);
    assert!(outcome.spans().is_empty());
    assert_eq!(analyzer.calls(), 1);
    assert_eq!(model.calls(), 1);
}

#[test]
fn test_empty_prompt_skips_detectors() {
    let (classifier, analyzer, model) = classifier_with(vec![], vec![]);

    let outcome = classifier.classify("").unwrap();

    assert_eq!(outcome.verdict(), Verdict::Safe);
    assert_eq!(analyzer.calls(), 0);
    assert_eq!(model.calls(), 0);
}

#[test]
fn test_out_of_range_detector_span_is_invalid_span() {
    let (classifier, _, _) = classifier_with(vec![EntityFinding::new(3, 50, "PERSON")], vec![]);

    let err = classifier.classify("Hi John").unwrap_err();

    match err {
        Error::InvalidSpan { start, end, len } => assert_eq!((start, end, len), (3, 50, 7)),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_overlapping_detector_spans() {
    let (classifier, _, _) = classifier_with(
        vec![
            EntityFinding::new(0, 8, "PERSON"),
            EntityFinding::new(5, 14, "PERSON"),
        ],
        vec![],
    );

    let outcome = classifier.classify("Jane Doe Smith was here").unwrap();

    assert_eq!(outcome.redacted_text(), "************** was here");
}

#[test]
fn test_unavailable_detector_is_error_not_safe() {
    let classifier = Classifier::from_config(
        &ClassifierConfig::default(),
        Some(Arc::new(StaticDetector::failing("analyzer", "service down"))),
        Some(Arc::new(StaticDetector::empty("token_model"))),
    )
    .unwrap();

    let result = classifier.classify("Nothing to see");

    assert!(matches!(result, Err(Error::DetectorUnavailable { .. })));
}

#[test]
fn test_without_entity_detectors_only_patterns_run() {
    let classifier = Classifier::from_config(&ClassifierConfig::default(), None, None).unwrap();

    assert_eq!(
        classifier.cascade().stage_names(),
        vec!["block_patterns", "code_patterns"]
    );
    assert_eq!(
        classifier.classify("My name is John Smith").unwrap().verdict(),
        Verdict::Safe
    );
}

#[test]
fn test_placeholder_redaction() {
    let config = ClassifierConfig {
        redaction: RedactorConfig {
            mode: RedactionMode::Placeholder,
            ..RedactorConfig::default()
        },
        ..ClassifierConfig::default()
    };
    let classifier = Classifier::from_config(&config, None, None).unwrap();

    let outcome = classifier.classify("my api_key: 12345").unwrap();

    assert_eq!(outcome.redacted_text(), "my [REDACTED] 12345");
}

#[test]
fn test_analyzer_min_score_applies() {
    let config = ClassifierConfig {
        analyzer_min_score: 0.5,
        ..ClassifierConfig::default()
    };
    let classifier = Classifier::from_config(
        &config,
        Some(Arc::new(StaticDetector::new(
            "analyzer",
            vec![EntityFinding::new(0, 4, "PERSON").with_score(0.2)],
        ))),
        Some(Arc::new(StaticDetector::empty("token_model"))),
    )
    .unwrap();

    assert_eq!(classifier.classify("John went home").unwrap().verdict(), Verdict::Safe);
}

#[test]
fn test_custom_patterns_replace_defaults() {
    let config = ClassifierConfig {
        patterns: PatternConfig {
            block: vec!["project\\s+falcon".to_string()],
            code: vec![],
        },
        ..ClassifierConfig::default()
    };
    let classifier = Classifier::from_config(&config, None, None).unwrap();

    assert_eq!(
        classifier.classify("Status of Project Falcon?").unwrap().verdict(),
        Verdict::Blocked
    );
    // Default block words no longer apply
    assert_eq!(
        classifier.classify("this is confidential").unwrap().verdict(),
        Verdict::Safe
    );
    assert_eq!(DEFAULT_BLOCK_PATTERNS.len(), 6);
}

#[test]
fn test_invalid_pattern_config() {
    let config = ClassifierConfig {
        patterns: PatternConfig {
            block: vec!["[unclosed".to_string()],
            code: vec![],
        },
        ..ClassifierConfig::default()
    };

    assert!(matches!(
        Classifier::from_config(&config, None, None),
        Err(Error::Config(_))
    ));
}

#[test]
fn test_classification_is_repeatable() {
    let (classifier, _, _) =
        classifier_with(vec![EntityFinding::new(11, 21, "PERSON")], vec![]);

    let first = classifier.classify("My name is John Smith").unwrap();
    let second = classifier.classify("My name is John Smith").unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_classifier_is_shareable_across_threads() {
    let (classifier, _, _) = classifier_with(vec![], vec![]);
    let classifier = Arc::new(classifier);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let classifier = Arc::clone(&classifier);
            std::thread::spawn(move || classifier.classify("def foo(): pass").unwrap().verdict())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), Verdict::Warning);
    }
}
