use std::fs;

use tempfile::tempdir;

use super::bundle::{load, load_or_unavailable, ArtifactLoadError, BundleFile, ModelBundle};
use super::classifier::{Classifier, InferenceError};
use super::inference::PredictError;
use super::threshold::DecisionThreshold;
use crate::logic::features::{default_feature_order, Feature, FeatureRow};
use crate::logic::passenger::{Embarked, Passenger, Pclass, Sex};

const BASELINE_MODEL: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../model/logistic_titanic_pipeline.json"
);

const RAW_PIPELINE: &str = r#"{
    "kind": "logistic_pipeline",
    "steps": [{"type": "one_hot", "column": "sex", "categories": ["female", "male"]}],
    "coefficients": [2.0, -2.0],
    "intercept": 0.0
}"#;

/// Returns a fixed probability, records nothing
#[derive(Debug)]
struct FixedClassifier(f64);

impl Classifier for FixedClassifier {
    fn predict_proba(&self, _row: &FeatureRow) -> Result<f64, InferenceError> {
        Ok(self.0)
    }

    fn kind(&self) -> &str {
        "fixed"
    }
}

#[derive(Debug)]
struct FailingClassifier;

impl Classifier for FailingClassifier {
    fn predict_proba(&self, _row: &FeatureRow) -> Result<f64, InferenceError> {
        Err(InferenceError("could not convert string to float: 'male'".to_string()))
    }

    fn kind(&self) -> &str {
        "failing"
    }
}

fn threshold(v: f64) -> DecisionThreshold {
    DecisionThreshold::new(v).unwrap()
}

fn first_class_woman() -> Passenger {
    Passenger {
        pclass: Pclass::First,
        sex: Sex::Female,
        age: 22.0,
        sibsp: 0,
        parch: 1,
        fare: 80.0,
        embarked: Embarked::C,
    }
}

fn third_class_man() -> Passenger {
    Passenger {
        pclass: Pclass::Third,
        sex: Sex::Male,
        age: 35.0,
        sibsp: 0,
        parch: 0,
        fare: 8.05,
        embarked: Embarked::S,
    }
}

fn write_bundle(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bundle.json");
    fs::write(&path, contents).unwrap();
    (dir, path)
}

// ============================================================================
// LOADING
// ============================================================================

#[test]
fn test_load_baseline_artifact() {
    let bundle = load(BASELINE_MODEL, DecisionThreshold::default()).unwrap();
    assert!(bundle.is_loaded());
    assert_eq!(bundle.threshold().value(), 0.5);
    assert_eq!(bundle.features(), default_feature_order().as_slice());
    assert_eq!(bundle.metadata().unwrap().kind, "logistic_pipeline");
}

#[test]
fn test_raw_bundle_uses_defaults() {
    let (_dir, path) = write_bundle(RAW_PIPELINE);
    let bundle = load(&path, threshold(0.3)).unwrap();

    assert!(bundle.is_loaded());
    assert_eq!(bundle.threshold(), threshold(0.3));
    assert_eq!(bundle.features(), default_feature_order().as_slice());
}

#[test]
fn test_annotated_bundle_overrides_defaults() {
    let contents = format!(
        r#"{{"model": {}, "threshold": 0.42, "features": ["sex", "age"]}}"#,
        RAW_PIPELINE
    );
    let (_dir, path) = write_bundle(&contents);
    let bundle = load(&path, threshold(0.3)).unwrap();

    assert_eq!(bundle.threshold(), threshold(0.42));
    assert_eq!(bundle.features(), &[Feature::Sex, Feature::Age]);
}

#[test]
fn test_annotated_bundle_without_optionals() {
    let contents = format!(r#"{{"model": {}}}"#, RAW_PIPELINE);
    let file = BundleFile::from_slice(contents.as_bytes()).unwrap();
    assert!(matches!(file, BundleFile::Annotated(_)));

    let bundle = ModelBundle::from_file(file, threshold(0.7)).unwrap();
    assert_eq!(bundle.threshold(), threshold(0.7));
    assert_eq!(bundle.features().len(), 7);
}

#[test]
fn test_unknown_feature_rejected() {
    let contents = format!(r#"{{"model": {}, "features": ["sex", "cabin"]}}"#, RAW_PIPELINE);
    let (_dir, path) = write_bundle(&contents);

    let err = load(&path, DecisionThreshold::default()).unwrap_err();
    assert!(matches!(err, ArtifactLoadError::Features(_)));
    assert!(err.to_string().contains("cabin"));
}

#[test]
fn test_duplicate_feature_rejected() {
    let contents = format!(r#"{{"model": {}, "features": ["sex", "sex"]}}"#, RAW_PIPELINE);
    let (_dir, path) = write_bundle(&contents);

    assert!(matches!(
        load(&path, DecisionThreshold::default()),
        Err(ArtifactLoadError::Features(_))
    ));
}

#[test]
fn test_out_of_range_bundle_threshold_rejected() {
    let contents = format!(r#"{{"model": {}, "threshold": 1.5}}"#, RAW_PIPELINE);
    let (_dir, path) = write_bundle(&contents);

    assert!(matches!(
        load(&path, DecisionThreshold::default()),
        Err(ArtifactLoadError::Threshold(_))
    ));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = load(dir.path().join("nope.json"), DecisionThreshold::default()).unwrap_err();
    assert!(matches!(err, ArtifactLoadError::Io { .. }));
}

#[test]
fn test_garbage_is_parse_error() {
    let (_dir, path) = write_bundle("not json at all");
    let err = load(&path, DecisionThreshold::default()).unwrap_err();
    assert!(matches!(err, ArtifactLoadError::Parse { .. }));
}

#[test]
fn test_lenient_load_reports_unavailable() {
    let dir = tempdir().unwrap();
    let bundle = load_or_unavailable(dir.path().join("missing.json"), threshold(0.4));

    assert!(!bundle.is_loaded());
    assert_eq!(bundle.threshold(), threshold(0.4));
    assert_eq!(bundle.features(), default_feature_order().as_slice());
    assert_eq!(
        bundle.predict(&first_class_woman(), None),
        Err(PredictError::ModelUnavailable)
    );
}

// ============================================================================
// PREDICTION
// ============================================================================

#[test]
fn test_scenario_first_class_woman_survives() {
    let bundle = load(BASELINE_MODEL, DecisionThreshold::default()).unwrap();
    let result = bundle.predict(&first_class_woman(), None).unwrap();

    assert_eq!(result.label, 1);
    assert!(result.probability > 0.9);
    assert_eq!(result.threshold, 0.5);
}

#[test]
fn test_scenario_third_class_man_with_raised_threshold() {
    let bundle = load(BASELINE_MODEL, DecisionThreshold::default()).unwrap();
    let result = bundle.predict(&third_class_man(), Some(threshold(0.6))).unwrap();

    assert_eq!(result.label, 0);
    assert!(result.probability < 0.1);
    assert_eq!(result.threshold, 0.6);
}

#[test]
fn test_label_iff_probability_reaches_threshold() {
    let bundle = load(BASELINE_MODEL, DecisionThreshold::default()).unwrap();
    let passengers = [first_class_woman(), third_class_man()];
    let thresholds = [None, Some(0.0), Some(0.05), Some(0.5), Some(0.95), Some(1.0)];

    for p in &passengers {
        for t in thresholds {
            let r = bundle.predict(p, t.map(threshold)).unwrap();
            assert!((0.0..=1.0).contains(&r.probability));
            assert_eq!(r.label == 1, r.probability >= r.threshold);
            assert_eq!(r.threshold, t.unwrap_or(0.5));
        }
    }
}

#[test]
fn test_prediction_is_idempotent() {
    let bundle = load(BASELINE_MODEL, DecisionThreshold::default()).unwrap();
    let a = bundle.predict(&third_class_man(), None).unwrap();
    let b = bundle.predict(&third_class_man(), None).unwrap();

    assert_eq!(a.probability.to_bits(), b.probability.to_bits());
    assert_eq!(a.label, b.label);
}

#[test]
fn test_probability_equal_to_threshold_is_positive() {
    let bundle = ModelBundle::new(
        Box::new(FixedClassifier(0.6)),
        threshold(0.5),
        default_feature_order(),
    );
    let result = bundle.predict(&third_class_man(), Some(threshold(0.6))).unwrap();
    assert_eq!(result.label, 1);
}

#[test]
fn test_schema_violation_before_inference() {
    let bundle = ModelBundle::new(Box::new(FailingClassifier), threshold(0.5), default_feature_order());
    let mut p = first_class_woman();
    p.age = 120.0001;

    match bundle.predict(&p, None) {
        Err(PredictError::SchemaViolation(v)) => {
            assert_eq!(v.fields().collect::<Vec<_>>(), vec!["age"]);
        }
        other => panic!("expected SchemaViolation, got {:?}", other),
    }
}

#[test]
fn test_inference_failure_is_bad_input() {
    let bundle = ModelBundle::new(Box::new(FailingClassifier), threshold(0.5), default_feature_order());

    match bundle.predict(&first_class_woman(), None) {
        Err(PredictError::BadInput(msg)) => assert!(msg.contains("could not convert")),
        other => panic!("expected BadInput, got {:?}", other),
    }
}

#[test]
fn test_out_of_range_probability_is_bad_input() {
    let bundle = ModelBundle::new(Box::new(FixedClassifier(f64::NAN)), threshold(0.5), default_feature_order());
    assert!(matches!(
        bundle.predict(&first_class_woman(), None),
        Err(PredictError::BadInput(_))
    ));
}

#[test]
fn test_feature_subset_missing_model_column_is_bad_input() {
    let contents = format!(r#"{{"model": {}, "features": ["age", "fare"]}}"#, RAW_PIPELINE);
    let (_dir, path) = write_bundle(&contents);
    let bundle = load(&path, DecisionThreshold::default()).unwrap();

    match bundle.predict(&first_class_woman(), None) {
        Err(PredictError::BadInput(msg)) => assert!(msg.contains("sex")),
        other => panic!("expected BadInput, got {:?}", other),
    }
}
