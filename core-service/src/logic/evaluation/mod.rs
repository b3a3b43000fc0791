//! Evaluation Module - score a labelled cohort offline
//!
//! Rows are read leniently: a blank numeric cell is left missing and the
//! pipeline imputes it, as it did at training time. Labels and categorical
//! cells stay strict. Scoring and thresholding go through
//! `ModelBundle::predict_row`, shared with the HTTP endpoint.

pub mod metrics;

use serde::Serialize;

pub use metrics::ConfusionMatrix;

use crate::logic::dataset::{Cohort, DatasetError, LABEL_COLUMN};
use crate::logic::model::{DecisionThreshold, ModelBundle, PredictError};

#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error("cohort has no '{}' column", LABEL_COLUMN)]
    Unlabelled,
    #[error("cohort is empty")]
    Empty,
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error("line {line}: {source}")]
    Prediction {
        line: u64,
        #[source]
        source: PredictError,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub rows: usize,
    #[serde(flatten)]
    pub confusion: ConfusionMatrix,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub threshold: f64,
}

impl From<(ConfusionMatrix, f64)> for EvaluationReport {
    fn from((confusion, threshold): (ConfusionMatrix, f64)) -> Self {
        Self {
            rows: confusion.total(),
            confusion,
            accuracy: confusion.accuracy(),
            precision: confusion.precision(),
            recall: confusion.recall(),
            f1: confusion.f1(),
            threshold,
        }
    }
}

/// Score every row of a labelled cohort
///
/// `threshold` overrides the bundle threshold for all rows. The first row
/// that fails conversion or inference aborts the run.
pub fn evaluate(
    bundle: &ModelBundle,
    cohort: &Cohort,
    threshold: Option<DecisionThreshold>,
) -> Result<EvaluationReport, EvaluationError> {
    if !cohort.has_labels() {
        return Err(EvaluationError::Unlabelled);
    }
    if cohort.is_empty() {
        return Err(EvaluationError::Empty);
    }

    let mut confusion = ConfusionMatrix::default();
    for record in cohort.records() {
        let row = record.to_feature_row(bundle.features())?;
        let actual = record.label()?.ok_or(EvaluationError::Unlabelled)?;

        let prediction = bundle
            .predict_row(&row, threshold)
            .map_err(|source| EvaluationError::Prediction {
                line: record.line(),
                source,
            })?;
        confusion.record(actual, prediction.label);
    }

    let applied = bundle.threshold().resolve(threshold).value();
    let report = EvaluationReport::from((confusion, applied));
    log::info!(
        "Evaluated {} rows: accuracy={:.3} precision={:.3} recall={:.3} f1={:.3}",
        report.rows,
        report.accuracy,
        report.precision,
        report.recall,
        report.f1
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::dataset::read_csv;
    use crate::logic::features::{default_feature_order, FeatureRow, FeatureValue};
    use crate::logic::model::{self, Classifier, InferenceError};
    use crate::logic::passenger::{Embarked, Passenger, Pclass, Sex};

    const BASELINE_MODEL: &str = concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../model/logistic_titanic_pipeline.json"
    );

    /// Survives iff female
    #[derive(Debug)]
    struct SexClassifier;

    impl Classifier for SexClassifier {
        fn predict_proba(&self, row: &FeatureRow) -> Result<f64, InferenceError> {
            match row.get("sex") {
                Some(FeatureValue::Category(s)) if s == "female" => Ok(0.9),
                Some(_) => Ok(0.1),
                None => Err(InferenceError("sex missing".into())),
            }
        }

        fn kind(&self) -> &str {
            "sex_rule"
        }
    }

    fn bundle() -> ModelBundle {
        ModelBundle::new(
            Box::new(SexClassifier),
            DecisionThreshold::default(),
            default_feature_order(),
        )
    }

    const FUTURE: &str = "\
pclass,sex,age,sibsp,parch,fare,embarked,survived
1,female,22,0,1,80.0,C,1
2,female,30,0,0,13.0,S,0
3,male,35,0,0,8.05,S,0
1,male,40,1,0,52.0,C,1
3,female,4,1,1,16.7,S,1
";

    #[test]
    fn test_evaluate_confusion() {
        let cohort = read_csv(FUTURE.as_bytes()).unwrap();
        let report = evaluate(&bundle(), &cohort, None).unwrap();

        assert_eq!(report.rows, 5);
        assert_eq!(report.confusion, ConfusionMatrix { tp: 2, fp: 1, tn: 1, fn_: 1 });
        assert!((report.f1 - 4.0 / 6.0).abs() < 1e-12);
        assert_eq!(report.threshold, 0.5);
        assert!(report.f1 > 0.5);
    }

    #[test]
    fn test_threshold_override_applies_to_all_rows() {
        let cohort = read_csv(FUTURE.as_bytes()).unwrap();
        let strict = DecisionThreshold::new(0.95).unwrap();
        let report = evaluate(&bundle(), &cohort, Some(strict)).unwrap();

        assert_eq!(report.confusion.tp + report.confusion.fp, 0);
        assert_eq!(report.threshold, 0.95);
    }

    #[test]
    fn test_unlabelled_cohort_rejected() {
        let csv = "pclass,sex,age,sibsp,parch,fare,embarked\n1,female,22,0,1,80,C\n";
        let cohort = read_csv(csv.as_bytes()).unwrap();
        assert!(matches!(
            evaluate(&bundle(), &cohort, None),
            Err(EvaluationError::Unlabelled)
        ));
    }

    #[test]
    fn test_model_unavailable_reports_line() {
        let cohort = read_csv(FUTURE.as_bytes()).unwrap();
        let empty = ModelBundle::unavailable(DecisionThreshold::default());

        match evaluate(&empty, &cohort, None) {
            Err(EvaluationError::Prediction { line, source }) => {
                assert_eq!(line, 2);
                assert_eq!(source, PredictError::ModelUnavailable);
            }
            other => panic!("expected Prediction error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_row_aborts() {
        let csv = "pclass,sex,age,sibsp,parch,fare,embarked,survived\n1,female,22,0,1,80,C,1\n5,male,30,0,0,9,S,0\n";
        let cohort = read_csv(csv.as_bytes()).unwrap();
        assert!(matches!(
            evaluate(&bundle(), &cohort, None),
            Err(EvaluationError::Dataset(DatasetError::InvalidRow { line: 3, .. }))
        ));
    }

    #[test]
    fn test_blank_age_is_imputed() {
        let csv = "\
pclass,sex,age,sibsp,parch,fare,embarked,survived
1,female,22,0,1,80.0,C,1
3,male,,0,0,7.75,Q,0
";
        let cohort = read_csv(csv.as_bytes()).unwrap();
        let baseline = model::load(BASELINE_MODEL, DecisionThreshold::default()).unwrap();

        let report = evaluate(&baseline, &cohort, None).unwrap();
        assert_eq!(report.rows, 2);
        assert_eq!(report.confusion.total(), 2);
    }

    #[test]
    fn test_blank_age_scores_like_training_median() {
        let csv = "pclass,sex,age,sibsp,parch,fare,embarked\n3,male,,0,0,7.75,Q\n";
        let cohort = read_csv(csv.as_bytes()).unwrap();
        let baseline = model::load(BASELINE_MODEL, DecisionThreshold::default()).unwrap();

        let record = cohort.records().next().unwrap();
        let row = record.to_feature_row(baseline.features()).unwrap();
        let imputed = baseline.predict_row(&row, None).unwrap();

        // The shipped pipeline imputes age with 28
        let explicit = Passenger {
            pclass: Pclass::Third,
            sex: Sex::Male,
            age: 28.0,
            sibsp: 0,
            parch: 0,
            fare: 7.75,
            embarked: Embarked::Q,
        };
        let direct = baseline.predict(&explicit, None).unwrap();
        assert_eq!(imputed.probability.to_bits(), direct.probability.to_bits());
        assert_eq!(imputed.label, direct.label);
    }

    #[test]
    fn test_bad_category_rejected_despite_blank_age() {
        let csv = "\
pclass,sex,age,sibsp,parch,fare,embarked,survived
3,male,,0,0,7.75,Q,0
3,robot,,0,0,7.75,Q,0
";
        let cohort = read_csv(csv.as_bytes()).unwrap();
        assert!(matches!(
            evaluate(&bundle(), &cohort, None),
            Err(EvaluationError::Dataset(DatasetError::InvalidRow { line: 3, .. }))
        ));
    }
}
