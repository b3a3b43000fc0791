//! Logistic Pipeline - fitted preprocessing + logistic regression
//!
//! Artifact layout (`kind` selects the classifier family):
//!
//! ```text
//! {
//!   "kind": "logistic_pipeline",
//!   "steps": [
//!     {"type": "numeric", "column": "age", "impute": 28.0, "mean": 29.7, "scale": 14.5},
//!     {"type": "one_hot", "column": "sex", "categories": ["female", "male"]}
//!   ],
//!   "coefficients": [-0.5, 1.3, -1.3],
//!   "intercept": -0.4
//! }
//! ```
//!
//! Numeric steps emit `(x - mean) / scale`, one-hot steps emit one column per
//! category; unknown categories encode as all zeros.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::classifier::{Classifier, InferenceError};
use crate::logic::features::{FeatureRow, FeatureValue};

// ============================================================================
// SERIALIZED FORM
// ============================================================================

/// Serialized classifier, tagged by family
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierSpec {
    LogisticPipeline(PipelineSpec),
}

impl ClassifierSpec {
    /// Validate fitted parameters and build the runtime classifier
    pub fn build(self) -> Result<Box<dyn Classifier>, PipelineError> {
        match self {
            ClassifierSpec::LogisticPipeline(spec) => {
                Ok(Box::new(LogisticPipeline::try_from(spec)?))
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSpec {
    pub steps: Vec<PipelineStep>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineStep {
    Numeric {
        column: String,
        impute: f64,
        mean: f64,
        scale: f64,
    },
    OneHot {
        column: String,
        categories: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    #[error("pipeline has no steps")]
    Empty,
    #[error("pipeline encodes {encoded} columns but has {coefficients} coefficients")]
    WidthMismatch { encoded: usize, coefficients: usize },
    #[error("step for '{0}' has a zero or non-finite scale")]
    InvalidScale(String),
    #[error("non-finite parameter in {0}")]
    NonFinite(String),
}

impl PipelineStep {
    pub fn column(&self) -> &str {
        match self {
            PipelineStep::Numeric { column, .. } | PipelineStep::OneHot { column, .. } => column,
        }
    }

    /// Number of encoded output columns
    pub fn width(&self) -> usize {
        match self {
            PipelineStep::Numeric { .. } => 1,
            PipelineStep::OneHot { categories, .. } => categories.len(),
        }
    }

    fn check(&self) -> Result<(), PipelineError> {
        if let PipelineStep::Numeric { column, impute, mean, scale } = self {
            if !scale.is_finite() || *scale == 0.0 {
                return Err(PipelineError::InvalidScale(column.clone()));
            }
            if !impute.is_finite() || !mean.is_finite() {
                return Err(PipelineError::NonFinite(format!("step '{}'", column)));
            }
        }
        Ok(())
    }

    fn encode_into(&self, value: &FeatureValue, out: &mut Vec<f64>) -> Result<(), InferenceError> {
        match self {
            PipelineStep::Numeric { column, impute, mean, scale } => {
                let x = value.as_number().ok_or_else(|| {
                    InferenceError(format!(
                        "column '{}' expects a number, got '{}'",
                        column,
                        value.as_category()
                    ))
                })?;
                let x = if x.is_nan() { *impute } else { x };
                out.push((x - mean) / scale);
            }
            PipelineStep::OneHot { categories, .. } => {
                let category = value.as_category();
                out.extend(
                    categories
                        .iter()
                        .map(|c| if c.as_str() == category.as_ref() { 1.0 } else { 0.0 }),
                );
            }
        }
        Ok(())
    }
}

// ============================================================================
// RUNTIME FORM
// ============================================================================

#[derive(Debug, Clone)]
pub struct LogisticPipeline {
    steps: Vec<PipelineStep>,
    weights: Array1<f64>,
    intercept: f64,
}

impl TryFrom<PipelineSpec> for LogisticPipeline {
    type Error = PipelineError;

    fn try_from(spec: PipelineSpec) -> Result<Self, Self::Error> {
        if spec.steps.is_empty() {
            return Err(PipelineError::Empty);
        }
        for step in &spec.steps {
            step.check()?;
        }

        let encoded: usize = spec.steps.iter().map(PipelineStep::width).sum();
        if encoded != spec.coefficients.len() {
            return Err(PipelineError::WidthMismatch {
                encoded,
                coefficients: spec.coefficients.len(),
            });
        }
        if !spec.intercept.is_finite() || spec.coefficients.iter().any(|w| !w.is_finite()) {
            return Err(PipelineError::NonFinite("coefficients".to_string()));
        }

        Ok(Self {
            steps: spec.steps,
            weights: Array1::from_vec(spec.coefficients),
            intercept: spec.intercept,
        })
    }
}

impl LogisticPipeline {
    /// Encode a row into the dense vector the coefficients apply to
    pub fn encode(&self, row: &FeatureRow) -> Result<Array1<f64>, InferenceError> {
        let mut out = Vec::with_capacity(self.weights.len());
        for step in &self.steps {
            let value = row.get(step.column()).ok_or_else(|| {
                InferenceError(format!(
                    "column '{}' is not among the model's input features",
                    step.column()
                ))
            })?;
            step.encode_into(value, &mut out)?;
        }
        Ok(Array1::from_vec(out))
    }

    pub fn decision_function(&self, row: &FeatureRow) -> Result<f64, InferenceError> {
        let x = self.encode(row)?;
        Ok(self.weights.dot(&x) + self.intercept)
    }
}

impl Classifier for LogisticPipeline {
    fn predict_proba(&self, row: &FeatureRow) -> Result<f64, InferenceError> {
        self.decision_function(row).map(sigmoid)
    }

    fn kind(&self) -> &str {
        "logistic_pipeline"
    }
}

/// Logistic function, stable for large |z|
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::{default_feature_order, Feature};
    use crate::logic::passenger::{Embarked, Passenger, Pclass, Sex};

    fn spec() -> PipelineSpec {
        PipelineSpec {
            steps: vec![
                PipelineStep::Numeric {
                    column: "age".into(),
                    impute: 28.0,
                    mean: 30.0,
                    scale: 10.0,
                },
                PipelineStep::OneHot {
                    column: "sex".into(),
                    categories: vec!["female".into(), "male".into()],
                },
                PipelineStep::OneHot {
                    column: "pclass".into(),
                    categories: vec!["1".into(), "2".into(), "3".into()],
                },
            ],
            coefficients: vec![-0.5, 1.0, -1.0, 0.8, 0.0, -0.8],
            intercept: 0.25,
        }
    }

    fn passenger() -> Passenger {
        Passenger {
            pclass: Pclass::Third,
            sex: Sex::Female,
            age: 40.0,
            sibsp: 1,
            parch: 0,
            fare: 10.0,
            embarked: Embarked::Q,
        }
    }

    #[test]
    fn test_encode_layout() {
        let pipeline = LogisticPipeline::try_from(spec()).unwrap();
        let row = FeatureRow::assemble(&passenger(), &default_feature_order());

        let x = pipeline.encode(&row).unwrap();
        assert_eq!(x.to_vec(), vec![1.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_probability_matches_hand_computation() {
        let pipeline = LogisticPipeline::try_from(spec()).unwrap();
        let row = FeatureRow::assemble(&passenger(), &default_feature_order());

        // -0.5*1 + 1.0 - 0.8 + 0.25
        let z: f64 = -0.05;
        let expected = 1.0 / (1.0 + (-z).exp());
        let p = pipeline.predict_proba(&row).unwrap();
        assert!((p - expected).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_category_encodes_zeros() {
        let pipeline = LogisticPipeline::try_from(PipelineSpec {
            steps: vec![PipelineStep::OneHot {
                column: "embarked".into(),
                categories: vec!["C".into(), "S".into()],
            }],
            coefficients: vec![1.0, 2.0],
            intercept: 0.0,
        })
        .unwrap();
        let row = FeatureRow::assemble(&passenger(), &default_feature_order());

        assert_eq!(pipeline.encode(&row).unwrap().to_vec(), vec![0.0, 0.0]);
        assert!((pipeline.predict_proba(&row).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_column_outside_feature_order_fails() {
        let pipeline = LogisticPipeline::try_from(spec()).unwrap();
        let row = FeatureRow::assemble(&passenger(), &[Feature::Sex, Feature::Pclass]);

        let err = pipeline.predict_proba(&row).unwrap_err();
        assert!(err.0.contains("age"));
    }

    #[test]
    fn test_categorical_into_numeric_step_fails() {
        let pipeline = LogisticPipeline::try_from(PipelineSpec {
            steps: vec![PipelineStep::Numeric {
                column: "sex".into(),
                impute: 0.0,
                mean: 0.0,
                scale: 1.0,
            }],
            coefficients: vec![1.0],
            intercept: 0.0,
        })
        .unwrap();
        let row = FeatureRow::assemble(&passenger(), &default_feature_order());

        assert!(pipeline.predict_proba(&row).is_err());
    }

    #[test]
    fn test_width_mismatch_rejected() {
        let mut bad = spec();
        bad.coefficients.pop();
        assert_eq!(
            LogisticPipeline::try_from(bad).unwrap_err(),
            PipelineError::WidthMismatch { encoded: 6, coefficients: 5 }
        );
    }

    #[test]
    fn test_zero_scale_rejected() {
        let mut bad = spec();
        bad.steps[0] = PipelineStep::Numeric {
            column: "age".into(),
            impute: 28.0,
            mean: 30.0,
            scale: 0.0,
        };
        assert_eq!(
            LogisticPipeline::try_from(bad).unwrap_err(),
            PipelineError::InvalidScale("age".into())
        );
    }

    #[test]
    fn test_sigmoid_extremes() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(800.0) <= 1.0);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!(sigmoid(-800.0).is_finite());
    }

    #[test]
    fn test_spec_deserializes_with_kind_tag() {
        let json = r#"{
            "kind": "logistic_pipeline",
            "steps": [{"type": "one_hot", "column": "sex", "categories": ["female", "male"]}],
            "coefficients": [1.0, -1.0],
            "intercept": 0.0
        }"#;
        let spec: ClassifierSpec = serde_json::from_str(json).unwrap();
        let classifier = spec.build().unwrap();
        assert_eq!(classifier.kind(), "logistic_pipeline");
    }
}
