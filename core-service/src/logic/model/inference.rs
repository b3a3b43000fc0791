//! Prediction - validate, assemble, score, threshold
//!
//! `predict` is pure: the same passenger against the same bundle always
//! yields bit-identical output.

use serde::{Deserialize, Serialize};

use super::bundle::ModelBundle;
use super::classifier::InferenceError;
use super::threshold::DecisionThreshold;
use crate::logic::features::FeatureRow;
use crate::logic::passenger::{Passenger, SchemaViolation};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Prediction output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: u8,        // 0 or 1
    pub probability: f64, // positive-class probability, unrounded
    pub threshold: f64,   // threshold actually applied
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictError {
    /// Input fails field-domain validation, detected before inference
    #[error("invalid passenger: {0}")]
    SchemaViolation(#[from] SchemaViolation),

    /// No classifier is loaded
    #[error("model not loaded")]
    ModelUnavailable,

    /// Feature assembly or inference failed
    #[error("{0}")]
    BadInput(String),
}

impl From<InferenceError> for PredictError {
    fn from(err: InferenceError) -> Self {
        PredictError::BadInput(err.0)
    }
}

// ============================================================================
// PREDICTION
// ============================================================================

impl ModelBundle {
    /// Score one passenger
    ///
    /// `confidence` overrides the bundle threshold for this call only.
    pub fn predict(
        &self,
        passenger: &Passenger,
        confidence: Option<DecisionThreshold>,
    ) -> Result<PredictionResult, PredictError> {
        passenger.check()?;

        let row = FeatureRow::assemble(passenger, self.features());
        self.predict_row(&row, confidence)
    }

    /// Score a row already laid out in the bundle's feature order
    ///
    /// No field-domain checks happen here; numeric NaN cells are left to
    /// the classifier's imputation.
    pub fn predict_row(
        &self,
        row: &FeatureRow,
        confidence: Option<DecisionThreshold>,
    ) -> Result<PredictionResult, PredictError> {
        let classifier = self.classifier().ok_or(PredictError::ModelUnavailable)?;

        let probability = classifier.predict_proba(row)?;
        if !(0.0..=1.0).contains(&probability) {
            return Err(PredictError::BadInput(format!(
                "classifier returned probability {} outside [0, 1]",
                probability
            )));
        }

        let threshold = self.threshold().resolve(confidence);
        let label = threshold.label(probability);

        log::debug!(
            "prediction: label={} probability={:.6} threshold={}",
            label,
            probability,
            threshold.value()
        );

        Ok(PredictionResult {
            label,
            probability,
            threshold: threshold.value(),
        })
    }
}
